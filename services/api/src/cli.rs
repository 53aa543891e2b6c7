use crate::infra::build_service;
use crate::server;
use clap::{Args, Parser, Subcommand};
use elevator_access::accessibility::normalize_address;
use elevator_access::config::AppConfig;
use elevator_access::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Elevator Access",
    about = "Resolve and serve building elevator accessibility from reports and map data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Resolve one address through the read path and print the result
    Check(CheckArgs),
    /// Print the canonical lookup key for an address
    Normalize {
        /// Raw address text
        address: String,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Raw address text to resolve
    #[arg(long)]
    pub(crate) address: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Check(args) => run_check(args).await,
        Command::Normalize { address } => {
            println!("{}", normalize_address(&address));
            Ok(())
        }
    }
}

async fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config).await?;
    let view = service.check(&args.address).await?;

    println!("Address: {}", view.normalized_address);
    println!("Status: {}", view.status);
    println!("Confidence: {:.2}", view.confidence);
    Ok(())
}
