mod cli;
mod infra;
mod routes;
mod server;

use elevator_access::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
