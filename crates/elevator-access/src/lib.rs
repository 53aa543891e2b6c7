//! Elevator accessibility resolution for street addresses.
//!
//! Crowd-sourced reports and an open-map feature lookup are folded into a single
//! status with a confidence score per building.

pub mod accessibility;
pub mod config;
pub mod error;
pub mod telemetry;
