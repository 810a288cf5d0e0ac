//! Domain layer for the deployment status report.
//!
//! This crate contains:
//! - Domain models (mobile apps, install statuses, group memberships, statistics)
//! - The aggregation engine: classification, membership resolution,
//!   aggregation, report assembly and the pipeline driver
//! - The `GraphSource` seam the engine fetches through
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::FetchError;
