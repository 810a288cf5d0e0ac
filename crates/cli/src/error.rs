use domain::FetchError;
use graph::AuthError;
use thiserror::Error;

use crate::config::ConfigValidationError;
use crate::services::ReportWriterError;

/// Run-level error of the report binary.
///
/// Every variant aborts the run; no report files are written once fetching
/// has failed.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigValidationError),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Report error: {0}")]
    Report(#[from] ReportWriterError),
}

impl AppError {
    /// Logs the failure with the resource, status and body when available.
    pub fn log(&self) {
        match self {
            AppError::Fetch(err) => tracing::error!(
                resource = %err.resource().unwrap_or("-"),
                status = %err.status().map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
                body = %err.body().unwrap_or("-"),
                "Run aborted: {}",
                err
            ),
            other => tracing::error!("Run aborted: {}", other),
        }
    }
}
