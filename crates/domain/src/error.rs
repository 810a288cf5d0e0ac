//! Domain error types.

use thiserror::Error;

/// Failure of a single remote fetch, or of the credential it depends on.
///
/// Any of these aborts the whole run; nothing is retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {resource} failed with HTTP {status}: {body}")]
    Remote {
        resource: String,
        status: u16,
        body: String,
    },

    #[error("GET {resource} failed: {message}")]
    Transport { resource: String, message: String },

    #[error("GET {resource} returned an unexpected body: {message}")]
    Malformed { resource: String, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),
}

impl FetchError {
    pub fn remote(resource: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Remote {
            resource: resource.into(),
            status,
            body: body.into(),
        }
    }

    pub fn malformed(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// The resource path that failed, if the failure is tied to one.
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::Remote { resource, .. }
            | Self::Transport { resource, .. }
            | Self::Malformed { resource, .. } => Some(resource),
            Self::Authentication(_) => None,
        }
    }

    /// HTTP status, when the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body, when the service answered.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Remote { body, .. } => Some(body),
            _ => None,
        }
    }
}
