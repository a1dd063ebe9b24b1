//! Error types for wxnow services.

use thiserror::Error;

use crate::archive::ArchiveError;

/// Errors that stop a service from starting.
///
/// Failures while handling a single observation never surface here; they
/// are logged and the observation is skipped.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration file not found or unreadable
    #[error("Config error: {0}")]
    Config(String),

    /// Failed to parse configuration YAML
    #[error("Parse error: {0}")]
    Parse(String),

    /// The host engine is too old to drive this service
    #[error("Unsupported host: {0}")]
    UnsupportedHost(String),

    /// Archive database could not be opened
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

impl From<serde_yaml::Error> for ServiceError {
    fn from(err: serde_yaml::Error) -> Self {
        ServiceError::Parse(err.to_string())
    }
}
