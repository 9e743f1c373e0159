//! Error types for the deskhub workspace.

use thiserror::Error;

/// Errors that can occur outside of a single source fetch.
#[derive(Error, Debug)]
pub enum DeskhubError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for deskhub operations.
pub type DeskhubResult<T> = Result<T, DeskhubError>;
