//! Application error types.

use tell_dispatch::ConfigurationError;
use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Command wiring error: {0}")]
    Wiring(#[from] ConfigurationError),

    #[error("Console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;

/// A command refused the request. The message is shown to the sender as is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct Rejected(pub String);

/// Fail a handler with a message for the sender.
pub fn reject<T>(message: impl Into<String>) -> anyhow::Result<T> {
    Err(Rejected(message.into()).into())
}
