//! Error types for the core library

use thiserror::Error;

/// The core error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Identifier was empty or whitespace
    #[error("Entity id must not be empty")]
    EmptyId,

    /// A numeric argument was NaN or infinite
    #[error("Non-finite value for {0}")]
    NonFinite(&'static str),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CoreError>;

impl From<&str> for CoreError {
    fn from(s: &str) -> Self {
        CoreError::Message(s.to_string())
    }
}

impl From<String> for CoreError {
    fn from(s: String) -> Self {
        CoreError::Message(s)
    }
}
