//! Error types shared across the Hiredata workspace

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, HiredataError>;

/// Main error type for shared functionality
#[derive(Error, Debug)]
pub enum HiredataError {
    #[error("Unsupported record kind '{0}'. Expected one of: hired_employees, departments, jobs")]
    UnsupportedRecordKind(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HiredataError {
    /// Build an unsupported-kind error from any displayable input
    pub fn unsupported(input: impl Into<String>) -> Self {
        Self::UnsupportedRecordKind(input.into())
    }
}
