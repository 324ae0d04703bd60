//! Error types for the Hiredata CLI
//!
//! Messages are shown to the user as-is, so each one says what to check.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// The server answered with an error envelope
    #[error("Server rejected the request ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The server answered with something that is not an envelope
    #[error("Unexpected response from server ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("{failed} of {total} files failed to upload; files listed as inserted are stored")]
    UploadIncomplete { failed: usize, total: usize },

    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    #[error(transparent)]
    InvalidTable(#[from] hiredata_common::HiredataError),

    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network request failed: {0}. Check that the server is running and the server URL is correct.")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Configuration error: {0}. Check your environment variables.")]
    Config(String),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let err = CliError::Api {
            status: 409,
            code: "DUPLICATE_RECORD".to_string(),
            message: "Rows already exist in jobs".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Server rejected the request (409 DUPLICATE_RECORD): Rows already exist in jobs"
        );
    }

    #[test]
    fn test_invalid_table_is_transparent() {
        let err = CliError::from(hiredata_common::HiredataError::unsupported("salaries"));
        assert!(err.to_string().starts_with("Unsupported record kind 'salaries'"));
    }
}
