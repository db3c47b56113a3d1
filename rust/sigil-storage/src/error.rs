use sigil_presign::PresignError;
use thiserror::Error;

/// Errors that can occur while storing objects or handing out their URLs
#[derive(Error, Debug)]
pub enum StorageError {
    /// The storage service could not be reached
    #[error("Failed to connect to storage service: {0}")]
    ConnectionFailed(String),

    /// The storage service answered with something other than success or
    /// "not found"
    #[error("Failed to perform storage operation: {0}")]
    OperationFailed(String),

    /// A request could not be sent or its response could not be read
    #[error("Storage request failed: {0}")]
    RequestFailed(String),

    /// A URL could not be presigned
    #[error("Failed to sign URL: {0}")]
    Signing(#[from] PresignError),

    /// The URL cache failed
    #[error("URL cache failure: {0}")]
    Cache(String),

    /// Settings are missing or malformed
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() {
            StorageError::ConnectionFailed(error.to_string())
        } else if error.is_request() {
            StorageError::OperationFailed(error.to_string())
        } else {
            StorageError::RequestFailed(error.to_string())
        }
    }
}

impl From<url::ParseError> for StorageError {
    fn from(error: url::ParseError) -> Self {
        StorageError::Configuration(format!("Invalid URL: {error}"))
    }
}
