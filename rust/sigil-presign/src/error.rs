use thiserror::Error;

/// Errors that can occur while presigning a request
#[derive(Error, Debug)]
pub enum PresignError {
    /// The request URL has no host to sign for
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The requested validity exceeds what the signature scheme allows
    #[error("URL expiration of {requested}s exceeds the maximum of {maximum}s")]
    ExpirationTooLong {
        /// Requested validity in seconds
        requested: u64,
        /// Longest validity the scheme accepts
        maximum: u64,
    },

    /// A signature version name that is not one of `unsigned`, `v2`, `v4`
    #[error("unknown signature version: {0}")]
    UnknownSignatureVersion(String),

    /// Failed to parse a URL
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}
