//! Error types for the CKAN provider

use thiserror::Error;

/// CKAN provider errors
#[derive(Error, Debug)]
pub enum CkanError {
    /// Manifest request returned a non-2xx status
    #[error("CKAN API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// The API answered 2xx but reported `success != true`
    #[error("CKAN API rejected the request: success = {success}")]
    ApiRejected { success: String },

    /// Failed to parse the API response body
    #[error("Failed to parse CKAN response: {0}")]
    ParseError(String),

    /// A resource's revision timestamp could not be parsed
    #[error("Invalid revision timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// Bridge error
    #[error(transparent)]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

/// Result type for CKAN operations
pub type Result<T> = std::result::Result<T, CkanError>;
