//! Field-service client error types.

use thiserror::Error;

/// Errors that can occur when talking to the field-service API.
///
/// These never reach workflow state directly: `fld-workflow` translates each
/// one into its own error taxonomy at the component boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The session token was refused (401 or 403).
    #[error("unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code returned by the API.
        status: u16,
        /// Message from the error envelope.
        message: String,
    },

    /// The API returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Failed to parse an API response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The client was built without a base URL.
    #[error("field-service API is not configured (service.base_url is empty)")]
    NotConfigured,
}

impl ClientError {
    /// HTTP status of an API error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Unauthorized { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}
