//! Error types for the ticketing SDK.
//!
//! [`NetworkError`] is the only error a consumer ever sees from a read or a
//! business call. [`UpdateDecodeError`] describes why a streamed update record
//! was rejected; it stays inside the SDK because malformed records are dropped
//! rather than surfaced.

use thiserror::Error;

/// Errors that can occur when talking to the ticketing backend.
///
/// The variants mirror the failure classes of a single request/response
/// exchange. The SDK passes them through unchanged and never retries on its
/// own; retry policy, if any, belongs to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The request URL could not be built
    #[error("Invalid URL")]
    InvalidUrl,

    /// The server answered with something that is not a usable response
    #[error("Invalid response from server")]
    InvalidResponse,

    /// HTTP 400
    #[error("Bad request")]
    BadRequest,

    /// HTTP 401
    #[error("Unauthorized - check your API key")]
    Unauthorized,

    /// HTTP 404
    #[error("Resource not found")]
    NotFound,

    /// HTTP 429
    #[error("Rate limit exceeded")]
    RateLimited,

    /// HTTP 5xx
    #[error("Server error")]
    ServerError,

    /// The response body could not be decoded into the expected type
    #[error("Failed to decode response: {0}")]
    DecodingFailed(String),

    /// Any other non-success status
    #[error("Unknown error (status code: {status_code})")]
    Unknown {
        /// HTTP status code
        status_code: u16,
    },

    /// The backend could not be reached
    #[error("No internet connection")]
    NoConnection,
}

impl NetworkError {
    /// Map an HTTP status code to the outcome of a call.
    ///
    /// Returns `None` for 2xx statuses.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticketing_sdk_core::NetworkError;
    ///
    /// assert_eq!(NetworkError::from_status(204), None);
    /// assert_eq!(NetworkError::from_status(429), Some(NetworkError::RateLimited));
    /// assert_eq!(NetworkError::from_status(503), Some(NetworkError::ServerError));
    /// assert_eq!(
    ///     NetworkError::from_status(302),
    ///     Some(NetworkError::Unknown { status_code: 302 })
    /// );
    /// ```
    #[must_use]
    pub const fn from_status(status_code: u16) -> Option<Self> {
        match status_code {
            200..=299 => None,
            400 => Some(Self::BadRequest),
            401 => Some(Self::Unauthorized),
            404 => Some(Self::NotFound),
            429 => Some(Self::RateLimited),
            500..=599 => Some(Self::ServerError),
            _ => Some(Self::Unknown { status_code }),
        }
    }

    /// Whether repeating the same call could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NoConnection | Self::RateLimited | Self::ServerError)
    }

    /// Wrap a decode failure.
    pub fn decoding(err: impl std::fmt::Display) -> Self {
        Self::DecodingFailed(err.to_string())
    }
}

/// Reasons a streamed update record could not be turned into an
/// [`EventUpdate`](crate::update::EventUpdate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateDecodeError {
    /// The record's kind is not one the SDK understands
    #[error("Unknown update type: {0}")]
    UnknownKind(String),

    /// The record's payload is missing or has the wrong shape for its kind
    #[error("Invalid {kind} data: {reason}")]
    InvalidPayload {
        /// Update kind that was being decoded
        kind: &'static str,
        /// What was wrong with the payload
        reason: String,
    },
}
