//! HTTP-specific error types for the backend gateway.
//!
//! - [`ServerError`]: a non-2xx response, with the backend's message
//! - [`NetworkError`]: timeout or transport failure
//! - [`InvalidHttpRequestError`]: a request that failed validation before sending
//! - [`HttpError`]: everything the gateway can return
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_session::clients::HttpError;
//!
//! match gateway.request(request).await {
//!     Ok(response) => println!("Success: {}", response.body),
//!     Err(HttpError::Unauthorized(e)) => println!("Signed out: {}", e.message),
//!     Err(HttpError::Server(e)) => println!("API error {}: {}", e.status, e.message),
//!     Err(HttpError::Network(e)) => println!("{e}"),
//!     Err(other) => println!("{other}"),
//! }
//! ```

use thiserror::Error;

/// Message used when the backend gives no readable error.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// A non-2xx response from the backend.
///
/// The message is extracted from the response body (`error`, `Error`, or
/// `message` field, or a bare JSON string), falling back to
/// [`GENERIC_ERROR_MESSAGE`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServerError {
    /// The HTTP status code of the response.
    pub status: u16,
    /// Human-readable message from the backend.
    pub message: String,
}

/// What went wrong on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// The fixed request timeout elapsed.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// Any other transport failure.
    Other,
}

/// A timeout or transport failure.
///
/// The display message is deliberately generic and prompts a retry; the
/// underlying `reqwest` error is kept as the source.
#[derive(Debug, Error)]
#[error("Network error: unable to reach the store. Please check your connection and try again.")]
pub struct NetworkError {
    /// The failure category.
    pub kind: NetworkErrorKind,
    #[source]
    source: reqwest::Error,
}

impl NetworkError {
    /// Returns `true` if the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.kind == NetworkErrorKind::Timeout
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(source: reqwest::Error) -> Self {
        let kind = if source.is_timeout() {
            NetworkErrorKind::Timeout
        } else if source.is_connect() {
            NetworkErrorKind::Connect
        } else {
            NetworkErrorKind::Other
        };
        Self { kind, source }
    }
}

/// Error returned when a request fails validation before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// A required query parameter was blank.
    #[error("Query parameter '{name}' cannot be empty.")]
    EmptyQueryParam {
        /// The parameter name.
        name: String,
    },
}

/// Unified error type for gateway calls.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The backend rejected the credential (401). The session has already
    /// been invalidated when this is returned.
    #[error("Authentication rejected: {0}")]
    Unauthorized(ServerError),

    /// Any other non-2xx response.
    #[error(transparent)]
    Server(ServerError),

    /// Timeout or transport failure.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// A 2xx response whose body did not have the expected shape.
    #[error("Unexpected response body (status {status}): {reason}")]
    UnexpectedBody {
        /// The HTTP status code.
        status: u16,
        /// What failed to decode.
        reason: String,
    },
}

impl From<reqwest::Error> for HttpError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(NetworkError::from(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_displays_message_only() {
        let error = ServerError {
            status: 404,
            message: "can't find product".to_string(),
        };
        assert_eq!(error.to_string(), "can't find product");
    }

    #[test]
    fn test_unauthorized_error_message() {
        let error = HttpError::Unauthorized(ServerError {
            status: 401,
            message: "token is expired".to_string(),
        });
        assert_eq!(error.to_string(), "Authentication rejected: token is expired");
    }

    #[test]
    fn test_invalid_request_error_missing_body() {
        let error = InvalidHttpRequestError::MissingBody {
            method: "post".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot use post without specifying data.");
    }

    #[test]
    fn test_empty_query_param_error() {
        let error = InvalidHttpRequestError::EmptyQueryParam {
            name: "pid".to_string(),
        };
        assert!(error.to_string().contains("'pid'"));
    }

    #[test]
    fn test_error_types_implement_std_error() {
        let server: &dyn std::error::Error = &ServerError {
            status: 500,
            message: "test".to_string(),
        };
        let _ = server;

        let invalid: &dyn std::error::Error = &InvalidHttpRequestError::MissingBody {
            method: "put".to_string(),
        };
        let _ = invalid;
    }
}
