//! Error types for the storefront session engine.
//!
//! This module contains the configuration error type and the unified
//! [`StorefrontError`] returned by every component operation.
//!
//! # Error Handling
//!
//! Component operations (session, cart, checkout) return
//! `Result<T, StorefrontError>`. Every failure lands in exactly one kind:
//!
//! - [`StorefrontError::Validation`]: field-level input problems, raised before
//!   any network call
//! - [`StorefrontError::Auth`]: bad credentials, a missing session, or a
//!   credential the backend rejected
//! - [`StorefrontError::Network`]: timeout or transport failure
//! - [`StorefrontError::Server`]: any other non-2xx response
//!
//! # Example
//!
//! ```rust
//! use storefront_session::{BaseUrl, ConfigError};
//!
//! let result = BaseUrl::new("localhost:8000");
//! assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
//! ```

use thiserror::Error;

use crate::auth::{AuthError, StorageError};
use crate::checkout::ValidationErrors;
use crate::clients::{HttpError, InvalidHttpRequestError, NetworkError, ServerError};

/// Errors that can occur while configuring the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL is invalid.
    #[error("Invalid backend base URL '{url}'. Please provide a URL with scheme and host (e.g., 'http://localhost:8000').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Request timeout is invalid.
    #[error("Invalid request timeout '{value}'. The timeout must be a positive number of seconds.")]
    InvalidTimeout {
        /// The rejected timeout value.
        value: String,
    },

    /// The underlying HTTP client could not be created.
    #[error("Failed to create HTTP client: {reason}")]
    HttpClient {
        /// Why the client could not be built.
        reason: String,
    },
}

/// Unified error type for session, cart, and checkout operations.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// One or more form fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Authentication failed or is required.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The backend could not be reached in time.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The backend answered with a non-2xx status.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Durable session storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A request was malformed before it was sent.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// The backend cannot change a line's quantity in place.
    #[error("Quantity updates are not supported. Please remove and re-add items.")]
    QuantityUpdateUnsupported,

    /// Checkout was attempted with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,
}

impl StorefrontError {
    /// Returns `true` if the error is a field-level validation failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` if the error requires the visitor to sign in again.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<HttpError> for StorefrontError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Unauthorized(e) => Self::Auth(AuthError::SessionExpired { message: e.message }),
            HttpError::Server(e) => Self::Server(e),
            HttpError::Network(e) => Self::Network(e),
            HttpError::InvalidRequest(e) => Self::InvalidRequest(e),
            HttpError::UnexpectedBody { status, reason } => Self::Server(ServerError {
                status,
                message: format!("Unexpected response from server: {reason}"),
            }),
        }
    }
}
