//! Authentication and session-storage error types.

use thiserror::Error;

/// Errors raised by the authenticated-identity lifecycle.
///
/// # Example
///
/// ```rust
/// use storefront_session::auth::AuthError;
///
/// let error = AuthError::NotAuthenticated;
/// assert_eq!(error.to_string(), "Please login to continue");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The operation needs an authenticated session and none exists.
    #[error("Please login to continue")]
    NotAuthenticated,

    /// The backend refused the submitted email/password.
    #[error("Login failed: {message}")]
    InvalidCredentials {
        /// The backend's explanation.
        message: String,
    },

    /// The login response carried a credential but no identity id, and none
    /// could be read from the credential itself.
    #[error("Login failed: the server did not identify the account")]
    MissingIdentity,

    /// The backend rejected the current credential; the visitor has been
    /// signed out.
    #[error("Your session has expired. Please login again. ({message})")]
    SessionExpired {
        /// The backend's explanation.
        message: String,
    },
}

/// Errors raised by durable session storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data could not be (de)serialized.
    #[error("Session storage is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A previous writer panicked while holding the storage lock.
    #[error("Session storage lock was poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_includes_backend_message() {
        let error = AuthError::InvalidCredentials {
            message: "login or password is incorrect".to_string(),
        };
        assert!(error.to_string().contains("login or password is incorrect"));
    }

    #[test]
    fn test_session_expired_message_prompts_login() {
        let error = AuthError::SessionExpired {
            message: "token is expired".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("login again"));
        assert!(message.contains("token is expired"));
    }

    #[test]
    fn test_storage_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: StorageError = io.into();
        assert!(matches!(error, StorageError::Io(_)));
        assert!(error.to_string().contains("denied"));
    }
}
