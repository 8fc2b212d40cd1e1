//! The authenticated-identity lifecycle.
//!
//! [`SessionStore`] owns login, signup, logout, and restoration from durable
//! storage. It drives the shared [`SessionCell`]; the
//! [`Gateway`](crate::clients::Gateway) invalidates the same cell when the
//! backend rejects a credential, which is equivalent to [`SessionStore::logout`].
//!
//! # Example
//!
//! ```rust,ignore
//! let store = SessionStore::new(gateway.clone());
//!
//! if !store.restore().await.is_authenticated() {
//!     store.login("x@example.com", "abcdef").await?;
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::claims::CredentialClaims;
use crate::auth::error::AuthError;
use crate::auth::session::{IdentityRecord, Profile, Session};
use crate::auth::state::{AuthState, SessionCell};
use crate::auth::storage::keys;
use crate::clients::{endpoints, Gateway, HttpError, HttpMethod, HttpRequest};
use crate::error::StorefrontError;
use crate::ids::UserId;

/// Credentials submitted to the login endpoint.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"*****")
            .finish()
    }
}

/// Account details submitted to the signup endpoint.
#[derive(Clone, Default, Serialize)]
pub struct SignupRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Contact phone number.
    pub phone: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"*****")
            .field("phone", &self.phone)
            .finish()
    }
}

/// Confirmation that an account was created.
///
/// Signup does not authenticate; call [`SessionStore::login`] afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SignupReceipt {
    /// Id assigned to the new account, when the backend reports one.
    #[serde(rename = "InsertedID", default)]
    pub inserted_id: Option<UserId>,
    /// Backend confirmation text, if any.
    #[serde(default)]
    pub message: Option<String>,
}

/// Body returned by the login endpoint.
#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(rename = "InsertedID", default)]
    inserted_id: Option<UserId>,
    #[serde(default)]
    user: Option<Profile>,
}

/// What [`SessionStore::restore`] found in storage.
enum Persisted {
    Found(Session),
    /// Missing keys, or an unparseable identity record.
    Incomplete,
    /// Storage returned an error.
    Unreadable,
}

/// Owner of the login/logout lifecycle.
#[derive(Debug, Clone)]
pub struct SessionStore {
    gateway: Arc<Gateway>,
}

impl SessionStore {
    /// Creates a store driving the gateway's session cell.
    #[must_use]
    pub const fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    fn cell(&self) -> &SessionCell {
        self.gateway.session()
    }

    /// Returns a snapshot of the current state.
    pub async fn state(&self) -> AuthState {
        self.cell().state().await
    }

    /// Returns the current session, if authenticated.
    pub async fn current_session(&self) -> Option<Session> {
        self.cell().current().await
    }

    /// Returns the current session or [`AuthError::NotAuthenticated`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] when no session exists.
    pub async fn require_session(&self) -> Result<Session, AuthError> {
        self.current_session()
            .await
            .ok_or(AuthError::NotAuthenticated)
    }

    /// Restores a persisted session without a network call.
    ///
    /// The result is `Authenticated` only when both the credential and a
    /// readable identity record are in storage; anything else is
    /// `Anonymous`. A partial or corrupt persisted session is cleared. When
    /// storage itself cannot be read, nothing is removed.
    pub async fn restore(&self) -> AuthState {
        match self.load_persisted() {
            Persisted::Found(session) => {
                if session.expired() {
                    tracing::debug!(user_id = %session.user_id, "Restored credential is past its expiry");
                }
                self.cell().adopt(session).await;
            }
            Persisted::Incomplete => {
                if let Err(e) = self.cell().invalidate().await {
                    tracing::warn!("Failed to clear partial persisted session: {e}");
                }
            }
            Persisted::Unreadable => self.cell().forget().await,
        }
        self.state().await
    }

    fn load_persisted(&self) -> Persisted {
        let storage = self.cell().storage();
        let mut unreadable = false;
        let mut read = |key: &str| match storage.get(key) {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                tracing::warn!(key, "Failed to read persisted session: {e}");
                unreadable = true;
                None
            }
        };

        let token = read(keys::CREDENTIAL);
        let raw_identity = read(keys::IDENTITY);
        let refresh = read(keys::REFRESH_CREDENTIAL);
        if unreadable {
            return Persisted::Unreadable;
        }
        let (Some(token), Some(raw_identity)) = (token, raw_identity) else {
            return Persisted::Incomplete;
        };

        let record: IdentityRecord = match serde_json::from_str(&raw_identity) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Persisted identity record is corrupt, ignoring it: {e}");
                return Persisted::Incomplete;
            }
        };

        let session = Session::from_persisted(record, token, refresh);
        if session.is_valid() {
            Persisted::Found(session)
        } else {
            Persisted::Incomplete
        }
    }

    /// Authenticates with email and password.
    ///
    /// On success the session is persisted and the state becomes
    /// `Authenticated`. On failure the state is `Anonymous` and any
    /// previously persisted session is cleared.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] when the backend refuses the login
    ///   or returns no credential
    /// - [`AuthError::MissingIdentity`] when no identity id can be determined
    /// - [`StorefrontError::Server`] when a 2xx response body cannot be decoded
    /// - [`StorefrontError::Network`] on timeout or transport failure
    /// - [`StorefrontError::Storage`] when the session cannot be persisted
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, StorefrontError> {
        self.cell().begin_authenticating().await;

        let credentials = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        tracing::debug!(?credentials, "Logging in");

        match self.try_login(&credentials).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user_id, "Logged in");
                Ok(session)
            }
            Err(error) => {
                if let Err(e) = self.cell().invalidate().await {
                    tracing::warn!("Failed to clear session after failed login: {e}");
                }
                tracing::debug!("Login failed: {error}");
                Err(error)
            }
        }
    }

    async fn try_login(&self, credentials: &LoginRequest) -> Result<Session, StorefrontError> {
        let body = serde_json::to_value(credentials).map_err(|e| {
            StorefrontError::from(HttpError::UnexpectedBody {
                status: 0,
                reason: e.to_string(),
            })
        })?;
        let request = HttpRequest::builder(HttpMethod::Post, endpoints::LOGIN)
            .body(body)
            .build()?;

        let response = match self.gateway.request(request).await {
            Ok(response) => response,
            Err(HttpError::Server(e) | HttpError::Unauthorized(e)) => {
                return Err(AuthError::InvalidCredentials { message: e.message }.into());
            }
            Err(other) => return Err(other.into()),
        };

        let payload: LoginResponse = if response.body.is_null() {
            LoginResponse::default()
        } else {
            response.json()?
        };
        let session = Self::session_from_login(payload, &credentials.email)?;
        self.cell().establish(session.clone()).await?;
        Ok(session)
    }

    fn session_from_login(payload: LoginResponse, email: &str) -> Result<Session, AuthError> {
        let token = payload
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AuthError::InvalidCredentials {
                message: "Login failed".to_string(),
            })?;

        let claims = CredentialClaims::peek(&token).unwrap_or_default();

        let user_id = payload
            .inserted_id
            .filter(|id| !id.is_empty())
            .or_else(|| (!claims.uid.trim().is_empty()).then(|| UserId::new(claims.uid.clone())))
            .ok_or(AuthError::MissingIdentity)?;

        let mut profile = payload.user.unwrap_or_default();
        if profile.first_name.is_empty() {
            profile.first_name.clone_from(&claims.first_name);
        }
        if profile.last_name.is_empty() {
            profile.last_name.clone_from(&claims.last_name);
        }
        if profile.email.is_empty() {
            profile.email = if claims.email.is_empty() {
                email.to_string()
            } else {
                claims.email.clone()
            };
        }

        let refresh = payload.refresh_token.filter(|t| !t.trim().is_empty());
        let mut session = Session::new(user_id, token, refresh, profile);
        session.expires = claims.expires_at();
        Ok(session)
    }

    /// Creates an account. Does not authenticate.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Server`] with the backend's message (for example
    ///   "user already exists"), or when a 2xx JSON object cannot be decoded
    /// - [`StorefrontError::Network`] on timeout or transport failure
    pub async fn signup(&self, profile: &SignupRequest) -> Result<SignupReceipt, StorefrontError> {
        let body = serde_json::to_value(profile).map_err(|e| {
            StorefrontError::from(HttpError::UnexpectedBody {
                status: 0,
                reason: e.to_string(),
            })
        })?;
        let request = HttpRequest::builder(HttpMethod::Post, endpoints::SIGNUP)
            .body(body)
            .build()?;

        let response = self.gateway.request(request).await?;
        let receipt = match &response.body {
            serde_json::Value::Object(_) => response.json()?,
            serde_json::Value::String(message) => SignupReceipt {
                inserted_id: None,
                message: Some(message.clone()),
            },
            _ => SignupReceipt::default(),
        };

        tracing::info!(email = %profile.email, "Account created");
        Ok(receipt)
    }

    /// Clears the persisted session and becomes `Anonymous`. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Storage`] if persisted keys could not be
    /// removed; the in-memory state is `Anonymous` regardless.
    pub async fn logout(&self) -> Result<(), StorefrontError> {
        let was_authenticated = self.state().await.is_authenticated();
        self.cell().invalidate().await?;
        if was_authenticated {
            tracing::info!("Logged out");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::json;

    fn login_payload(body: serde_json::Value) -> LoginResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_login_request_debug_masks_password() {
        let request = LoginRequest {
            email: "x@example.com".to_string(),
            password: "abcdef".to_string(),
        };
        let debug = format!("{request:?}");
        assert!(debug.contains("x@example.com"));
        assert!(!debug.contains("abcdef"));
    }

    #[test]
    fn test_session_from_login_uses_inserted_id() {
        let payload = login_payload(json!({
            "token": "tok123",
            "refresh_token": "ref456",
            "InsertedID": "u-1",
            "user": {"first_name": "Ada", "email": "ada@example.com"}
        }));

        let session = SessionStore::session_from_login(payload, "x@example.com").unwrap();
        assert_eq!(session.user_id.as_ref(), "u-1");
        assert_eq!(session.access_token, "tok123");
        assert_eq!(session.refresh_token.as_deref(), Some("ref456"));
        assert_eq!(session.profile.first_name, "Ada");
        assert_eq!(session.profile.email, "ada@example.com");
    }

    #[test]
    fn test_session_from_login_falls_back_to_claims() {
        let claims = CredentialClaims {
            email: "claims@example.com".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            uid: "u-claims".to_string(),
            exp: Some(4_102_444_800),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap();

        let payload = login_payload(json!({ "token": token }));
        let session = SessionStore::session_from_login(payload, "x@example.com").unwrap();

        assert_eq!(session.user_id.as_ref(), "u-claims");
        assert_eq!(session.profile.first_name, "Grace");
        assert_eq!(session.profile.email, "claims@example.com");
        assert_eq!(session.expires.unwrap().timestamp(), 4_102_444_800);
    }

    #[test]
    fn test_session_from_login_requires_credential() {
        let payload = login_payload(json!({ "InsertedID": "u-1", "token": "" }));
        let result = SessionStore::session_from_login(payload, "x@example.com");
        assert!(matches!(result, Err(AuthError::InvalidCredentials { .. })));
    }

    #[test]
    fn test_session_from_login_requires_identity() {
        let payload = login_payload(json!({ "token": "tok123" }));
        let result = SessionStore::session_from_login(payload, "x@example.com");
        assert_eq!(result.unwrap_err(), AuthError::MissingIdentity);
    }

    #[test]
    fn test_session_from_login_defaults_email_to_submitted() {
        let payload = login_payload(json!({ "token": "tok123", "InsertedID": "u-1" }));
        let session = SessionStore::session_from_login(payload, "x@example.com").unwrap();
        assert_eq!(session.profile.email, "x@example.com");
        assert!(session.expires.is_none());
    }

    #[test]
    fn test_signup_receipt_reads_inserted_id() {
        let receipt: SignupReceipt =
            serde_json::from_value(json!({"InsertedID": "u-7"})).unwrap();
        assert_eq!(receipt.inserted_id, Some(UserId::new("u-7")));
        assert!(receipt.message.is_none());
    }
}
