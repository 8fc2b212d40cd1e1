//! The authenticated-identity record.
//!
//! A [`Session`] pairs a visitor's identity with the bearer credential the
//! backend issued at login. It is valid only while both are present.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::null_as_default;
use crate::ids::UserId;

/// Profile fields of a signed-in visitor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Given name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    /// Family name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    /// Email address used to sign in.
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Contact phone number.
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
}

/// The identity half of a session, as persisted under the `user` key.
///
/// Credentials are stored under their own keys and never inside this record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// The visitor's identity id.
    pub user_id: UserId,
    /// Profile fields.
    #[serde(flatten)]
    pub profile: Profile,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the bearer credential expires, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

/// An authenticated session.
///
/// # Example
///
/// ```rust
/// use storefront_session::{Profile, Session, UserId};
///
/// let session = Session::new(
///     UserId::new("u-1"),
///     "tok123".to_string(),
///     None,
///     Profile { email: "x@example.com".to_string(), ..Profile::default() },
/// );
///
/// assert!(session.is_valid());
/// assert!(!session.expired());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// The visitor's identity id.
    pub user_id: UserId,

    /// The bearer credential attached to every backend call.
    pub access_token: String,

    /// Refresh credential issued alongside the bearer credential.
    pub refresh_token: Option<String>,

    /// Profile fields.
    pub profile: Profile,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session was last updated.
    pub updated_at: DateTime<Utc>,

    /// When the bearer credential expires, if known.
    pub expires: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a new session stamped with the current time.
    #[must_use]
    pub fn new(
        user_id: UserId,
        access_token: String,
        refresh_token: Option<String>,
        profile: Profile,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            access_token,
            refresh_token,
            profile,
            created_at: now,
            updated_at: now,
            expires: None,
        }
    }

    /// Rebuilds a session from its persisted parts.
    #[must_use]
    pub fn from_persisted(
        record: IdentityRecord,
        access_token: String,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            user_id: record.user_id,
            access_token,
            refresh_token,
            profile: record.profile,
            created_at: record.created_at,
            updated_at: record.updated_at,
            expires: record.expires,
        }
    }

    /// Returns the identity record to persist for this session.
    #[must_use]
    pub fn identity_record(&self) -> IdentityRecord {
        IdentityRecord {
            user_id: self.user_id.clone(),
            profile: self.profile.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            expires: self.expires,
        }
    }

    /// Returns `true` if both the identity id and bearer credential are present.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.user_id.is_empty() && !self.access_token.trim().is_empty()
    }

    /// Returns `true` if the credential has a known expiry in the past.
    ///
    /// Sessions without an expiry are considered never expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| Utc::now() > expires)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("access_token", &"*****")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "*****"))
            .field("profile", &self.profile)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("expires", &self.expires)
            .finish()
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(user_id: &str, token: &str) -> Session {
        Session::new(UserId::new(user_id), token.to_string(), None, Profile::default())
    }

    #[test]
    fn test_session_valid_requires_identity_and_credential() {
        assert!(session("u-1", "tok").is_valid());
        assert!(!session("", "tok").is_valid());
        assert!(!session("u-1", "").is_valid());
        assert!(!session("", "").is_valid());
    }

    #[test]
    fn test_session_expired() {
        let mut expired = session("u-1", "tok");
        expired.expires = Some(Utc::now() - Duration::hours(1));
        assert!(expired.expired());

        let mut valid = session("u-1", "tok");
        valid.expires = Some(Utc::now() + Duration::hours(1));
        assert!(!valid.expired());

        assert!(!session("u-1", "tok").expired());
    }

    #[test]
    fn test_debug_masks_credentials() {
        let mut s = session("u-1", "super-secret-token");
        s.refresh_token = Some("refresh-secret".to_string());
        let debug = format!("{s:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(!debug.contains("refresh-secret"));
        assert!(debug.contains("u-1"));
    }

    #[test]
    fn test_profile_reads_null_fields_as_empty() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "first_name": "Ada",
            "last_name": null,
            "email": "x@example.com",
            "phone": null
        }))
        .unwrap();

        assert_eq!(profile.first_name, "Ada");
        assert!(profile.last_name.is_empty());
        assert!(profile.phone.is_empty());
    }

    #[test]
    fn test_identity_record_excludes_credentials() {
        let s = session("u-1", "tok123");
        let json = serde_json::to_string(&s.identity_record()).unwrap();
        assert!(json.contains("\"user_id\":\"u-1\""));
        assert!(!json.contains("tok123"));
    }

    #[test]
    fn test_from_persisted_restores_identity() {
        let original = Session::new(
            UserId::new("u-9"),
            "tok".to_string(),
            Some("ref".to_string()),
            Profile {
                first_name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                ..Profile::default()
            },
        );

        let restored = Session::from_persisted(
            original.identity_record(),
            "tok".to_string(),
            Some("ref".to_string()),
        );

        assert_eq!(restored, original);
    }
}
