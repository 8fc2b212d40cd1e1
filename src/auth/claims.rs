//! Read-only view of the claims inside a bearer credential.
//!
//! The backend issues HS256 JWTs signed with a key the client never sees, so
//! the signature cannot be checked here. Claims are decoded only to enrich a
//! [`Session`](crate::auth::Session); nothing is authorized based on them.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by a backend-issued credential.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Email of the account.
    #[serde(rename = "Email", default)]
    pub email: String,

    /// Given name.
    #[serde(rename = "First_Name", default)]
    pub first_name: String,

    /// Family name.
    #[serde(rename = "Last_Name", default)]
    pub last_name: String,

    /// Identity id.
    #[serde(rename = "Uid", default)]
    pub uid: String,

    /// Expiration timestamp (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl CredentialClaims {
    /// Decodes the claims of `token` without verifying its signature.
    ///
    /// Returns `None` when the token is not a decodable JWT.
    ///
    /// # Example
    ///
    /// ```rust
    /// use storefront_session::auth::CredentialClaims;
    ///
    /// assert!(CredentialClaims::peek("tok123").is_none());
    /// ```
    #[must_use]
    pub fn peek(token: &str) -> Option<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        match decode::<Self>(token, &DecodingKey::from_secret(&[]), &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("Credential is not a decodable JWT: {e}");
                None
            }
        }
    }

    /// Returns the expiry as a timestamp, if the credential carries one.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(claims: &CredentialClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(b"backend-only-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_peek_reads_backend_claims() {
        let claims = CredentialClaims {
            email: "x@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            uid: "64f1a2".to_string(),
            exp: Some(4_102_444_800),
        };

        let peeked = CredentialClaims::peek(&token_for(&claims)).unwrap();
        assert_eq!(peeked, claims);
    }

    #[test]
    fn test_peek_ignores_past_expiry() {
        let claims = CredentialClaims {
            uid: "u-1".to_string(),
            exp: Some(1_000),
            ..CredentialClaims::default()
        };

        let peeked = CredentialClaims::peek(&token_for(&claims)).unwrap();
        assert_eq!(peeked.uid, "u-1");
        assert_eq!(peeked.expires_at().unwrap().timestamp(), 1_000);
    }

    #[test]
    fn test_peek_returns_none_for_opaque_token() {
        assert!(CredentialClaims::peek("tok123").is_none());
        assert!(CredentialClaims::peek("").is_none());
        assert!(CredentialClaims::peek("a.b.c").is_none());
    }

    #[test]
    fn test_serialized_claim_names_match_backend() {
        let json = serde_json::to_value(CredentialClaims {
            uid: "u-1".to_string(),
            ..CredentialClaims::default()
        })
        .unwrap();

        assert_eq!(json["Uid"], "u-1");
        assert!(json.get("First_Name").is_some());
        assert!(json.get("exp").is_none());
    }
}
