//! Saved shipping addresses.
//!
//! The backend keeps at most two addresses per account (home and work).
//! Adding a third is refused with a server error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, Session};
use crate::catalog::null_as_default;
use crate::checkout::ShippingAddress;
use crate::clients::{endpoints, Gateway, HttpError, HttpMethod, HttpRequest, HttpResponse};
use crate::error::StorefrontError;
use crate::ids::AddressId;

/// An address as the backend stores it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Server-side id; absent until the backend assigns one.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    /// House or building label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub house_name: String,
    /// Street.
    #[serde(default, deserialize_with = "null_as_default")]
    pub street_name: String,
    /// City.
    #[serde(default, deserialize_with = "null_as_default")]
    pub city_name: String,
    /// Postal code.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pin_code: String,
}

impl From<&ShippingAddress> for Address {
    /// The street doubles as the house label; state and country have no
    /// backend counterpart.
    fn from(shipping: &ShippingAddress) -> Self {
        let street = shipping.street.trim().to_string();
        Self {
            id: None,
            house_name: street.clone(),
            street_name: street,
            city_name: shipping.city.trim().to_string(),
            pin_code: shipping.zip_code.trim().to_string(),
        }
    }
}

/// Manages the signed-in visitor's saved addresses.
#[derive(Debug, Clone)]
pub struct AddressBook {
    gateway: Arc<Gateway>,
}

impl AddressBook {
    /// Creates an address book over the gateway.
    #[must_use]
    pub const fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    async fn session(&self) -> Result<Session, AuthError> {
        self.gateway
            .session()
            .current()
            .await
            .ok_or(AuthError::NotAuthenticated)
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        address: Option<&Address>,
    ) -> Result<HttpResponse, StorefrontError> {
        let session = self.session().await?;
        let mut builder =
            HttpRequest::builder(method, path).query_param("id", session.user_id.as_ref());
        if let Some(address) = address {
            let body = serde_json::to_value(address).map_err(|e| HttpError::UnexpectedBody {
                status: 0,
                reason: e.to_string(),
            })?;
            builder = builder.body(body);
        }
        Ok(self.gateway.request(builder.build()?).await?)
    }

    /// Creates an address on the account.
    ///
    /// Returns the id the backend assigned, when it reports one.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Auth`] without a session
    /// - [`StorefrontError::Server`] when the backend refuses (for example
    ///   "Not Allowed" once two addresses exist)
    /// - [`StorefrontError::Network`] on timeout or transport failure
    pub async fn add(&self, address: &Address) -> Result<Option<AddressId>, StorefrontError> {
        let response = self
            .send(HttpMethod::Post, endpoints::ADDRESS, Some(address))
            .await?;

        let id = response
            .body
            .get("_id")
            .and_then(serde_json::Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .map(AddressId::new);
        tracing::debug!(address_id = ?id, "Address created");
        Ok(id)
    }

    /// Replaces the home address.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    pub async fn edit_home(&self, address: &Address) -> Result<(), StorefrontError> {
        self.send(HttpMethod::Put, endpoints::ADDRESS_HOME, Some(address))
            .await?;
        Ok(())
    }

    /// Replaces the work address.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    pub async fn edit_work(&self, address: &Address) -> Result<(), StorefrontError> {
        self.send(HttpMethod::Put, endpoints::ADDRESS_WORK, Some(address))
            .await?;
        Ok(())
    }

    /// Deletes every saved address.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    pub async fn delete_all(&self) -> Result<(), StorefrontError> {
        self.send(HttpMethod::Get, endpoints::ADDRESS_DELETE, None)
            .await?;
        Ok(())
    }
}
