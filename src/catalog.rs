//! Product catalog access.
//!
//! The catalog is read-only from the engine's point of view: [`Catalog`]
//! lists and searches products, and [`Product`] is the snapshot type cart
//! lines carry.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::clients::{endpoints, Gateway, HttpMethod, HttpRequest};
use crate::error::StorefrontError;
use crate::ids::ProductId;

/// A catalog product, as the backend serializes it.
///
/// Cart lines keep a copy of this taken when the product was added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id.
    #[serde(rename = "_id", alias = "product_id")]
    pub id: ProductId,

    /// Display name.
    #[serde(rename = "product_name", default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Unit price.
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Decimal,

    /// Average rating.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,

    /// Image reference (URL or asset path).
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
}

/// Deserializes `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read access to the product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    gateway: Arc<Gateway>,
}

impl Catalog {
    /// Creates a catalog reader over the gateway.
    #[must_use]
    pub const fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Lists every product.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Server`] or [`StorefrontError::Network`]
    /// when the backend call fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, StorefrontError> {
        let request = HttpRequest::builder(HttpMethod::Get, endpoints::PRODUCTS).build()?;
        self.fetch(request).await
    }

    /// Searches products by name.
    ///
    /// A blank query lists the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Server`] or [`StorefrontError::Network`]
    /// when the backend call fails.
    pub async fn search(&self, name: &str) -> Result<Vec<Product>, StorefrontError> {
        let name = name.trim();
        if name.is_empty() {
            return self.list_products().await;
        }

        let request = HttpRequest::builder(HttpMethod::Get, endpoints::PRODUCT_SEARCH)
            .query_param("name", name)
            .build()?;
        self.fetch(request).await
    }

    async fn fetch(&self, request: HttpRequest) -> Result<Vec<Product>, StorefrontError> {
        let response = self.gateway.request(request).await?;
        if response.body.is_null() {
            return Ok(Vec::new());
        }
        Ok(response.json()?)
    }
}
