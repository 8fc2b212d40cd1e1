//! Read-through cache of the server-authoritative cart.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{AuthError, Session};
use crate::cart::model::{Cart, CartResponse};
use crate::clients::{endpoints, Gateway, HttpError, HttpMethod, HttpRequest};
use crate::error::StorefrontError;
use crate::ids::ProductId;

/// Keeps the local cart consistent with the backend.
///
/// Every mutation is followed by a full [`refresh`](Self::refresh); the local
/// view is replaced wholesale, never merged. Two mutations racing each other
/// are not reconciled: whichever refresh completes last is what the cart
/// shows.
///
/// A refresh response is only applied if the identity it was fetched for is
/// still signed in and the cart has not been cleared since the request was
/// sent. A logout or checkout that lands while a refresh is in flight wins.
///
/// # Example
///
/// ```rust,ignore
/// let cart = CartSynchronizer::new(gateway.clone());
///
/// let lines = cart.add_item(&ProductId::new("64f1a2")).await?;
/// println!("{lines} line(s), total {}", cart.cart().await.totals().total);
/// ```
#[derive(Debug)]
pub struct CartSynchronizer {
    gateway: Arc<Gateway>,
    state: RwLock<Cart>,
    /// Bumped by every [`clear`](Self::clear).
    generation: AtomicU64,
}

// Verify CartSynchronizer is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CartSynchronizer>();
};

impl CartSynchronizer {
    /// Creates a synchronizer with an empty local cart.
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(Cart::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns a snapshot of the local cart as of the last refresh.
    pub async fn cart(&self) -> Cart {
        self.state.read().await.clone()
    }

    async fn require_session(&self) -> Result<Session, StorefrontError> {
        if let Some(session) = self.gateway.session().current().await {
            return Ok(session);
        }
        self.clear().await;
        Err(AuthError::NotAuthenticated.into())
    }

    /// Fetches the cart and total for the current identity and replaces the
    /// local cart with it.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Auth`] without a session, or when the backend
    ///   rejects the credential; the local cart is emptied in both cases
    /// - [`StorefrontError::Server`] / [`StorefrontError::Network`] when the
    ///   call fails; the local cart is left as it was
    ///
    /// If the visitor signed out (or another identity signed in) while the
    /// call was in flight, the response is discarded and
    /// [`AuthError::NotAuthenticated`] is returned. If the cart was cleared
    /// in the meantime, the response is discarded and the cleared cart is
    /// returned.
    pub async fn refresh(&self) -> Result<Cart, StorefrontError> {
        let session = self.require_session().await?;
        let generation = self.generation.load(Ordering::SeqCst);

        let request = HttpRequest::builder(HttpMethod::Get, endpoints::CART)
            .query_param("id", session.user_id.as_ref())
            .build()?;

        let response = match self.gateway.request(request).await {
            Ok(response) => response,
            Err(error @ HttpError::Unauthorized(_)) => {
                self.clear().await;
                return Err(error.into());
            }
            Err(error) => return Err(error.into()),
        };

        let body: CartResponse = if response.body.is_null() {
            CartResponse::default()
        } else {
            response.json()?
        };
        let cart = Cart::from_response(body);

        let mut state = self.state.write().await;
        let still_signed_in = self
            .gateway
            .session()
            .current()
            .await
            .is_some_and(|current| current.user_id == session.user_id);
        if !still_signed_in {
            tracing::debug!(user_id = %session.user_id, "Discarding cart for a signed-out identity");
            return Err(AuthError::NotAuthenticated.into());
        }
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding cart fetched before the last clear");
            return Ok(state.clone());
        }

        tracing::debug!(
            lines = cart.line_count(),
            total = %cart.total_price(),
            "Cart refreshed"
        );
        *state = cart.clone();
        Ok(cart)
    }

    /// Adds one unit of `product_id`, then refreshes.
    ///
    /// Returns the number of lines after the refresh.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Auth`] without a session
    /// - [`StorefrontError::Server`] / [`StorefrontError::Network`] when the
    ///   add or the following refresh fails
    pub async fn add_item(&self, product_id: &ProductId) -> Result<usize, StorefrontError> {
        self.mutate(endpoints::CART_ADD, product_id).await?;
        let cart = self.refresh().await?;
        Ok(cart.line_count())
    }

    /// Removes the line for `product_id`, then refreshes.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Auth`] without a session
    /// - [`StorefrontError::Server`] / [`StorefrontError::Network`] when the
    ///   removal or the following refresh fails
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<Cart, StorefrontError> {
        self.mutate(endpoints::CART_REMOVE, product_id).await?;
        self.refresh().await
    }

    async fn mutate(&self, path: &str, product_id: &ProductId) -> Result<(), StorefrontError> {
        let session = self.require_session().await?;

        let request = HttpRequest::builder(HttpMethod::Get, path)
            .query_param("id", session.user_id.as_ref())
            .query_param("pid", product_id.as_ref())
            .build()?;

        match self.gateway.request(request).await {
            Ok(_) => Ok(()),
            Err(error @ HttpError::Unauthorized(_)) => {
                self.clear().await;
                Err(error.into())
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Handles a requested quantity change for an existing line.
    ///
    /// The backend has no in-place quantity update, so:
    /// - `0` removes the line
    /// - the line's current quantity is a no-op
    /// - anything else is rejected with
    ///   [`StorefrontError::QuantityUpdateUnsupported`]
    ///
    /// # Errors
    ///
    /// See above, plus any error from [`remove_item`](Self::remove_item).
    pub async fn change_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, StorefrontError> {
        if quantity == 0 {
            return self.remove_item(product_id).await;
        }

        let cart = self.cart().await;
        if cart.line(product_id).is_some_and(|line| line.quantity == quantity) {
            return Ok(cart);
        }

        tracing::warn!(
            product_id = %product_id,
            quantity,
            "Rejected in-place quantity change"
        );
        Err(StorefrontError::QuantityUpdateUnsupported)
    }

    /// Resets the local cart to empty without a network call.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = Cart::default();
        tracing::debug!("Local cart cleared");
    }
}
