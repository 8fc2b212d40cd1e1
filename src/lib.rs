//! # Storefront Session Engine
//!
//! Session, cart synchronization, and checkout for a storefront talking to a
//! remote commerce backend.
//!
//! ## Overview
//!
//! The engine is four services, composed leaves first:
//!
//! - [`clients::Gateway`]: every backend call goes through it; attaches the
//!   session credential, enforces the timeout, signs out on 401
//! - [`auth::SessionStore`]: login, signup, logout, and restoration from
//!   durable storage
//! - [`cart::CartSynchronizer`]: the local view of the server-side cart,
//!   refreshed after every mutation
//! - [`checkout::CheckoutOrchestrator`]: form validation and the sequential
//!   order-placement flow
//!
//! [`Storefront`] wires them together along with the [`catalog::Catalog`]
//! and [`address::AddressBook`] collaborators.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use storefront_session::auth::MemoryStorage;
//! use storefront_session::{BaseUrl, Storefront, StorefrontConfig};
//!
//! let config = StorefrontConfig::builder()
//!     .base_url(BaseUrl::new("http://localhost:8000").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let storefront = Storefront::new(&config, Arc::new(MemoryStorage::new())).unwrap();
//! ```
//!
//! ## Shopping
//!
//! ```rust,ignore
//! use storefront_session::{AddressSelection, CheckoutForm, ProductId};
//!
//! storefront.sessions().login("x@example.com", "abcdef").await?;
//!
//! let lines = storefront.cart().add_item(&ProductId::new("64f1a2")).await?;
//! let totals = storefront.cart().cart().await.totals();
//!
//! let session = storefront.sessions().require_session().await?;
//! let mut form = CheckoutForm::for_session(&session);
//! // ... fill in the form ...
//! let receipt = storefront.checkout().submit(&form, &AddressSelection::New).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: services are constructed explicitly and shared by `Arc`
//! - **Server-authoritative cart**: the local cart is replaced on every refresh
//! - **Fail-fast validation**: config newtypes and checkout forms validate
//!   before anything is sent
//! - **Thread-safe**: all services are `Send + Sync`

pub mod address;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod clients;
pub mod config;
pub mod error;
pub mod ids;

use std::sync::Arc;

// Re-export public types at crate root for convenience
pub use address::{Address, AddressBook};
pub use auth::{AuthError, AuthState, Profile, Session, SessionStorage, SessionStore};
pub use cart::{Cart, CartLine, CartSynchronizer, CartTotals};
pub use catalog::{Catalog, Product};
pub use checkout::{
    AddressSelection, CheckoutForm, CheckoutOrchestrator, CheckoutReceipt, PaymentProcessor,
    SimulatedPayment, ValidationErrors,
};
pub use clients::{Gateway, HttpError, NetworkError, ServerError};
pub use config::{BaseUrl, StorefrontConfig, StorefrontConfigBuilder};
pub use error::{ConfigError, StorefrontError};
pub use ids::{AddressId, ProductId, UserId};

/// The assembled engine.
///
/// Every service shares one [`Gateway`], which is bound to one session cell
/// over the given storage.
#[derive(Debug, Clone)]
pub struct Storefront {
    gateway: Arc<Gateway>,
    sessions: SessionStore,
    cart: Arc<CartSynchronizer>,
    checkout: Arc<CheckoutOrchestrator>,
    catalog: Catalog,
    addresses: AddressBook,
}

// Verify Storefront is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Storefront>();
};

impl Storefront {
    /// Builds every service for the configured backend.
    ///
    /// The engine starts `Anonymous`; call
    /// [`SessionStore::restore`] to pick up a persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be
    /// created.
    pub fn new(
        config: &StorefrontConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, ConfigError> {
        let cell = auth::SessionCell::new(storage);
        let gateway = Arc::new(Gateway::new(config, cell)?);
        let cart = Arc::new(CartSynchronizer::new(Arc::clone(&gateway)));

        Ok(Self {
            sessions: SessionStore::new(Arc::clone(&gateway)),
            checkout: Arc::new(CheckoutOrchestrator::new(
                Arc::clone(&gateway),
                Arc::clone(&cart),
                config,
            )),
            catalog: Catalog::new(Arc::clone(&gateway)),
            addresses: AddressBook::new(Arc::clone(&gateway)),
            cart,
            gateway,
        })
    }

    /// Returns the gateway.
    #[must_use]
    pub const fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Returns the session store.
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Returns the cart synchronizer.
    #[must_use]
    pub const fn cart(&self) -> &Arc<CartSynchronizer> {
        &self.cart
    }

    /// Returns the checkout orchestrator.
    #[must_use]
    pub const fn checkout(&self) -> &Arc<CheckoutOrchestrator> {
        &self.checkout
    }

    /// Returns the catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the address book.
    #[must_use]
    pub const fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    /// Restores a persisted session and, if one was found, refreshes the cart.
    ///
    /// A failed cart refresh is logged and does not undo the restoration.
    pub async fn start(&self) -> AuthState {
        let state = self.sessions.restore().await;
        if state.is_authenticated() {
            if let Err(e) = self.cart.refresh().await {
                tracing::warn!("Cart refresh after restore failed: {e}");
            }
        }
        self.sessions.state().await
    }

    /// Logs out and empties the local cart.
    ///
    /// The session is invalidated first, so a cart refresh still in flight
    /// cannot repopulate the cart afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Storage`] if persisted keys could not be
    /// removed; the visitor is signed out and the cart emptied regardless.
    pub async fn logout(&self) -> Result<(), StorefrontError> {
        let result = self.sessions.logout().await;
        self.cart.clear().await;
        result
    }
}
