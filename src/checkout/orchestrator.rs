//! Order placement.
//!
//! [`CheckoutOrchestrator::submit`] runs strictly in sequence:
//!
//! 1. validate the form (no network call on failure)
//! 2. create the shipping address, unless a saved one was selected
//! 3. capture payment through the [`PaymentProcessor`]
//! 4. clear the local cart
//!
//! A failure at any step aborts the rest and leaves the cart untouched,
//! unless the backend rejected the credential: the visitor is then signed
//! out and the local cart is emptied with them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;

use crate::address::{Address, AddressBook};
use crate::auth::{AuthError, Session};
use crate::cart::{CartSynchronizer, CartTotals};
use crate::checkout::form::{AddressSelection, CheckoutForm};
use crate::checkout::validation::validate;
use crate::clients::{endpoints, Gateway, HttpMethod, HttpRequest};
use crate::config::StorefrontConfig;
use crate::error::StorefrontError;
use crate::ids::{AddressId, ProductId};

/// Captures payment for an order.
pub trait PaymentProcessor: Send + Sync {
    /// Captures `amount` and returns a payment reference.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Server`] or [`StorefrontError::Network`]
    /// when the capture fails.
    fn capture(
        &self,
        amount: Decimal,
        form: &CheckoutForm,
    ) -> impl Future<Output = Result<String, StorefrontError>> + Send;
}

/// A fixed-delay stand-in for a real payment gateway. Always succeeds.
#[derive(Clone, Copy, Debug)]
pub struct SimulatedPayment {
    delay: Duration,
}

impl SimulatedPayment {
    /// Creates a processor that waits `delay` per capture.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Returns the simulated capture delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl PaymentProcessor for SimulatedPayment {
    async fn capture(&self, amount: Decimal, _form: &CheckoutForm) -> Result<String, StorefrontError> {
        tokio::time::sleep(self.delay).await;
        let reference = format!("sim_{:016x}", rand::thread_rng().gen::<u64>());
        tracing::debug!(%amount, %reference, "Simulated payment captured");
        Ok(reference)
    }
}

/// Proof of a placed order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutReceipt {
    /// The address shipped to: the created one when the backend reported
    /// its id, or the saved one that was selected.
    pub address_id: Option<AddressId>,
    /// Reference returned by the payment processor.
    pub payment_reference: String,
    /// Display totals of the cart at submission.
    pub totals: CartTotals,
    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
}

/// Drives a checkout attempt from a validated form to a placed order.
#[derive(Debug)]
pub struct CheckoutOrchestrator<P: PaymentProcessor = SimulatedPayment> {
    gateway: Arc<Gateway>,
    cart: Arc<CartSynchronizer>,
    addresses: AddressBook,
    payments: P,
}

impl CheckoutOrchestrator<SimulatedPayment> {
    /// Creates an orchestrator using [`SimulatedPayment`] with the configured
    /// delay.
    #[must_use]
    pub fn new(
        gateway: Arc<Gateway>,
        cart: Arc<CartSynchronizer>,
        config: &StorefrontConfig,
    ) -> Self {
        Self::with_processor(gateway, cart, SimulatedPayment::new(config.payment_delay()))
    }
}

impl<P: PaymentProcessor> CheckoutOrchestrator<P> {
    /// Creates an orchestrator with a custom payment processor.
    #[must_use]
    pub fn with_processor(gateway: Arc<Gateway>, cart: Arc<CartSynchronizer>, payments: P) -> Self {
        let addresses = AddressBook::new(Arc::clone(&gateway));
        Self {
            gateway,
            cart,
            addresses,
            payments,
        }
    }

    /// Returns the payment processor.
    #[must_use]
    pub const fn payments(&self) -> &P {
        &self.payments
    }

    async fn session(&self) -> Result<Session, AuthError> {
        self.gateway
            .session()
            .current()
            .await
            .ok_or(AuthError::NotAuthenticated)
    }

    /// Empties the local cart when `error` means the visitor was signed out.
    async fn abort(&self, error: StorefrontError) -> StorefrontError {
        if matches!(error, StorefrontError::Auth(AuthError::SessionExpired { .. })) {
            self.cart.clear().await;
        }
        error
    }

    /// Validates `form` and places the order.
    ///
    /// The form is only borrowed, so it still holds the visitor's input if
    /// this fails.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Validation`] when any field fails; nothing is sent
    /// - [`StorefrontError::Auth`] without a session
    /// - [`StorefrontError::EmptyCart`] when the local cart has no lines
    /// - [`StorefrontError::Server`] / [`StorefrontError::Network`] when
    ///   address creation or payment capture fails; the cart is unchanged
    /// - [`StorefrontError::Auth`] when the backend rejects the credential
    ///   mid-flow; the visitor is signed out and the local cart emptied
    pub async fn submit(
        &self,
        form: &CheckoutForm,
        selection: &AddressSelection,
    ) -> Result<CheckoutReceipt, StorefrontError> {
        validate(form, selection)?;
        self.session().await?;

        let cart = self.cart.cart().await;
        if cart.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }
        let totals = cart.totals();

        let address_id = match selection {
            AddressSelection::New => {
                match self.addresses.add(&Address::from(&form.shipping)).await {
                    Ok(id) => id,
                    Err(e) => return Err(self.abort(e).await),
                }
            }
            AddressSelection::Saved(id) => Some(id.clone()),
        };

        let payment_reference = match self.payments.capture(totals.total, form).await {
            Ok(reference) => reference,
            Err(e) => return Err(self.abort(e).await),
        };

        self.cart.clear().await;

        tracing::info!(
            total = %totals.total,
            lines = cart.line_count(),
            "Order placed"
        );
        Ok(CheckoutReceipt {
            address_id,
            payment_reference,
            totals,
            placed_at: Utc::now(),
        })
    }

    /// Places the whole cart as an order on the backend, then clears the
    /// local cart.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Auth`] without a session
    /// - [`StorefrontError::Server`] / [`StorefrontError::Network`] when the
    ///   call fails; the cart is unchanged
    /// - [`StorefrontError::Auth`] when the backend rejects the credential;
    ///   the local cart is emptied
    pub async fn place_cart_order(&self) -> Result<(), StorefrontError> {
        let session = self.session().await?;

        let request = HttpRequest::builder(HttpMethod::Get, endpoints::CART_CHECKOUT)
            .query_param("id", session.user_id.as_ref())
            .build()?;
        if let Err(e) = self.gateway.request(request).await {
            return Err(self.abort(e.into()).await);
        }

        self.cart.clear().await;
        tracing::info!("Cart order placed");
        Ok(())
    }

    /// Buys a single product immediately, bypassing the cart.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Auth`] without a session
    /// - [`StorefrontError::Server`] / [`StorefrontError::Network`] when the
    ///   call fails
    /// - [`StorefrontError::Auth`] when the backend rejects the credential;
    ///   the local cart is emptied
    pub async fn instant_buy(&self, product_id: &ProductId) -> Result<(), StorefrontError> {
        let session = self.session().await?;

        let request = HttpRequest::builder(HttpMethod::Get, endpoints::INSTANT_BUY)
            .query_param("id", product_id.as_ref())
            .query_param("userID", session.user_id.as_ref())
            .build()?;
        if let Err(e) = self.gateway.request(request).await {
            return Err(self.abort(e.into()).await);
        }

        tracing::info!(product_id = %product_id, "Instant buy placed");
        Ok(())
    }
}
