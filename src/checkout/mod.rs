//! Checkout: form, validation, and order placement.
//!
//! # Overview
//!
//! - [`CheckoutForm`]: contact, shipping, and payment input for one attempt
//! - [`validate`] / [`ValidationErrors`]: field-scoped checks run before any
//!   network call
//! - [`CheckoutOrchestrator`]: the sequential order-placement flow
//! - [`PaymentProcessor`] / [`SimulatedPayment`]: payment capture
//! - [`format_expiry_input`] / [`format_card_number`]: input formatting
//!
//! # Example
//!
//! ```rust,ignore
//! let mut form = CheckoutForm::for_session(&session);
//! form.contact.phone = "+1 555 0100".to_string();
//! // ... fill shipping and payment ...
//!
//! match orchestrator.submit(&form, &AddressSelection::New).await {
//!     Ok(receipt) => println!("Paid {}", receipt.totals.total),
//!     Err(StorefrontError::Validation(errors)) => {
//!         for e in &errors.errors {
//!             println!("{}: {}", e.field, e.message);
//!         }
//!     }
//!     Err(e) => println!("Checkout failed: {e}"),
//! }
//! ```

mod form;
mod format;
mod orchestrator;
mod validation;

pub use form::{
    AddressSelection, CheckoutForm, ContactInfo, PaymentDetails, ShippingAddress, DEFAULT_COUNTRY,
};
pub use format::{format_card_number, format_expiry_input};
pub use orchestrator::{CheckoutOrchestrator, CheckoutReceipt, PaymentProcessor, SimulatedPayment};
pub use validation::{
    validate, CheckoutField, FieldError, ValidationErrors, MIN_CARD_DIGITS, MIN_CVV_DIGITS,
};
