//! Checkout form types.
//!
//! A [`CheckoutForm`] lives for one checkout attempt and is never persisted.
//! Submission borrows it, so a failed attempt leaves every entered value in
//! place for a retry.

use std::fmt;

use crate::auth::Session;
use crate::ids::AddressId;

/// Country preselected on a new form.
pub const DEFAULT_COUNTRY: &str = "United States";

/// Contact details.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactInfo {
    /// Email for the order confirmation.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
}

/// Shipping address fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShippingAddress {
    /// Street and house number.
    pub street: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Postal code.
    pub zip_code: String,
    /// Country.
    pub country: String,
}

/// Card details. `Debug` masks the card number and CVV.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PaymentDetails {
    /// Card number; spaces allowed.
    pub card_number: String,
    /// Expiry in `MM/YY`.
    pub expiry: String,
    /// Card security code.
    pub cvv: String,
    /// Name printed on the card.
    pub cardholder_name: String,
}

impl PaymentDetails {
    /// Returns the last four digits of the card number, if it has that many.
    #[must_use]
    pub fn last_four(&self) -> Option<String> {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        (digits.len() >= 4).then(|| digits[digits.len() - 4..].iter().collect())
    }
}

impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked_card = self
            .last_four()
            .map_or_else(|| "*****".to_string(), |last| format!("**** {last}"));
        f.debug_struct("PaymentDetails")
            .field("card_number", &masked_card)
            .field("expiry", &self.expiry)
            .field("cvv", &"***")
            .field("cardholder_name", &self.cardholder_name)
            .finish()
    }
}

/// Everything the visitor enters at checkout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    /// Contact details.
    pub contact: ContactInfo,
    /// Where to ship.
    pub shipping: ShippingAddress,
    /// How to pay.
    pub payment: PaymentDetails,
}

impl CheckoutForm {
    /// Returns a blank form with the country preselected.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shipping: ShippingAddress {
                country: DEFAULT_COUNTRY.to_string(),
                ..ShippingAddress::default()
            },
            ..Self::default()
        }
    }

    /// Returns a new form with the contact email taken from `session`.
    #[must_use]
    pub fn for_session(session: &Session) -> Self {
        let mut form = Self::new();
        form.contact.email.clone_from(&session.profile.email);
        form
    }
}

/// Which shipping address the order uses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AddressSelection {
    /// Create a new address from the form's shipping fields.
    #[default]
    New,
    /// Use an address already saved on the account.
    Saved(AddressId),
}

impl AddressSelection {
    /// Returns `true` when a new address will be created.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }
}
