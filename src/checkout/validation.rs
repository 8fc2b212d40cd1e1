//! Field-level checkout validation.
//!
//! Validation runs before any network call. Every failing field is reported,
//! not just the first; whitespace-only input counts as empty.

use std::fmt;

use thiserror::Error;

use crate::checkout::form::{AddressSelection, CheckoutForm};

/// Minimum digits in a card number.
pub const MIN_CARD_DIGITS: usize = 16;

/// Minimum digits in a CVV.
pub const MIN_CVV_DIGITS: usize = 3;

/// A checkout form field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckoutField {
    /// Contact email.
    Email,
    /// Contact phone.
    Phone,
    /// Shipping street.
    Street,
    /// Shipping city.
    City,
    /// Shipping state.
    State,
    /// Shipping postal code.
    ZipCode,
    /// Shipping country.
    Country,
    /// Card number.
    CardNumber,
    /// Card expiry.
    Expiry,
    /// Card security code.
    Cvv,
    /// Name on the card.
    CardholderName,
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Street => "street",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zip_code",
            Self::Country => "country",
            Self::CardNumber => "card_number",
            Self::Expiry => "expiry",
            Self::Cvv => "cvv",
            Self::CardholderName => "cardholder_name",
        };
        f.write_str(name)
    }
}

/// One field's validation failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// The failing field.
    pub field: CheckoutField,
    /// Message to show next to the field.
    pub message: &'static str,
}

/// Every field that failed validation, in form order.
///
/// # Example
///
/// ```rust
/// use storefront_session::checkout::{validate, AddressSelection, CheckoutField, CheckoutForm};
///
/// let errors = validate(&CheckoutForm::new(), &AddressSelection::New).unwrap_err();
/// assert_eq!(errors.message_for(CheckoutField::Email), Some("Email is required"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Error)]
#[error("Please correct the highlighted fields: {}", summary(.errors))]
pub struct ValidationErrors {
    /// The failures.
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Returns `true` if no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the message for `field`, if it failed.
    #[must_use]
    pub fn message_for(&self, field: CheckoutField) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    /// Returns `true` if `field` failed.
    #[must_use]
    pub fn has(&self, field: CheckoutField) -> bool {
        self.message_for(field).is_some()
    }

    fn push(&mut self, field: CheckoutField, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Checks `local@domain.tld`: no whitespace, exactly one `@`, and a dot
/// inside the domain with characters on both sides.
fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .rfind('.')
        .is_some_and(|dot| dot > 0 && dot + 1 < domain.len())
}

fn is_valid_expiry(expiry: &str) -> bool {
    let bytes = expiry.as_bytes();
    bytes.len() == 5
        && bytes[2] == b'/'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit)
}

/// Validates `form` for submission with the given address selection.
///
/// Shipping fields are only required when a new address will be created.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing every failing field.
pub fn validate(form: &CheckoutForm, selection: &AddressSelection) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let contact = &form.contact;
    if blank(&contact.email) {
        errors.push(CheckoutField::Email, "Email is required");
    } else if !is_valid_email(&contact.email) {
        errors.push(CheckoutField::Email, "Please enter a valid email");
    }

    if blank(&contact.phone) {
        errors.push(CheckoutField::Phone, "Phone number is required");
    }

    if selection.is_new() {
        let shipping = &form.shipping;
        let required = [
            (CheckoutField::Street, &shipping.street, "Street address is required"),
            (CheckoutField::City, &shipping.city, "City is required"),
            (CheckoutField::State, &shipping.state, "State is required"),
            (CheckoutField::ZipCode, &shipping.zip_code, "ZIP code is required"),
            (CheckoutField::Country, &shipping.country, "Country is required"),
        ];
        for (field, value, message) in required {
            if blank(value) {
                errors.push(field, message);
            }
        }
    }

    let payment = &form.payment;
    let card: String = payment
        .card_number
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if card.is_empty() {
        errors.push(CheckoutField::CardNumber, "Card number is required");
    } else if card.len() < MIN_CARD_DIGITS || !card.chars().all(|c| c.is_ascii_digit()) {
        errors.push(CheckoutField::CardNumber, "Please enter a valid card number");
    }

    let expiry = payment.expiry.trim();
    if expiry.is_empty() {
        errors.push(CheckoutField::Expiry, "Expiry date is required");
    } else if !is_valid_expiry(expiry) {
        errors.push(CheckoutField::Expiry, "Please enter date in MM/YY format");
    }

    let cvv = payment.cvv.trim();
    if cvv.is_empty() {
        errors.push(CheckoutField::Cvv, "CVV is required");
    } else if cvv.len() < MIN_CVV_DIGITS || !cvv.chars().all(|c| c.is_ascii_digit()) {
        errors.push(CheckoutField::Cvv, "Please enter a valid CVV");
    }

    if blank(&payment.cardholder_name) {
        errors.push(CheckoutField::CardholderName, "Cardholder name is required");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
