//! Cart data types.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::catalog::{null_as_default, Product};
use crate::ids::ProductId;

/// Presentation tax rate applied on top of the subtotal (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// One product's entry in a cart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartLine {
    /// Snapshot of the product taken when it was added.
    pub product: Product,
    /// How many units. Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// Returns the line's product id.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Returns unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Display totals derived from the cart lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    /// Sum of unit price times quantity over every line.
    pub subtotal: Decimal,
    /// Fixed-rate tax on the subtotal.
    pub tax: Decimal,
    /// Always zero.
    pub shipping: Decimal,
    /// Subtotal plus tax plus shipping.
    pub total: Decimal,
}

/// A backend cart entry.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CartEntry {
    #[serde(flatten)]
    product: Product,
    #[serde(default)]
    quantity: Option<u32>,
}

/// Body of `GET /cart`.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct CartResponse {
    #[serde(alias = "user_cart", default, deserialize_with = "null_as_default")]
    cart_items: Vec<CartEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    total_price: Decimal,
}

/// The local view of the visitor's server-side cart.
///
/// Never authoritative: it is replaced wholesale on every refresh.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    total_price: Decimal,
}

impl Cart {
    /// Builds a cart from backend entries.
    ///
    /// Entries sharing a product id fold into a single line whose quantity is
    /// the sum of the entry quantities (a missing quantity counts as 1).
    /// Lines keep first-seen order.
    pub(crate) fn from_response(response: CartResponse) -> Self {
        let mut lines: Vec<CartLine> = Vec::with_capacity(response.cart_items.len());

        for entry in response.cart_items {
            let quantity = entry.quantity.unwrap_or(1);
            if quantity == 0 {
                continue;
            }
            match lines
                .iter_mut()
                .find(|line| line.product.id == entry.product.id)
            {
                Some(line) => line.quantity = line.quantity.saturating_add(quantity),
                None => lines.push(CartLine {
                    product: entry.product,
                    quantity,
                }),
            }
        }

        Self {
            lines,
            total_price: response.total_price,
        }
    }

    /// Returns the cart lines in server order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    /// Returns `true` if a line exists for `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.line(product_id).is_some()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The total reported by the backend.
    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Computes display totals: subtotal, 10% tax, zero shipping.
    ///
    /// # Example
    ///
    /// ```rust
    /// use storefront_session::cart::Cart;
    ///
    /// let totals = Cart::default().totals();
    /// assert!(totals.total.is_zero());
    /// ```
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        let subtotal: Decimal = self.lines.iter().map(CartLine::line_total).sum();
        let tax = round_cents(subtotal * TAX_RATE);
        let shipping = Decimal::ZERO;
        CartTotals {
            subtotal: round_cents(subtotal),
            tax,
            shipping,
            total: round_cents(subtotal + tax + shipping),
        }
    }
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
