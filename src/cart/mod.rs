//! The visitor's cart.
//!
//! - [`Cart`] / [`CartLine`]: the local view of the server-side cart
//! - [`CartTotals`]: display totals (subtotal, 10% tax, zero shipping)
//! - [`CartSynchronizer`]: keeps the local view in step with the backend
//!
//! The backend is the source of truth. Reads reflect the last full refresh;
//! only the display totals are computed locally.

mod model;
mod synchronizer;

pub use model::{Cart, CartLine, CartTotals, TAX_RATE};
pub use synchronizer::CartSynchronizer;
