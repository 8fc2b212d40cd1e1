//! HTTP layer for talking to the commerce backend.
//!
//! # Overview
//!
//! - [`Gateway`]: the async client every backend call goes through
//! - [`HttpRequest`]: a request to be sent through the gateway
//! - [`HttpResponse`]: a parsed backend response
//! - [`HttpMethod`]: supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`HttpError`]: everything a gateway call can fail with
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_session::clients::{Gateway, HttpMethod, HttpRequest};
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "cart")
//!     .query_param("id", user_id.as_ref())
//!     .build()?;
//!
//! let response = gateway.request(request).await?;
//! ```
//!
//! # Failure Behavior
//!
//! The gateway never retries. A timed-out call fails with [`NetworkError`]
//! once the configured timeout elapses; a 401 signs the visitor out before
//! [`HttpError::Unauthorized`] is returned.

mod errors;
mod gateway;
mod http_request;
mod http_response;

pub use errors::{
    HttpError, InvalidHttpRequestError, NetworkError, NetworkErrorKind, ServerError,
    GENERIC_ERROR_MESSAGE,
};
pub use gateway::{Gateway, CREDENTIAL_HEADER, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;

/// Backend endpoint paths, relative to the base URL.
pub mod endpoints {
    /// `POST` create account.
    pub const SIGNUP: &str = "signup";
    /// `POST` authenticate.
    pub const LOGIN: &str = "login";
    /// `GET` list the catalog.
    pub const PRODUCTS: &str = "products";
    /// `GET` search the catalog by name.
    pub const PRODUCT_SEARCH: &str = "products/search";
    /// `GET` fetch the cart and its total.
    pub const CART: &str = "cart";
    /// `GET` add a product to the cart.
    pub const CART_ADD: &str = "cart/add";
    /// `GET` remove a product from the cart.
    pub const CART_REMOVE: &str = "cart/remove";
    /// `GET` server-side order placement of the whole cart.
    pub const CART_CHECKOUT: &str = "cart/checkout";
    /// `GET` single-item purchase bypassing the cart.
    pub const INSTANT_BUY: &str = "cart/instant-buy";
    /// `POST` create a shipping address.
    pub const ADDRESS: &str = "address";
    /// `PUT` edit the home address.
    pub const ADDRESS_HOME: &str = "address/home";
    /// `PUT` edit the work address.
    pub const ADDRESS_WORK: &str = "address/work";
    /// `GET` delete all saved addresses.
    pub const ADDRESS_DELETE: &str = "address/delete";
}
