//! The single chokepoint for backend calls.
//!
//! This module provides the [`Gateway`] type. Every backend call made by the
//! engine goes through [`Gateway::request`], which:
//!
//! - attaches the current session's bearer credential (header `token`)
//! - enforces the configured request timeout
//! - invalidates the session when the backend answers 401
//! - normalizes every other non-2xx response into a
//!   [`ServerError`](crate::clients::ServerError)

use std::collections::HashMap;

use crate::auth::SessionCell;
use crate::clients::errors::HttpError;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{BaseUrl, StorefrontConfig};
use crate::error::ConfigError;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header the backend reads the bearer credential from.
pub const CREDENTIAL_HEADER: &str = "token";

/// HTTP gateway to the commerce backend.
///
/// The gateway is bound to a [`SessionCell`]: the credential is read from the
/// cell at the moment each request is sent, never cached.
///
/// # Thread Safety
///
/// `Gateway` is `Send + Sync`; share it behind an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use storefront_session::auth::{MemoryStorage, SessionCell};
/// use storefront_session::clients::{Gateway, HttpMethod, HttpRequest};
/// use storefront_session::StorefrontConfig;
///
/// let config = StorefrontConfig::from_env()?;
/// let cell = SessionCell::new(Arc::new(MemoryStorage::new()));
/// let gateway = Gateway::new(&config, cell)?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "products").build()?;
/// let response = gateway.request(request).await?;
/// ```
#[derive(Debug)]
pub struct Gateway {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Backend base URL.
    base_url: BaseUrl,
    /// Headers included in every request.
    default_headers: HashMap<String, String>,
    /// Source of the bearer credential.
    session: SessionCell,
}

// Verify Gateway is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Gateway>();
};

impl Gateway {
    /// Creates a gateway for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the underlying reqwest client
    /// cannot be created.
    pub fn new(config: &StorefrontConfig, session: SessionCell) -> Result<Self, ConfigError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!(
            "{user_agent_prefix}Storefront Session Engine v{SDK_VERSION} | Rust {rust_version}"
        );

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url().clone(),
            default_headers,
            session,
        })
    }

    /// Returns the backend base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the headers included in every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the session cell this gateway reads credentials from.
    #[must_use]
    pub const fn session(&self) -> &SessionCell {
        &self.session
    }

    /// Returns the headers the next request would carry, credential included.
    pub async fn outbound_headers(&self) -> HashMap<String, String> {
        let mut headers = self.default_headers.clone();
        if let Some(credential) = self.session.credential().await {
            headers.insert(CREDENTIAL_HEADER.to_string(), credential);
        }
        headers
    }

    /// Sends a request to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - The call times out or the connection fails (`Network`)
    /// - The backend rejects the credential (`Unauthorized`); the session
    ///   has been invalidated by the time this is returned
    /// - Any other non-2xx response is received (`Server`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.base_url.join(&request.path);
        let headers = self.outbound_headers().await;

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        for (key, value) in &headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        tracing::debug!(method = %request.http_method, path = %request.path, "Sending backend request");

        let res = req_builder.send().await.map_err(|e| {
            tracing::debug!(path = %request.path, "Backend request failed: {e}");
            HttpError::from(e)
        })?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await?;
        let response = HttpResponse::new(code, res_headers, HttpResponse::parse_body(&body_text));

        if response.is_ok() {
            return Ok(response);
        }

        let error = response.to_server_error();

        if response.is_unauthorized() {
            tracing::warn!(
                path = %request.path,
                "Backend rejected the session credential, signing out: {}",
                error.message
            );
            if let Err(e) = self.session.invalidate().await {
                tracing::warn!("Failed to clear persisted session: {e}");
            }
            return Err(HttpError::Unauthorized(error));
        }

        tracing::debug!(
            path = %request.path,
            status = code,
            request_id = response.request_id().unwrap_or_default(),
            "Backend returned an error: {}",
            error.message
        );
        Err(HttpError::Server(error))
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}
