//! Configuration types for the storefront session engine.
//!
//! # Overview
//!
//! - [`StorefrontConfig`]: all engine settings
//! - [`StorefrontConfigBuilder`]: builder for [`StorefrontConfig`]
//! - [`BaseUrl`]: a validated backend base URL
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use storefront_session::{BaseUrl, StorefrontConfig};
//!
//! let config = StorefrontConfig::builder()
//!     .base_url(BaseUrl::new("http://localhost:8000").unwrap())
//!     .timeout(Duration::from_secs(5))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "http://localhost:8000");
//! ```

mod newtypes;

pub use newtypes::BaseUrl;

use std::time::Duration;

use crate::error::ConfigError;

/// Backend used when `STOREFRONT_API_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Fixed request timeout applied to every backend call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long the simulated payment capture takes.
pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_secs(2);

/// Environment variable holding the backend base URL.
pub const BASE_URL_ENV: &str = "STOREFRONT_API_URL";

/// Environment variable overriding the request timeout, in whole seconds.
pub const TIMEOUT_ENV: &str = "STOREFRONT_TIMEOUT_SECS";

/// Configuration for the storefront session engine.
///
/// `StorefrontConfig` is `Clone`, `Send`, and `Sync`; build it once at
/// startup and hand references to the services that need it.
#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    base_url: BaseUrl,
    timeout: Duration,
    payment_delay: Duration,
    user_agent_prefix: Option<String>,
}

impl StorefrontConfig {
    /// Creates a new builder for constructing a `StorefrontConfig`.
    #[must_use]
    pub fn builder() -> StorefrontConfigBuilder {
        StorefrontConfigBuilder::new()
    }

    /// Builds a configuration from the process environment.
    ///
    /// Reads `STOREFRONT_API_URL` (falling back to [`DEFAULT_BASE_URL`]) and
    /// the optional `STOREFRONT_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] or [`ConfigError::InvalidTimeout`]
    /// when a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut builder = Self::builder().base_url(BaseUrl::new(url)?);

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout { value: raw.clone() })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Returns the backend base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the simulated payment capture delay.
    #[must_use]
    pub const fn payment_delay(&self) -> Duration {
        self.payment_delay
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify StorefrontConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StorefrontConfig>();
};

/// Builder for constructing [`StorefrontConfig`] instances.
///
/// `base_url` is required. Defaults:
///
/// - `timeout`: 10 seconds
/// - `payment_delay`: 2 seconds
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct StorefrontConfigBuilder {
    base_url: Option<BaseUrl>,
    timeout: Option<Duration>,
    payment_delay: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl StorefrontConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how long the simulated payment capture waits.
    #[must_use]
    pub const fn payment_delay(mut self, delay: Duration) -> Self {
        self.payment_delay = Some(delay);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`StorefrontConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` is not set,
    /// or [`ConfigError::InvalidTimeout`] for a zero timeout.
    pub fn build(self) -> Result<StorefrontConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout {
                value: "0".to_string(),
            });
        }

        Ok(StorefrontConfig {
            base_url,
            timeout,
            payment_delay: self.payment_delay.unwrap_or(DEFAULT_PAYMENT_DELAY),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> BaseUrl {
        BaseUrl::new("http://localhost:8000").unwrap()
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = StorefrontConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "base_url" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = StorefrontConfig::builder()
            .base_url(base_url())
            .build()
            .unwrap();

        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.payment_delay(), Duration::from_secs(2));
        assert!(config.user_agent_prefix().is_none());
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let result = StorefrontConfig::builder()
            .base_url(base_url())
            .timeout(Duration::ZERO)
            .build();

        assert!(matches!(result, Err(ConfigError::InvalidTimeout { .. })));
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = StorefrontConfig::builder()
            .base_url(base_url())
            .timeout(Duration::from_secs(3))
            .payment_delay(Duration::from_millis(5))
            .user_agent_prefix("ShopFront/2.0")
            .build()
            .unwrap();

        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.payment_delay(), Duration::from_millis(5));
        assert_eq!(config.user_agent_prefix(), Some("ShopFront/2.0"));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StorefrontConfig>();
    }
}
