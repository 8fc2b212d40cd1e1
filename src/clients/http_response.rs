//! HTTP response types for backend calls.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::clients::errors::{HttpError, ServerError, GENERIC_ERROR_MESSAGE};

/// Body fields the backend uses for error text, in lookup order.
const ERROR_FIELDS: [&str; 3] = ["error", "Error", "message"];

/// A response from the backend.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lowercased (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    ///
    /// Non-JSON bodies are kept as a JSON string; empty bodies are `null`.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Parses raw body text the way the backend emits it.
    #[must_use]
    pub fn parse_body(text: &str) -> serde_json::Value {
        if text.trim().is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns `true` if the backend rejected the credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.code == 401
    }

    /// Returns the `X-Request-Id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("x-request-id")
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Extracts a human-readable error message from the body.
    ///
    /// Looks at the `error`, `Error`, and `message` fields, then at a bare
    /// string body, and falls back to [`GENERIC_ERROR_MESSAGE`].
    #[must_use]
    pub fn error_message(&self) -> String {
        let from_field = ERROR_FIELDS.iter().find_map(|field| {
            self.body.get(field).and_then(|value| match value {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                serde_json::Value::Null | serde_json::Value::String(_) => None,
                other => Some(other.to_string()),
            })
        });

        from_field
            .or_else(|| match &self.body {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
    }

    /// Converts a non-2xx response into a [`ServerError`].
    #[must_use]
    pub fn to_server_error(&self) -> ServerError {
        ServerError {
            status: self.code,
            message: self.error_message(),
        }
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::UnexpectedBody`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_value(self.body.clone()).map_err(|e| HttpError::UnexpectedBody {
            status: self.code,
            reason: e.to_string(),
        })
    }
}
