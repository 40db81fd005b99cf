//! Thin JSON-over-HTTPS helper shared by the bank adapters.

use std::time::Duration;

use payout_types::GatewayError;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Longest bank-supplied message forwarded to callers.
const MAX_BANK_MESSAGE: usize = 200;

/// Low-level failure of a bank call.
///
/// Never handed to callers as-is: adapters turn it into a [`GatewayError`]
/// carrying [`BankError::sanitized`].
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BankError {
    /// Caller-safe description: no URLs, no raw transport internals.
    pub fn sanitized(&self) -> String {
        match self {
            BankError::Http(e) if e.is_timeout() => "request to bank timed out".to_string(),
            BankError::Http(e) if e.is_connect() => "bank unreachable".to_string(),
            BankError::Http(_) => "bank request failed".to_string(),
            BankError::Api { status, message } if message.trim().is_empty() => {
                format!("bank responded with HTTP {}", status)
            }
            BankError::Api { status, message } => format!(
                "bank responded with HTTP {}: {}",
                status,
                message.chars().take(MAX_BANK_MESSAGE).collect::<String>()
            ),
            BankError::Json(_) => "unexpected response from bank".to_string(),
        }
    }
}

/// HTTP client bound to one bank's base URL.
#[derive(Debug, Clone)]
pub struct BankHttp {
    base_url: String,
    base: Url,
    http: Client,
}

impl BankHttp {
    /// Creates a client whose every call is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| GatewayError::Config(format!("invalid base URL {}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::Config(format!(
                "base URL cannot carry a path: {}",
                base_url
            )));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url,
            base,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a request to `path` under the base URL.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Starts a request to the base URL extended by `segments`, each one
    /// percent-encoded so ids can never change the path's shape.
    ///
    /// Empty, `.` and `..` segments are refused.
    pub fn request_segments(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, GatewayError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(GatewayError::Validation(format!(
                "malformed path segment: {:?}",
                bad
            )));
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::Config(format!("base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(self.http.request(method, url))
    }

    /// Sends a request and decodes a JSON body, mapping non-2xx to [`BankError::Api`].
    pub async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, BankError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(BankError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

/// Pulls a human message out of an error body, whatever the bank calls the field.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "message", "mensajeError", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|e| e.as_str()).map(String::from))
        })
        .unwrap_or_else(|| body.to_string())
}

/// An identifier banks send either as a JSON string or as a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BankId {
    Text(String),
    Number(serde_json::Number),
}

impl BankId {
    /// The id as text, surrounding whitespace removed.
    pub fn into_string(self) -> String {
        match self {
            BankId::Text(text) => text.trim().to_string(),
            BankId::Number(number) => number.to_string(),
        }
    }
}
