//! Per-provider OAuth access token cache.
//!
//! States: no token -> valid(token, expiry) -> expired -> valid ...
//! A token is reused while `now + margin < expiry`; otherwise the caller's
//! refresh future runs under the cache lock, so concurrent callers that find
//! the token stale wait for a single exchange and share its result.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use payout_types::GatewayError;
use serde::Deserialize;
use tokio::sync::Mutex;

/// Tokens are refreshed this long before the bank says they expire.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Longer lifetimes are clamped; the token is simply refreshed sooner.
const MAX_EXPIRES_IN: u64 = 86_400;

/// An access token and the instant it stops being accepted.
#[derive(Clone)]
pub struct AuthToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// A token valid for `expires_in` seconds from now.
    pub fn new(value: impl Into<String>, expires_in: u64) -> Self {
        let lifetime = TimeDelta::seconds(expires_in.min(MAX_EXPIRES_IN) as i64);
        Self::expiring_at(value, Utc::now() + lifetime)
    }

    pub fn expiring_at(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True while the token can still be used at `now`, keeping `margin` in hand.
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: TimeDelta) -> bool {
        now + margin < self.expires_at
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// OAuth2 client-credentials token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    /// Converts the response into a cached token, rejecting bodies without a token.
    pub fn into_token(self) -> Result<AuthToken, GatewayError> {
        match self.access_token {
            Some(token) if !token.is_empty() => Ok(AuthToken::new(
                token,
                self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
            )),
            _ => Err(GatewayError::Authentication(
                "token endpoint returned no access_token".into(),
            )),
        }
    }
}

/// The one piece of mutable state a provider owns.
pub struct TokenCache {
    slot: Mutex<Option<AuthToken>>,
    margin: TimeDelta,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    pub fn new() -> Self {
        Self::with_margin(REFRESH_MARGIN)
    }

    pub fn with_margin(margin: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            margin: TimeDelta::from_std(margin).unwrap_or(TimeDelta::zero()),
        }
    }

    /// Returns the cached token, running `refresh` first if it is absent or stale.
    ///
    /// A failed refresh leaves the cache exactly as it was.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<String, GatewayError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AuthToken, GatewayError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref() {
            if token.is_fresh(Utc::now(), self.margin) {
                return Ok(token.value.clone());
            }
        }

        let token = refresh().await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    /// Snapshot of the cached token.
    pub async fn current(&self) -> Option<AuthToken> {
        self.slot.lock().await.clone()
    }

    /// Replaces the cached token, e.g. with one provisioned out of band.
    pub async fn store(&self, token: AuthToken) {
        *self.slot.lock().await = Some(token);
    }
}
