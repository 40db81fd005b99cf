//! Provider configuration loading from environment.

use std::env;
use std::fmt;
use std::time::Duration;

use payout_types::{AmountLimits, BankInfo, GatewayError};

/// Default bound on every outbound bank call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials and endpoint of one bank provider.
///
/// Owned by the hosting application and treated as a secret: the `Debug`
/// output redacts the client secret.
#[derive(Clone)]
pub struct BankProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    /// Operating account the payouts are debited from
    pub origin_account: String,
    pub timeout: Duration,
    pub limits: AmountLimits,
}

impl fmt::Debug for BankProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("origin_account", &payout_types::mask_account(&self.origin_account))
            .field("timeout", &self.timeout)
            .field("limits", &self.limits)
            .finish()
    }
}

impl BankProviderConfig {
    /// Creates a configuration with default timeout and limits.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        base_url: impl Into<String>,
        origin_account: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: base_url.into(),
            origin_account: origin_account.into(),
            timeout: DEFAULT_TIMEOUT,
            limits: AmountLimits::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_limits(mut self, limits: AmountLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Loads configuration for a bank from environment variables.
    ///
    /// Variables are prefixed with the bank symbol, e.g. `BANCO_ESTADO_CLIENT_ID`.
    pub fn from_env(bank: &BankInfo, default_base_url: &str) -> Result<Self, GatewayError> {
        Self::from_lookup(bank.symbol, default_base_url, |key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Required: `<PREFIX>_CLIENT_ID`, `<PREFIX>_CLIENT_SECRET`, `<PREFIX>_ORIGIN_ACCOUNT`.
    /// Optional: `<PREFIX>_BASE_URL`, `<PREFIX>_TIMEOUT_SECS`, `<PREFIX>_MIN_AMOUNT`,
    /// `<PREFIX>_MAX_AMOUNT`.
    pub fn from_lookup<F>(
        prefix: &str,
        default_base_url: &str,
        lookup: F,
    ) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{}_{}", prefix, name)).filter(|value| !value.trim().is_empty())
        };
        let required = |name: &str| {
            var(name).ok_or_else(|| {
                GatewayError::Config(format!(
                    "{}_{} environment variable is required",
                    prefix, name
                ))
            })
        };
        let parsed = |name: &str| -> Result<Option<i64>, GatewayError> {
            var(name)
                .map(|raw| {
                    raw.trim().parse::<i64>().map_err(|_| {
                        GatewayError::Config(format!("{}_{} must be an integer", prefix, name))
                    })
                })
                .transpose()
        };

        let defaults = AmountLimits::default();
        let limits = AmountLimits {
            min: parsed("MIN_AMOUNT")?.unwrap_or(defaults.min),
            max: parsed("MAX_AMOUNT")?.unwrap_or(defaults.max),
        };
        let timeout = match parsed("TIMEOUT_SECS")? {
            Some(secs) if secs > 0 => Duration::from_secs(secs as u64),
            Some(_) => {
                return Err(GatewayError::Config(format!(
                    "{}_TIMEOUT_SECS must be positive",
                    prefix
                )));
            }
            None => DEFAULT_TIMEOUT,
        };

        let config = Self::new(
            required("CLIENT_ID")?,
            required("CLIENT_SECRET")?,
            var("BASE_URL").unwrap_or_else(|| default_base_url.to_string()),
            required("ORIGIN_ACCOUNT")?,
        )
        .with_timeout(timeout)
        .with_limits(limits);
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration is usable. Called by every provider constructor.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.client_id.trim().is_empty() || self.client_secret.trim().is_empty() {
            return Err(GatewayError::Config("client credentials are incomplete".into()));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(GatewayError::Config(format!(
                "base URL must be http(s): {}",
                self.base_url
            )));
        }
        if payout_types::normalize_account_number(&self.origin_account).is_empty() {
            return Err(GatewayError::Config("origin account is required".into()));
        }
        if self.limits.min <= 0 || self.limits.min > self.limits.max {
            return Err(GatewayError::Config(format!(
                "invalid amount limits {}..={}",
                self.limits.min, self.limits.max
            )));
        }
        Ok(())
    }
}
