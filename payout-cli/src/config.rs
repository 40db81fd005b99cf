//! Logging configuration loading from environment.

use std::env;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,payout_gateway=debug,payout_banks=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> anyhow::Result<Self> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("pretty") | Some("text") => Ok(LogFormat::Pretty),
            Some("json") => Ok(LogFormat::Json),
            Some(other) => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        }
    }
}

/// Application configuration.
pub struct Config {
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Bank credentials are read by the gateway itself, per enabled bank.
    pub fn from_env() -> anyhow::Result<Self> {
        let log_format = LogFormat::parse(env::var("LOG_FORMAT").ok().as_deref())?;
        Ok(Self { log_format })
    }

    /// Installs the global subscriber. Logs go to stderr so stdout stays JSON.
    pub fn init_tracing(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
        let registry = tracing_subscriber::registry().with(filter);
        match self.log_format {
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init(),
            LogFormat::Pretty => registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init(),
        }
    }
}
