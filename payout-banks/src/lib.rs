//! # Payout Banks
//!
//! Concrete bank provider adapters for the payout gateway.
//! Each adapter implements the `BankProvider` port over the bank's HTTPS API
//! and owns the one piece of mutable state a provider has: its token cache.

use std::sync::Arc;

use payout_types::domain::bank::{BANCO_DE_CHILE, BANCO_ESTADO};
use payout_types::{BankInfo, BankProvider, GatewayError};

pub mod banco_chile;
pub mod banco_estado;
pub mod config;
pub mod destination;
pub mod http;
pub mod signer;
pub mod status;
pub mod token;

pub use banco_chile::BancoChile;
pub use banco_estado::BancoEstado;
pub use config::BankProviderConfig;
pub use signer::RequestSigner;
pub use token::{AuthToken, TokenCache};

/// Production base URL of a bank, if an adapter exists for it.
pub fn default_base_url(bank: &BankInfo) -> Option<&'static str> {
    match bank.symbol {
        s if s == BANCO_ESTADO.symbol => Some(BancoEstado::DEFAULT_BASE_URL),
        s if s == BANCO_DE_CHILE.symbol => Some(BancoChile::DEFAULT_BASE_URL),
        _ => None,
    }
}

/// Builds the provider for a catalog bank.
///
/// Fails with `UnsupportedBank` for catalog banks without an adapter and with
/// `Config` when the configuration is unusable.
pub fn build_provider(
    bank: &BankInfo,
    config: BankProviderConfig,
) -> Result<Arc<dyn BankProvider>, GatewayError> {
    match bank.symbol {
        s if s == BANCO_ESTADO.symbol => Ok(Arc::new(BancoEstado::new(config)?)),
        s if s == BANCO_DE_CHILE.symbol => Ok(Arc::new(BancoChile::new(config)?)),
        _ => Err(GatewayError::UnsupportedBank(bank.symbol.to_string())),
    }
}

/// Builds the provider for a bank from `<SYMBOL>_*` environment variables.
pub fn provider_from_env(bank: &BankInfo) -> Result<Arc<dyn BankProvider>, GatewayError> {
    let base_url = default_base_url(bank)
        .ok_or_else(|| GatewayError::UnsupportedBank(bank.symbol.to_string()))?;
    let config = BankProviderConfig::from_env(bank, base_url)?;
    build_provider(bank, config)
}
