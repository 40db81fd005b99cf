//! Bank Dispatcher
//!
//! Routes every operation to the provider registered for a bank, whatever
//! form the caller names the bank in. Contains no bank-specific logic.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use chrono::NaiveDate;
use payout_types::domain::bank;
use payout_types::{
    AccountValidation, Balance, BankInfo, BankProvider, GatewayError, Movement, StatusReport,
    TransferRequest, TransferResponse, mask_account,
};
use tracing::{debug, info, warn};

/// Banks enabled when `PAYOUT_BANKS` is unset.
pub const DEFAULT_BANKS: &str = "BANCO_ESTADO,BANCO_DE_CHILE";

/// Registry of bank providers keyed by canonical bank symbol.
///
/// Immutable once built; share it behind an `Arc` across handlers.
pub struct Dispatcher {
    providers: HashMap<&'static str, Arc<dyn BankProvider>>,
}

/// Collects providers before the registry is frozen.
#[derive(Default)]
pub struct DispatcherBuilder {
    providers: HashMap<&'static str, Arc<dyn BankProvider>>,
}

impl DispatcherBuilder {
    /// Registers a provider under its own bank. One provider per bank.
    pub fn register(mut self, provider: Arc<dyn BankProvider>) -> Result<Self, GatewayError> {
        let symbol = provider.bank().symbol;
        if self.providers.contains_key(symbol) {
            return Err(GatewayError::Config(format!(
                "a provider for {} is already registered",
                symbol
            )));
        }
        self.providers.insert(symbol, provider);
        Ok(self)
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            providers: self.providers,
        }
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Builds providers for the banks listed in `PAYOUT_BANKS` from the environment.
    pub fn from_env() -> Result<Self, GatewayError> {
        let list = env::var("PAYOUT_BANKS").unwrap_or_else(|_| DEFAULT_BANKS.to_string());
        Self::from_bank_list(&list)
    }

    /// Builds providers for a comma-separated list of banks, each configured
    /// from its `<SYMBOL>_*` environment variables.
    pub fn from_bank_list(list: &str) -> Result<Self, GatewayError> {
        let mut builder = Self::builder();
        for bank in parse_bank_list(list)? {
            builder = builder.register(payout_banks::provider_from_env(bank)?)?;
        }
        let dispatcher = builder.build();
        info!(
            banks = ?dispatcher.supported_banks().iter().map(|b| b.symbol).collect::<Vec<_>>(),
            "bank dispatcher ready"
        );
        Ok(dispatcher)
    }

    /// Provider registered for a bank code or name.
    pub fn provider(&self, identifier: &str) -> Result<&Arc<dyn BankProvider>, GatewayError> {
        bank::resolve(identifier)
            .and_then(|info| self.providers.get(info.symbol))
            .ok_or_else(|| {
                warn!(bank = identifier, failure = "UNSUPPORTED_BANK", "no provider for bank");
                GatewayError::UnsupportedBank(identifier.to_string())
            })
    }

    /// Banks with a registered provider, ordered by code.
    pub fn supported_banks(&self) -> Vec<&'static BankInfo> {
        let mut banks: Vec<_> = self.providers.values().map(|p| p.bank()).collect();
        banks.sort_by_key(|b| b.code());
        banks
    }

    pub fn is_supported(&self, identifier: &str) -> bool {
        bank::resolve(identifier).is_some_and(|info| self.providers.contains_key(info.symbol))
    }

    /// Display name of any catalog bank.
    pub fn bank_name(identifier: &str) -> Option<&'static str> {
        bank::bank_name(identifier)
    }

    /// Primary clearing code of any catalog bank.
    pub fn bank_code(identifier: &str) -> Option<&'static str> {
        bank::bank_code(identifier)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Pays out through the provider of `bank`.
    ///
    /// Errors only for an unsupported bank; every other outcome is in the response.
    pub async fn transfer(
        &self,
        bank: &str,
        req: &TransferRequest,
    ) -> Result<TransferResponse, GatewayError> {
        let provider = self.provider(bank)?;
        let symbol = provider.bank().symbol;
        debug!(bank = symbol, reference_id = %req.reference_id, "dispatching transfer");

        let resp = provider.transfer(req).await;

        if resp.success() {
            info!(
                bank = symbol,
                outcome = "success",
                amount = req.amount,
                currency = %req.currency,
                recipient = %mask_account(&req.recipient_account),
                transaction_id = resp.transaction_id().unwrap_or_default(),
                reference_id = %req.reference_id,
                status = %resp.status(),
                "transfer accepted"
            );
        } else {
            warn!(
                bank = symbol,
                outcome = "failure",
                amount = req.amount,
                currency = %req.currency,
                recipient = %mask_account(&req.recipient_account),
                transaction_id = resp.transaction_id().unwrap_or_default(),
                reference_id = %req.reference_id,
                failure = ?resp.failure(),
                error = resp.error_message().unwrap_or_default(),
                "transfer failed"
            );
        }
        Ok(resp)
    }

    /// Validates a destination account with the provider of `bank`.
    pub async fn validate_account(
        &self,
        bank: &str,
        validation: AccountValidation,
    ) -> Result<AccountValidation, GatewayError> {
        let provider = self.provider(bank)?;
        let account = mask_account(&validation.account_number);
        let result = provider.validate_account(validation).await;
        info!(
            bank = provider.bank().symbol,
            outcome = if result.is_valid { "valid" } else { "invalid" },
            account = %account,
            reason = result.error_message.as_deref().unwrap_or_default(),
            "account validated"
        );
        Ok(result)
    }

    /// Polls a transfer at the provider of `bank`.
    pub async fn transaction_status(
        &self,
        bank: &str,
        transaction_id: &str,
    ) -> Result<StatusReport, GatewayError> {
        let provider = self.provider(bank)?;
        let report = provider.transaction_status(transaction_id).await;
        info!(
            bank = provider.bank().symbol,
            transaction_id,
            status = %report.status,
            raw_status = report.raw_status.as_deref().unwrap_or_default(),
            failure = ?report.failure,
            "transfer status"
        );
        Ok(report)
    }

    /// Balance of the operating account held at `bank`.
    pub async fn balance(&self, bank: &str) -> Result<Balance, GatewayError> {
        let provider = self.provider(bank)?;
        let result = provider.balance().await;
        match &result {
            Ok(balance) => info!(
                bank = provider.bank().symbol,
                outcome = "success",
                available = balance.available,
                currency = %balance.currency,
                "balance queried"
            ),
            Err(e) => warn!(
                bank = provider.bank().symbol,
                outcome = "failure",
                error = %e,
                "balance query failed"
            ),
        }
        result
    }

    /// Movements of the operating account held at `bank`, both dates inclusive.
    pub async fn transaction_history(
        &self,
        bank: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Movement>, GatewayError> {
        let provider = self.provider(bank)?;
        let result = provider.transaction_history(from, to).await;
        match &result {
            Ok(movements) => info!(
                bank = provider.bank().symbol,
                outcome = "success",
                %from,
                %to,
                count = movements.len(),
                "history queried"
            ),
            Err(e) => warn!(
                bank = provider.bank().symbol,
                outcome = "failure",
                error = %e,
                "history query failed"
            ),
        }
        result
    }
}

/// Parses a comma-separated list of bank codes or names, dropping duplicates.
pub fn parse_bank_list(list: &str) -> Result<Vec<&'static BankInfo>, GatewayError> {
    let mut banks: Vec<&'static BankInfo> = Vec::new();
    for identifier in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let info = bank::resolve(identifier)
            .ok_or_else(|| GatewayError::UnsupportedBank(identifier.to_string()))?;
        if !banks.iter().any(|b| b.symbol == info.symbol) {
            banks.push(info);
        }
    }
    if banks.is_empty() {
        return Err(GatewayError::Config("PAYOUT_BANKS lists no banks".into()));
    }
    Ok(banks)
}
