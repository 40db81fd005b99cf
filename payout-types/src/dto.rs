//! Values crossing the gateway boundary.
//!
//! Every operation hands back one of these instead of an error for expected
//! business outcomes, so a payout workflow always receives a definite answer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Currency, Money};
use crate::error::{DomainError, FailureKind, GatewayError};

/// Message returned when the destination account fails validation.
pub const INVALID_DESTINATION: &str = "invalid or unfound destination account";

// ─────────────────────────────────────────────────────────────────────────────
// Transfer DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to pay out money to an external bank account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Destination account number, any separators allowed
    pub recipient_account: String,
    /// Legal name of the account holder
    pub recipient_name: String,
    /// National tax identifier of the recipient
    pub recipient_rut: String,
    /// Bank holding the destination account (code or symbol)
    pub recipient_bank: String,
    /// Amount in the smallest currency unit (whole pesos for CLP)
    pub amount: i64,
    pub currency: Currency,
    pub description: String,
    /// Caller-unique reference, forwarded unchanged to the bank
    pub reference_id: String,
}

impl TransferRequest {
    /// Checks the request-level invariants against a provider's limits.
    pub fn check(&self, limits: &AmountLimits) -> Result<Money, DomainError> {
        let money = Money::positive(self.amount, self.currency)?;
        limits.check(self.amount)?;
        if self.reference_id.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "reference_id cannot be empty".into(),
            ));
        }
        Ok(money)
    }

    /// The destination account as a fresh validation request.
    pub fn destination(&self) -> AccountValidation {
        AccountValidation::new(
            &self.recipient_account,
            &self.recipient_rut,
            &self.recipient_bank,
        )
    }
}

/// Inclusive transfer amount limits of a provider, in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountLimits {
    pub min: i64,
    pub max: i64,
}

impl Default for AmountLimits {
    fn default() -> Self {
        Self {
            min: 100,
            max: 100_000_000,
        }
    }
}

impl AmountLimits {
    pub fn check(&self, amount: i64) -> Result<(), DomainError> {
        if amount < self.min || amount > self.max {
            return Err(DomainError::AmountOutOfRange {
                amount,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Normalized status of a bank transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TransferStatus {
    /// True for statuses a successful transfer may carry.
    pub fn is_accepted(&self) -> bool {
        matches!(self, TransferStatus::Pending | TransferStatus::Completed)
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStatus::Pending => write!(f, "PENDING"),
            TransferStatus::Completed => write!(f, "COMPLETED"),
            TransferStatus::Failed => write!(f, "FAILED"),
            TransferStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// What a bank hands back when it accepts a transfer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transaction_id: String,
    pub tracking_code: Option<String>,
    pub status: TransferStatus,
}

/// Outcome of a transfer attempt.
///
/// Fields are private: the only ways in are [`TransferResponse::accepted`] and
/// [`TransferResponse::failed`], so a success always carries a non-blank
/// transaction id and a failure always carries a message.
#[derive(Debug, Clone, Serialize)]
pub struct TransferResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_id: Option<String>,
    /// Human-facing tracking code (authorization code, tracking number)
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_code: Option<String>,
    status: TransferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<FailureKind>,
    reference_id: String,
    processed_at: DateTime<Utc>,
}

/// Message of a response whose bank reply carried no usable transaction id.
pub const MISSING_TRANSACTION_ID: &str = "bank accepted the call but returned no transaction id";

impl TransferResponse {
    /// A transfer the bank took. Anything short of `Completed` is reported as `Pending`.
    ///
    /// A receipt with a blank id cannot be tracked, so it becomes a
    /// `TransferFailure` instead.
    pub fn accepted(receipt: TransferReceipt, reference_id: &str) -> Self {
        if receipt.transaction_id.trim().is_empty() {
            return Self::failed(
                FailureKind::TransferFailure,
                MISSING_TRANSACTION_ID,
                reference_id,
            );
        }
        let status = match receipt.status {
            TransferStatus::Completed => TransferStatus::Completed,
            _ => TransferStatus::Pending,
        };
        Self {
            success: true,
            transaction_id: Some(receipt.transaction_id),
            tracking_code: receipt.tracking_code,
            status,
            error_message: None,
            failure: None,
            reference_id: reference_id.to_string(),
            processed_at: Utc::now(),
        }
    }

    /// A transfer that did not go through.
    pub fn failed(kind: FailureKind, message: impl Into<String>, reference_id: &str) -> Self {
        Self {
            success: false,
            transaction_id: None,
            tracking_code: None,
            status: TransferStatus::Failed,
            error_message: Some(message.into()),
            failure: Some(kind),
            reference_id: reference_id.to_string(),
            processed_at: Utc::now(),
        }
    }

    /// A failed response built from a gateway error.
    pub fn from_error(err: &GatewayError, reference_id: &str) -> Self {
        Self::failed(err.kind(), err.to_string(), reference_id)
    }

    /// Attaches the bank's id to a failure, e.g. when the bank rejected a transfer it registered.
    ///
    /// Successes keep the id they were accepted with; blank ids are ignored.
    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        let transaction_id = transaction_id.into();
        if !self.success && !transaction_id.trim().is_empty() {
            self.transaction_id = Some(transaction_id);
        }
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn tracking_code(&self) -> Option<&str> {
        self.tracking_code.as_deref()
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Account Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Request and result of validating a destination account.
///
/// Created fresh per call and never persisted by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountValidation {
    pub account_number: String,
    pub rut: String,
    /// Bank holding the account (code or symbol)
    pub bank: String,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AccountValidation {
    /// A not-yet-validated account.
    pub fn new(account_number: &str, rut: &str, bank: &str) -> Self {
        Self {
            account_number: account_number.to_string(),
            rut: rut.to_string(),
            bank: bank.to_string(),
            is_valid: false,
            account_holder: None,
            error_message: None,
        }
    }

    pub fn valid(mut self, account_holder: Option<String>) -> Self {
        self.is_valid = true;
        self.account_holder = account_holder;
        self.error_message = None;
        self
    }

    pub fn invalid(mut self, message: impl Into<String>) -> Self {
        self.is_valid = false;
        self.account_holder = None;
        self.error_message = Some(message.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────────────────────────

/// Result of polling a transfer's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub transaction_id: String,
    pub status: TransferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// The bank's own status word, kept for audits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    /// Set when the bank answered with a status word that has no mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl StatusReport {
    /// A status poll that could not be answered. Reported as `Failed`.
    pub fn unavailable(transaction_id: &str, details: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            status: TransferStatus::Failed,
            details: Some(details.into()),
            raw_status: None,
            processed_at: None,
            failure: None,
        }
    }
}

/// Available balance of the operating account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    /// In the smallest currency unit
    pub available: i64,
    pub currency: Currency,
    /// Time of the query, not a bank-supplied timestamp
    pub last_updated: DateTime<Utc>,
}

/// Direction of an account movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementDirection {
    Credit,
    Debit,
}

impl MovementDirection {
    /// Direction from a signed bank amount.
    pub fn from_signed(amount: i64) -> Self {
        if amount < 0 {
            MovementDirection::Debit
        } else {
            MovementDirection::Credit
        }
    }
}

/// One entry of the operating account's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub transaction_id: String,
    pub date: NaiveDate,
    /// Absolute amount in the smallest currency unit
    pub amount: i64,
    pub direction: MovementDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}
