//! Error types for the payout gateway.

use serde::{Deserialize, Serialize};

/// Domain-level errors (request rule violations).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    #[error("Amount {amount} outside allowed range {min}..={max}")]
    AmountOutOfRange { amount: i64, min: i64, max: i64 },

    #[error("Invalid RUT: {0}")]
    InvalidRut(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Closed failure taxonomy attached to failed responses.
///
/// Callers branch on this, never on bank-specific strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Token exchange failed (bad credentials, bank auth outage).
    AuthenticationFailure,
    /// Destination account invalid or not found, or the request itself was rejected.
    ValidationFailure,
    /// The bank rejected or errored the transfer call itself.
    TransferFailure,
    /// No provider registered for the bank identifier.
    UnsupportedBank,
    /// The bank returned a status with no mapping.
    UnknownStatus,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::AuthenticationFailure => write!(f, "AUTHENTICATION_FAILURE"),
            FailureKind::ValidationFailure => write!(f, "VALIDATION_FAILURE"),
            FailureKind::TransferFailure => write!(f, "TRANSFER_FAILURE"),
            FailureKind::UnsupportedBank => write!(f, "UNSUPPORTED_BANK"),
            FailureKind::UnknownStatus => write!(f, "UNKNOWN_STATUS"),
        }
    }
}

/// Gateway-level errors.
///
/// Providers convert most of these into typed responses. Only `Config` and
/// `UnsupportedBank` escape the dispatcher as hard failures; `Upstream` is
/// returned by read-only queries whose value type has no failure slot.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Unsupported bank: {0}")]
    UnsupportedBank(String),

    #[error("Unknown bank status: {0}")]
    UnknownStatus(String),

    #[error("Bank query failed: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl GatewayError {
    /// Maps the error onto the closed taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Authentication(_) => FailureKind::AuthenticationFailure,
            GatewayError::Validation(_) | GatewayError::Domain(_) => {
                FailureKind::ValidationFailure
            }
            GatewayError::UnsupportedBank(_) => FailureKind::UnsupportedBank,
            GatewayError::UnknownStatus(_) => FailureKind::UnknownStatus,
            GatewayError::Transfer(_) | GatewayError::Upstream(_) | GatewayError::Config(_) => {
                FailureKind::TransferFailure
            }
        }
    }
}
