//! Bank provider port.
//!
//! One implementation per bank. Adapters supply the bank-specific hooks; the
//! provided [`BankProvider::transfer`] drives them in the order every bank
//! must respect: request checks, authentication, destination validation, then
//! the transfer call.

use chrono::NaiveDate;

use crate::domain::BankInfo;
use crate::dto::{
    AccountValidation, AmountLimits, Balance, INVALID_DESTINATION, Movement, StatusReport,
    TransferReceipt, TransferRequest, TransferResponse,
};
use crate::error::{FailureKind, GatewayError};

/// The contract every bank adapter implements.
///
/// Operations returning a response value never fail: transport and bank
/// errors are folded into that value. Only `balance` and
/// `transaction_history`, which have no failure slot, return `Result`.
#[async_trait::async_trait]
pub trait BankProvider: Send + Sync + 'static {
    /// The catalog entry this provider serves.
    fn bank(&self) -> &'static BankInfo;

    /// Transfer amount limits.
    fn limits(&self) -> AmountLimits {
        AmountLimits::default()
    }

    /// Makes sure the provider holds a usable access token.
    ///
    /// Providers without authentication keep the default.
    async fn authenticate(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    /// Validates a destination account with the bank.
    ///
    /// Failures of the validation call come back as `is_valid = false`.
    async fn validate_account(&self, validation: AccountValidation) -> AccountValidation;

    /// Sends the transfer call itself. Only called for validated destinations.
    async fn submit_transfer(&self, req: &TransferRequest)
    -> Result<TransferReceipt, GatewayError>;

    /// Polls a transfer. Unmapped or unreachable statuses come back as `Failed`.
    async fn transaction_status(&self, transaction_id: &str) -> StatusReport;

    /// Available balance of the operating account.
    async fn balance(&self) -> Result<Balance, GatewayError>;

    /// Movements of the operating account between two dates, inclusive.
    async fn transaction_history(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Movement>, GatewayError>;

    /// Pays out a transfer request.
    async fn transfer(&self, req: &TransferRequest) -> TransferResponse {
        if let Err(e) = req.check(&self.limits()) {
            return TransferResponse::failed(
                FailureKind::ValidationFailure,
                e.to_string(),
                &req.reference_id,
            );
        }

        if let Err(err) = self.authenticate().await {
            return TransferResponse::from_error(&err, &req.reference_id);
        }

        let destination = self.validate_account(req.destination()).await;
        if !destination.is_valid {
            let message = match destination.error_message {
                Some(reason) => format!("{}: {}", INVALID_DESTINATION, reason),
                None => INVALID_DESTINATION.to_string(),
            };
            return TransferResponse::failed(
                FailureKind::ValidationFailure,
                message,
                &req.reference_id,
            );
        }

        match self.submit_transfer(req).await {
            Ok(receipt) if receipt.status.is_accepted() => {
                TransferResponse::accepted(receipt, &req.reference_id)
            }
            Ok(receipt) => TransferResponse::failed(
                FailureKind::TransferFailure,
                format!("bank rejected the transfer with status {}", receipt.status),
                &req.reference_id,
            )
            .with_transaction_id(receipt.transaction_id),
            Err(err) => TransferResponse::from_error(&err, &req.reference_id),
        }
    }
}
