//! Bank-native status vocabularies.

use chrono::{DateTime, Utc};
use payout_types::{GatewayError, StatusReport, TransferStatus};
use tracing::warn;

/// Explicit mapping from a bank's status words to [`TransferStatus`].
#[derive(Debug)]
pub struct StatusTable {
    bank: &'static str,
    entries: &'static [(&'static str, TransferStatus)],
}

impl StatusTable {
    pub const fn new(bank: &'static str, entries: &'static [(&'static str, TransferStatus)]) -> Self {
        Self { bank, entries }
    }

    /// Exact lookup, ignoring case and surrounding whitespace.
    pub fn lookup(&self, raw: &str) -> Result<TransferStatus, GatewayError> {
        let raw = raw.trim();
        self.entries
            .iter()
            .find(|(word, _)| word.eq_ignore_ascii_case(raw))
            .map(|(_, status)| *status)
            .ok_or_else(|| GatewayError::UnknownStatus(raw.to_string()))
    }

    /// Status for a polled transfer. Unmapped words fail closed to `Failed`.
    pub fn resolve(&self, raw: &str) -> TransferStatus {
        self.lookup(raw).unwrap_or_else(|e| {
            warn!(
                bank = self.bank,
                raw_status = raw,
                failure = %e.kind(),
                "unmapped bank status, treating as FAILED"
            );
            TransferStatus::Failed
        })
    }

    /// Builds the report of a status poll the bank answered.
    ///
    /// An unmapped word yields a `Failed` report tagged `UnknownStatus`, with
    /// the error in place of the bank's details.
    pub fn report(
        &self,
        transaction_id: &str,
        raw: String,
        details: Option<String>,
        processed_at: Option<DateTime<Utc>>,
    ) -> StatusReport {
        let (status, failure, details) = match self.lookup(&raw) {
            Ok(status) => (status, None, details),
            Err(e) => (
                self.resolve(&raw),
                Some(e.kind()),
                Some(e.to_string()),
            ),
        };
        StatusReport {
            transaction_id: transaction_id.to_string(),
            status,
            details,
            raw_status: Some(raw),
            processed_at,
            failure,
        }
    }

    /// Status of a transfer the bank just registered under an id.
    ///
    /// Missing or unmapped words become `Pending`: the money may already be
    /// moving, so the caller must poll instead of retrying.
    pub fn accepted(&self, raw: Option<&str>) -> TransferStatus {
        match raw {
            None => TransferStatus::Pending,
            Some(raw) => self.lookup(raw).unwrap_or_else(|e| {
                warn!(
                    bank = self.bank,
                    raw_status = raw,
                    failure = %e.kind(),
                    "unmapped status on accepted transfer, reporting PENDING"
                );
                TransferStatus::Pending
            }),
        }
    }
}
