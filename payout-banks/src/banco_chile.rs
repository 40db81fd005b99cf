//! Banco de Chile adapter.
//!
//! Tokens come from a Basic-authenticated client-credentials exchange.
//! Mutating calls (account validation, transfers) are additionally signed
//! with the client secret; the body on the wire is the exact signed bytes.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use payout_types::domain::bank::BANCO_DE_CHILE;
use payout_types::{
    AccountValidation, AmountLimits, Balance, BankInfo, BankProvider, Currency, GatewayError,
    MISSING_TRANSACTION_ID, Movement, MovementDirection, StatusReport, TransferReceipt,
    TransferRequest, TransferStatus, mask_account, normalize_account_number,
};
use reqwest::{Method, RequestBuilder, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::banco_estado::parse_timestamp;
use crate::config::BankProviderConfig;
use crate::destination::Destination;
use crate::http::{BankHttp, BankId};
use crate::signer::{RequestSigner, timestamp_now};
use crate::status::StatusTable;
use crate::token::{AuthToken, TokenCache, TokenResponse};

static STATUSES: StatusTable = StatusTable::new(
    "BANCO_DE_CHILE",
    &[
        ("EXITOSA", TransferStatus::Completed),
        ("PROCESADA", TransferStatus::Completed),
        ("PENDIENTE", TransferStatus::Pending),
        ("EN_CURSO", TransferStatus::Pending),
        ("RECHAZADA", TransferStatus::Failed),
        ("FALLIDA", TransferStatus::Failed),
        ("ANULADA", TransferStatus::Cancelled),
    ],
);

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateBody<'a> {
    account_number: &'a str,
    document_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateResult {
    valid: bool,
    holder_name: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferBody<'a> {
    origin_account: String,
    destination: DestinationBody<'a>,
    amount: AmountBody,
    description: &'a str,
    external_reference: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DestinationBody<'a> {
    account_number: &'a str,
    document_id: String,
    name: &'a str,
    bank_code: &'a str,
}

#[derive(Debug, Serialize)]
struct AmountBody {
    value: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferResult {
    transfer_id: Option<BankId>,
    tracking_number: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResult {
    status: String,
    status_description: Option<String>,
    processed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResult {
    available_balance: i64,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MovementsResult {
    #[serde(default)]
    movements: Vec<MovementEntry>,
}

#[derive(Debug, Deserialize)]
struct MovementEntry {
    id: BankId,
    date: NaiveDate,
    /// Signed: negative for debits
    amount: i64,
    description: Option<String>,
    reference: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Banco de Chile provider. Owns its token cache and request signer.
pub struct BancoChile {
    config: BankProviderConfig,
    http: BankHttp,
    tokens: TokenCache,
    signer: RequestSigner,
}

impl BancoChile {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.bancochile.cl";

    pub fn new(config: BankProviderConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let http = BankHttp::new(&config.base_url, config.timeout)?;
        let signer = RequestSigner::new(&config.client_id, &config.client_secret);
        Ok(Self {
            config,
            http,
            tokens: TokenCache::new(),
            signer,
        })
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.tokens
    }

    async fn access_token(&self) -> Result<String, GatewayError> {
        self.tokens.get_or_refresh(|| self.fetch_token()).await
    }

    async fn fetch_token(&self) -> Result<AuthToken, GatewayError> {
        debug!(bank = BANCO_DE_CHILE.symbol, "requesting access token");
        let req = self
            .http
            .request(Method::POST, "/v1/oauth2/token")
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", "payouts")]);
        let resp: TokenResponse = self.http.send(req).await.map_err(|e| {
            error!(bank = BANCO_DE_CHILE.symbol, error = %e.sanitized(), "token exchange failed");
            GatewayError::Authentication(e.sanitized())
        })?;
        resp.into_token().inspect_err(|e| {
            error!(bank = BANCO_DE_CHILE.symbol, error = %e, "token exchange failed");
        })
    }

    /// Builds a signed, bearer-authenticated JSON POST.
    fn signed_post<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<RequestBuilder, GatewayError> {
        let payload = serde_json::to_vec(body)
            .map_err(|e| GatewayError::Validation(format!("unencodable request: {}", e)))?;
        let headers = self.signer.sign(&payload, &timestamp_now());
        let req = self
            .http
            .request(Method::POST, path)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json");
        Ok(headers.apply(req).body(payload))
    }

    fn origin_account(&self) -> String {
        normalize_account_number(&self.config.origin_account)
    }
}

#[async_trait]
impl BankProvider for BancoChile {
    fn bank(&self) -> &'static BankInfo {
        &BANCO_DE_CHILE
    }

    fn limits(&self) -> AmountLimits {
        self.config.limits
    }

    async fn authenticate(&self) -> Result<(), GatewayError> {
        self.access_token().await.map(|_| ())
    }

    #[instrument(skip(self, validation), fields(bank = "BANCO_DE_CHILE", account = %mask_account(&validation.account_number)))]
    async fn validate_account(&self, validation: AccountValidation) -> AccountValidation {
        let destination =
            match Destination::parse(&validation.account_number, &validation.rut, &validation.bank) {
                Ok(d) => d,
                Err(reason) => {
                    info!(reason = %reason, "destination rejected locally");
                    return validation.invalid(reason);
                }
            };

        let token = match self.access_token().await {
            Ok(token) => token,
            Err(e) => return validation.invalid(e.to_string()),
        };

        let body = ValidateBody {
            account_number: &destination.account_number,
            document_id: destination.rut.compact(),
        };
        let req = match self.signed_post("/v1/accounts/validate", &token, &body) {
            Ok(req) => req,
            Err(e) => return validation.invalid(e.to_string()),
        };

        match self.http.send::<ValidateResult>(req).await {
            Ok(resp) if resp.valid => validation.valid(resp.holder_name),
            Ok(resp) => {
                validation.invalid(resp.reason.unwrap_or_else(|| "account not found".to_string()))
            }
            Err(e) => {
                warn!(error = %e.sanitized(), "account validation failed");
                validation.invalid(e.sanitized())
            }
        }
    }

    #[instrument(skip(self, req), fields(bank = "BANCO_DE_CHILE", reference_id = %req.reference_id))]
    async fn submit_transfer(
        &self,
        req: &TransferRequest,
    ) -> Result<TransferReceipt, GatewayError> {
        let destination =
            Destination::parse(&req.recipient_account, &req.recipient_rut, &req.recipient_bank)
                .map_err(GatewayError::Validation)?;
        let token = self.access_token().await?;

        let body = TransferBody {
            origin_account: self.origin_account(),
            destination: DestinationBody {
                account_number: &destination.account_number,
                document_id: destination.rut.compact(),
                name: &req.recipient_name,
                bank_code: destination.bank.code(),
            },
            amount: AmountBody {
                value: req.amount,
                currency: req.currency.to_string(),
            },
            description: &req.description,
            external_reference: &req.reference_id,
        };
        let call = self.signed_post("/v1/transfers", &token, &body)?;

        let resp: TransferResult = self.http.send(call).await.map_err(|e| {
            error!(error = %e.sanitized(), "transfer call failed");
            GatewayError::Transfer(e.sanitized())
        })?;

        let Some(transaction_id) = resp
            .transfer_id
            .map(BankId::into_string)
            .filter(|id| !id.is_empty())
        else {
            error!(
                raw_status = resp.status.as_deref().unwrap_or("-"),
                "transfer reply carried no transaction id"
            );
            return Err(GatewayError::Transfer(MISSING_TRANSACTION_ID.into()));
        };

        info!(
            transaction_id = %transaction_id,
            raw_status = resp.status.as_deref().unwrap_or("-"),
            "transfer registered"
        );
        Ok(TransferReceipt {
            status: STATUSES.accepted(resp.status.as_deref()),
            transaction_id,
            tracking_code: resp.tracking_number,
        })
    }

    #[instrument(skip(self), fields(bank = "BANCO_DE_CHILE"))]
    async fn transaction_status(&self, transaction_id: &str) -> StatusReport {
        let req = match self
            .http
            .request_segments(Method::GET, &["v1", "transfers", transaction_id])
        {
            Ok(req) => req,
            Err(e) => return StatusReport::unavailable(transaction_id, e.to_string()),
        };
        let token = match self.access_token().await {
            Ok(token) => token,
            Err(e) => return StatusReport::unavailable(transaction_id, e.to_string()),
        };

        match self.http.send::<StatusResult>(req.bearer_auth(token)).await {
            Ok(resp) => STATUSES.report(
                transaction_id,
                resp.status,
                resp.status_description,
                resp.processed_at.as_deref().and_then(parse_timestamp),
            ),
            Err(e) => {
                warn!(error = %e.sanitized(), "status query failed");
                StatusReport::unavailable(transaction_id, e.sanitized())
            }
        }
    }

    #[instrument(skip(self), fields(bank = "BANCO_DE_CHILE"))]
    async fn balance(&self) -> Result<Balance, GatewayError> {
        let token = self.access_token().await?;
        let origin = self.origin_account();
        let req = self
            .http
            .request_segments(Method::GET, &["v1", "accounts", origin.as_str(), "balance"])?
            .bearer_auth(token);
        let resp: BalanceResult = self
            .http
            .send(req)
            .await
            .map_err(|e| GatewayError::Upstream(e.sanitized()))?;

        let currency = match resp.currency.as_deref() {
            Some(code) => code.parse::<Currency>()?,
            None => Currency::CLP,
        };
        Ok(Balance {
            available: resp.available_balance,
            currency,
            last_updated: Utc::now(),
        })
    }

    #[instrument(skip(self), fields(bank = "BANCO_DE_CHILE"))]
    async fn transaction_history(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Movement>, GatewayError> {
        if from > to {
            return Err(GatewayError::Validation(format!(
                "history range starts after it ends: {} > {}",
                from, to
            )));
        }
        let token = self.access_token().await?;
        let origin = self.origin_account();
        let req = self
            .http
            .request_segments(Method::GET, &["v1", "accounts", origin.as_str(), "movements"])?
            .query(&[("from", from.to_string()), ("to", to.to_string())])
            .bearer_auth(token);
        let resp: MovementsResult = self
            .http
            .send(req)
            .await
            .map_err(|e| GatewayError::Upstream(e.sanitized()))?;

        Ok(resp
            .movements
            .into_iter()
            .map(|m| Movement {
                transaction_id: m.id.into_string(),
                date: m.date,
                amount: m.amount.abs(),
                direction: MovementDirection::from_signed(m.amount),
                description: m.description,
                reference: m.reference,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        assert_eq!(STATUSES.resolve("PROCESADA"), TransferStatus::Completed);
        assert_eq!(STATUSES.resolve("EN_CURSO"), TransferStatus::Pending);
        assert_eq!(STATUSES.resolve("FALLIDA"), TransferStatus::Failed);
        assert_eq!(STATUSES.resolve("ANULADA"), TransferStatus::Cancelled);
        assert_eq!(STATUSES.resolve("CANCELADA"), TransferStatus::Failed);
    }

    #[test]
    fn test_transfer_body_shape() {
        let body = TransferBody {
            origin_account: "0012345678".into(),
            destination: DestinationBody {
                account_number: "987654",
                document_id: "123456785".into(),
                name: "Ana Pérez",
                bank_code: "001",
            },
            amount: AmountBody {
                value: 45000,
                currency: "CLP".into(),
            },
            description: "pago",
            external_reference: "ref-1",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["destination"]["documentId"], "123456785");
        assert_eq!(json["destination"]["bankCode"], "001");
        assert_eq!(json["amount"]["value"], 45000);
        assert_eq!(json["externalReference"], "ref-1");
    }
}
