//! Banco Estado adapter.
//!
//! OAuth client credentials posted as a form, then bearer-authenticated JSON
//! calls. Field names follow the bank's Spanish API.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use payout_types::domain::bank::BANCO_ESTADO;
use payout_types::{
    AccountValidation, AmountLimits, Balance, BankInfo, BankProvider, Currency, GatewayError,
    MISSING_TRANSACTION_ID, Movement, MovementDirection, StatusReport, TransferReceipt,
    TransferRequest, TransferStatus, mask_account, normalize_account_number,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::config::BankProviderConfig;
use crate::destination::Destination;
use crate::http::{BankHttp, BankId};
use crate::status::StatusTable;
use crate::token::{AuthToken, TokenCache, TokenResponse};

static STATUSES: StatusTable = StatusTable::new(
    "BANCO_ESTADO",
    &[
        ("COMPLETADA", TransferStatus::Completed),
        ("EXITOSA", TransferStatus::Completed),
        ("PENDIENTE", TransferStatus::Pending),
        ("EN_PROCESO", TransferStatus::Pending),
        ("RECHAZADA", TransferStatus::Failed),
        ("ERROR", TransferStatus::Failed),
        ("CANCELADA", TransferStatus::Cancelled),
    ],
);

const TOKEN_SCOPE: &str = "transferencias cuentas";

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerificationRequest<'a> {
    numero_cuenta: &'a str,
    rut: String,
    tipo_verificacion: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerificationResponse {
    valida: bool,
    nombre_titular: Option<String>,
    mensaje_error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferBody<'a> {
    cuenta_origen: String,
    cuenta_destino: &'a str,
    banco_destino: &'a str,
    monto: i64,
    moneda: String,
    descripcion: &'a str,
    tipo_transferencia: &'a str,
    rut_destinatario: String,
    nombre_destinatario: &'a str,
    referencia: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferResult {
    id_transferencia: Option<BankId>,
    codigo_autorizacion: Option<String>,
    estado: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResult {
    estado: String,
    descripcion: Option<String>,
    fecha_procesamiento: Option<String>,
    mensaje_error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResult {
    saldo_disponible: i64,
    moneda: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MovementsResult {
    #[serde(default)]
    movimientos: Vec<MovementEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovementEntry {
    id_movimiento: BankId,
    fecha: NaiveDate,
    /// Signed: negative for debits
    monto: i64,
    descripcion: Option<String>,
    referencia: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Banco Estado provider. Owns its token cache.
pub struct BancoEstado {
    config: BankProviderConfig,
    http: BankHttp,
    tokens: TokenCache,
}

impl BancoEstado {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.bancoestado.cl";

    pub fn new(config: BankProviderConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let http = BankHttp::new(&config.base_url, config.timeout)?;
        Ok(Self {
            config,
            http,
            tokens: TokenCache::new(),
        })
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.tokens
    }

    async fn access_token(&self) -> Result<String, GatewayError> {
        self.tokens.get_or_refresh(|| self.fetch_token()).await
    }

    async fn fetch_token(&self) -> Result<AuthToken, GatewayError> {
        debug!(bank = BANCO_ESTADO.symbol, "requesting access token");
        let req = self.http.request(Method::POST, "/oauth/token").form(&[
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", TOKEN_SCOPE),
        ]);
        let resp: TokenResponse = self.http.send(req).await.map_err(|e| {
            error!(bank = BANCO_ESTADO.symbol, error = %e.sanitized(), "token exchange failed");
            GatewayError::Authentication(e.sanitized())
        })?;
        resp.into_token().inspect_err(|e| {
            error!(bank = BANCO_ESTADO.symbol, error = %e, "token exchange failed");
        })
    }

    fn origin_account(&self) -> String {
        normalize_account_number(&self.config.origin_account)
    }
}

#[async_trait]
impl BankProvider for BancoEstado {
    fn bank(&self) -> &'static BankInfo {
        &BANCO_ESTADO
    }

    fn limits(&self) -> AmountLimits {
        self.config.limits
    }

    async fn authenticate(&self) -> Result<(), GatewayError> {
        self.access_token().await.map(|_| ())
    }

    #[instrument(skip(self, validation), fields(bank = "BANCO_ESTADO", account = %mask_account(&validation.account_number)))]
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

        let body = VerificationRequest {
            numero_cuenta: &destination.account_number,
            rut: destination.rut.with_dash(),
            tipo_verificacion: "basica",
        };
        let req = self
            .http
            .request(Method::POST, "/api/cuentas/verificar")
            .bearer_auth(token)
            .json(&body);

        match self.http.send::<VerificationResponse>(req).await {
            Ok(resp) if resp.valida => validation.valid(resp.nombre_titular),
            Ok(resp) => validation.invalid(
                resp.mensaje_error
                    .unwrap_or_else(|| "account not found".to_string()),
            ),
            Err(e) => {
                warn!(error = %e.sanitized(), "account verification failed");
                validation.invalid(e.sanitized())
            }
        }
    }

    #[instrument(skip(self, req), fields(bank = "BANCO_ESTADO", reference_id = %req.reference_id))]
    async fn submit_transfer(
        &self,
        req: &TransferRequest,
    ) -> Result<TransferReceipt, GatewayError> {
        let destination =
            Destination::parse(&req.recipient_account, &req.recipient_rut, &req.recipient_bank)
                .map_err(GatewayError::Validation)?;
        let token = self.access_token().await?;

        let body = TransferBody {
            cuenta_origen: self.origin_account(),
            cuenta_destino: &destination.account_number,
            banco_destino: destination.bank.code(),
            monto: req.amount,
            moneda: req.currency.to_string(),
            descripcion: &req.description,
            tipo_transferencia: "inmediata",
            rut_destinatario: destination.rut.with_dash(),
            nombre_destinatario: &req.recipient_name,
            referencia: &req.reference_id,
        };
        let call = self
            .http
            .request(Method::POST, "/api/transferencias/realizar")
            .bearer_auth(token)
            .json(&body);

        let resp: TransferResult = self.http.send(call).await.map_err(|e| {
            error!(error = %e.sanitized(), "transfer call failed");
            GatewayError::Transfer(e.sanitized())
        })?;

        let transaction_id = resp
            .id_transferencia
            .map(BankId::into_string)
            .unwrap_or_default();
        if transaction_id.is_empty() {
            error!(
                raw_status = resp.estado.as_deref().unwrap_or("-"),
                "transfer reply carried no transaction id"
            );
            return Err(GatewayError::Transfer(MISSING_TRANSACTION_ID.into()));
        }

        info!(
            transaction_id = %transaction_id,
            raw_status = resp.estado.as_deref().unwrap_or("-"),
            "transfer registered"
        );
        Ok(TransferReceipt {
            status: STATUSES.accepted(resp.estado.as_deref()),
            transaction_id,
            tracking_code: resp.codigo_autorizacion,
        })
    }

    #[instrument(skip(self), fields(bank = "BANCO_ESTADO"))]
    async fn transaction_status(&self, transaction_id: &str) -> StatusReport {
        let req = match self.http.request_segments(
            Method::GET,
            &["api", "transferencias", transaction_id, "estado"],
        ) {
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
                resp.estado,
                resp.mensaje_error.or(resp.descripcion),
                resp.fecha_procesamiento.as_deref().and_then(parse_timestamp),
            ),
            Err(e) => {
                warn!(error = %e.sanitized(), "status query failed");
                StatusReport::unavailable(transaction_id, e.sanitized())
            }
        }
    }

    #[instrument(skip(self), fields(bank = "BANCO_ESTADO"))]
    async fn balance(&self) -> Result<Balance, GatewayError> {
        let token = self.access_token().await?;
        let req = self
            .http
            .request(Method::GET, "/api/cuentas/saldo")
            .query(&[("numeroCuenta", self.origin_account())])
            .bearer_auth(token);
        let resp: BalanceResult = self
            .http
            .send(req)
            .await
            .map_err(|e| GatewayError::Upstream(e.sanitized()))?;

        let currency = match resp.moneda.as_deref() {
            Some(code) => code.parse::<Currency>()?,
            None => Currency::CLP,
        };
        Ok(Balance {
            available: resp.saldo_disponible,
            currency,
            last_updated: Utc::now(),
        })
    }

    #[instrument(skip(self), fields(bank = "BANCO_ESTADO"))]
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
        let req = self
            .http
            .request(Method::GET, "/api/cuentas/movimientos")
            .query(&[
                ("numeroCuenta", self.origin_account()),
                ("fechaDesde", from.to_string()),
                ("fechaHasta", to.to_string()),
            ])
            .bearer_auth(token);
        let resp: MovementsResult = self
            .http
            .send(req)
            .await
            .map_err(|e| GatewayError::Upstream(e.sanitized()))?;

        Ok(resp
            .movimientos
            .into_iter()
            .map(|m| Movement {
                transaction_id: m.id_movimiento.into_string(),
                date: m.fecha,
                amount: m.monto.abs(),
                direction: MovementDirection::from_signed(m.monto),
                description: m.descripcion,
                reference: m.referencia,
            })
            .collect())
    }
}

/// Bank timestamps are RFC 3339; anything else is dropped rather than failing the poll.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
