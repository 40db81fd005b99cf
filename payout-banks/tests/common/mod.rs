//! Shared fixtures for the mock-bank tests.

#![allow(dead_code)]

use std::time::Duration;

use payout_banks::BankProviderConfig;
use payout_types::{Currency, TransferRequest};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const ORIGIN_ACCOUNT: &str = "00-1234-5678";
pub const VALID_RUT: &str = "12.345.678-5";

pub fn config(server: &MockServer) -> BankProviderConfig {
    BankProviderConfig::new(CLIENT_ID, CLIENT_SECRET, server.uri(), ORIGIN_ACCOUNT)
        .with_timeout(Duration::from_secs(5))
}

/// 45 000 CLP to a valid RUT at the given bank.
pub fn transfer_request(bank: &str, reference_id: &str) -> TransferRequest {
    TransferRequest {
        recipient_account: "98-765-432".into(),
        recipient_name: "María González".into(),
        recipient_rut: VALID_RUT.into(),
        recipient_bank: bank.into(),
        amount: 45_000,
        currency: Currency::CLP,
        description: "Pago comisión marzo".into(),
        reference_id: reference_id.into(),
    }
}

/// Mounts a token endpoint that must be hit exactly `times` times.
pub async fn mount_token(server: &MockServer, token_path: &str, expires_in: u64, times: u64) {
    Mock::given(method("POST"))
        .and(path(token_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "mock-access-token",
            "token_type": "bearer",
            "expires_in": expires_in,
        })))
        .expect(times)
        .mount(server)
        .await;
}
