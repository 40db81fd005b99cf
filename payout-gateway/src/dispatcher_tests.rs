//! Dispatcher unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};

    use payout_types::domain::bank::{BANCO_DE_CHILE, BANCO_ESTADO};
    use payout_types::{
        AccountValidation, Balance, BankInfo, BankProvider, Currency, FailureKind, GatewayError,
        INVALID_DESTINATION, Movement, MovementDirection, StatusReport, TransferReceipt,
        TransferRequest, TransferStatus,
    };

    use crate::{Dispatcher, parse_bank_list};

    /// Provider that records the order of its calls and never touches a network.
    pub struct SpyProvider {
        bank: &'static BankInfo,
        account_valid: bool,
        auth_ok: bool,
        calls: Mutex<Vec<String>>,
    }

    impl SpyProvider {
        pub fn new(bank: &'static BankInfo, account_valid: bool) -> Arc<Self> {
            Arc::new(Self {
                bank,
                account_valid,
                auth_ok: true,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn rejecting_credentials(bank: &'static BankInfo) -> Arc<Self> {
            Arc::new(Self {
                bank,
                account_valid: true,
                auth_ok: false,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }
    }

    #[async_trait]
    impl BankProvider for SpyProvider {
        fn bank(&self) -> &'static BankInfo {
            self.bank
        }

        async fn authenticate(&self) -> Result<(), GatewayError> {
            self.record("authenticate");
            if self.auth_ok {
                Ok(())
            } else {
                Err(GatewayError::Authentication(
                    "bank responded with HTTP 401: invalid_client".into(),
                ))
            }
        }

        async fn validate_account(&self, validation: AccountValidation) -> AccountValidation {
            self.record("validate_account");
            if self.account_valid {
                validation.valid(Some("SPY HOLDER".into()))
            } else {
                validation.invalid("account not found")
            }
        }

        async fn submit_transfer(
            &self,
            req: &TransferRequest,
        ) -> Result<TransferReceipt, GatewayError> {
            self.record("submit_transfer");
            Ok(TransferReceipt {
                transaction_id: format!("{}-{}", self.bank.code(), req.reference_id),
                tracking_code: None,
                status: TransferStatus::Pending,
            })
        }

        async fn transaction_status(&self, transaction_id: &str) -> StatusReport {
            self.record("transaction_status");
            StatusReport {
                transaction_id: transaction_id.to_string(),
                status: TransferStatus::Completed,
                details: None,
                raw_status: Some("EXITOSA".into()),
                processed_at: None,
                failure: None,
            }
        }

        async fn balance(&self) -> Result<Balance, GatewayError> {
            self.record("balance");
            Ok(Balance {
                available: 1_000_000,
                currency: Currency::CLP,
                last_updated: Utc::now(),
            })
        }

        async fn transaction_history(
            &self,
            from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<Movement>, GatewayError> {
            self.record("transaction_history");
            Ok(vec![Movement {
                transaction_id: "M1".into(),
                date: from,
                amount: 45000,
                direction: MovementDirection::Debit,
                description: None,
                reference: None,
            }])
        }
    }

    fn request(bank: &str) -> TransferRequest {
        TransferRequest {
            recipient_account: "12-345-678".into(),
            recipient_name: "María González".into(),
            recipient_rut: "12.345.678-5".into(),
            recipient_bank: bank.into(),
            amount: 45000,
            currency: Currency::CLP,
            description: "Comisión".into(),
            reference_id: "payout-001".into(),
        }
    }

    fn dispatcher(estado: &Arc<SpyProvider>, chile: &Arc<SpyProvider>) -> Dispatcher {
        Dispatcher::builder()
            .register(estado.clone())
            .unwrap()
            .register(chile.clone())
            .unwrap()
            .build()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Routing
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_code_and_name_reach_same_provider() {
        let estado = SpyProvider::new(&BANCO_ESTADO, true);
        let chile = SpyProvider::new(&BANCO_DE_CHILE, true);
        let dispatcher = dispatcher(&estado, &chile);

        for id in ["012", "12", "BANCO_ESTADO", "banco_estado", "Banco Estado"] {
            let report = dispatcher.transaction_status(id, "TX-1").await.unwrap();
            assert_eq!(report.status, TransferStatus::Completed);
        }

        assert_eq!(estado.calls().len(), 5);
        assert!(chile.calls().is_empty());
        assert!(Arc::ptr_eq(
            dispatcher.provider("012").unwrap(),
            dispatcher.provider("BANCO_ESTADO").unwrap()
        ));
    }

    #[tokio::test]
    async fn test_unknown_bank_is_unsupported() {
        let estado = SpyProvider::new(&BANCO_ESTADO, true);
        let chile = SpyProvider::new(&BANCO_DE_CHILE, true);
        let dispatcher = dispatcher(&estado, &chile);

        let err = dispatcher.transfer("999", &request("999")).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedBank(ref id) if id == "999"));
        assert_eq!(err.kind(), FailureKind::UnsupportedBank);

        // In the catalog, but no provider registered
        assert!(matches!(
            dispatcher.balance("SANTANDER").await,
            Err(GatewayError::UnsupportedBank(_))
        ));
        assert!(estado.calls().is_empty());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let a = SpyProvider::new(&BANCO_ESTADO, true);
        let b = SpyProvider::new(&BANCO_ESTADO, true);
        let result = Dispatcher::builder().register(a).unwrap().register(b);
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_supported_banks_and_static_lookups() {
        let estado = SpyProvider::new(&BANCO_ESTADO, true);
        let chile = SpyProvider::new(&BANCO_DE_CHILE, true);
        let dispatcher = dispatcher(&estado, &chile);

        let codes: Vec<_> = dispatcher.supported_banks().iter().map(|b| b.code()).collect();
        assert_eq!(codes, vec!["001", "012"]);
        assert!(dispatcher.is_supported("banco de chile"));
        assert!(!dispatcher.is_supported("BCI"));

        assert_eq!(Dispatcher::bank_name("012"), Some("Banco del Estado de Chile"));
        assert_eq!(Dispatcher::bank_code("BANCO_DE_CHILE"), Some("001"));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Transfer flow
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_transfer_validates_before_submitting() {
        let estado = SpyProvider::new(&BANCO_ESTADO, true);
        let chile = SpyProvider::new(&BANCO_DE_CHILE, true);
        let dispatcher = dispatcher(&estado, &chile);

        let resp = dispatcher.transfer("012", &request("012")).await.unwrap();

        assert!(resp.success());
        assert_eq!(resp.transaction_id(), Some("012-payout-001"));
        assert_eq!(resp.status(), TransferStatus::Pending);
        assert_eq!(
            estado.calls(),
            vec!["authenticate", "validate_account", "submit_transfer"]
        );
    }

    #[tokio::test]
    async fn test_invalid_destination_never_submits() {
        let estado = SpyProvider::new(&BANCO_ESTADO, false);
        let chile = SpyProvider::new(&BANCO_DE_CHILE, true);
        let dispatcher = dispatcher(&estado, &chile);

        let resp = dispatcher.transfer("BANCO_ESTADO", &request("012")).await.unwrap();

        assert!(!resp.success());
        assert!(resp.transaction_id().is_none());
        assert_eq!(resp.failure(), Some(FailureKind::ValidationFailure));
        assert!(resp.error_message().unwrap().starts_with(INVALID_DESTINATION));
        assert_eq!(estado.calls(), vec!["authenticate", "validate_account"]);
    }

    #[tokio::test]
    async fn test_rejected_credentials_stop_before_validation() {
        let estado = SpyProvider::new(&BANCO_ESTADO, true);
        let chile = SpyProvider::rejecting_credentials(&BANCO_DE_CHILE);
        let dispatcher = dispatcher(&estado, &chile);

        let resp = dispatcher.transfer("001", &request("001")).await.unwrap();

        assert!(!resp.success());
        assert_eq!(resp.failure(), Some(FailureKind::AuthenticationFailure));
        assert_eq!(chile.calls(), vec!["authenticate"]);
    }

    #[tokio::test]
    async fn test_out_of_range_amount_makes_no_provider_call() {
        let estado = SpyProvider::new(&BANCO_ESTADO, true);
        let chile = SpyProvider::new(&BANCO_DE_CHILE, true);
        let dispatcher = dispatcher(&estado, &chile);

        for amount in [0, -5, 99, 100_000_001] {
            let mut req = request("001");
            req.amount = amount;
            let resp = dispatcher.transfer("001", &req).await.unwrap();
            assert!(!resp.success(), "amount {}", amount);
            assert_eq!(resp.failure(), Some(FailureKind::ValidationFailure));
        }
        assert!(chile.calls().is_empty());
    }

    #[tokio::test]
    async fn test_queries_delegate() {
        let estado = SpyProvider::new(&BANCO_ESTADO, true);
        let chile = SpyProvider::new(&BANCO_DE_CHILE, true);
        let dispatcher = dispatcher(&estado, &chile);

        let validation = dispatcher
            .validate_account("001", AccountValidation::new("123", "12345678-5", "001"))
            .await
            .unwrap();
        assert!(validation.is_valid);

        let balance = dispatcher.balance("001").await.unwrap();
        assert_eq!(balance.available, 1_000_000);

        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let history = dispatcher.transaction_history("001", day, day).await.unwrap();
        assert_eq!(history.len(), 1);

        assert_eq!(
            chile.calls(),
            vec!["validate_account", "balance", "transaction_history"]
        );
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_bank_list() {
        let banks = parse_bank_list(" 012, BANCO_DE_CHILE ,banco_estado").unwrap();
        let symbols: Vec<_> = banks.iter().map(|b| b.symbol).collect();
        assert_eq!(symbols, vec!["BANCO_ESTADO", "BANCO_DE_CHILE"]);

        assert!(matches!(
            parse_bank_list("012,NOT_A_BANK"),
            Err(GatewayError::UnsupportedBank(_))
        ));
        assert!(matches!(parse_bank_list(" , "), Err(GatewayError::Config(_))));
    }
}
