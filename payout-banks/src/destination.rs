//! Local checks on a destination account, run before any bank call.

use payout_types::domain::bank;
use payout_types::{BankInfo, Rut, normalize_account_number};

/// A destination whose fields passed the local checks.
#[derive(Debug, Clone)]
pub struct Destination {
    /// Digits only
    pub account_number: String,
    pub rut: Rut,
    pub bank: &'static BankInfo,
}

impl Destination {
    /// Parses the raw fields, returning a caller-facing reason on failure.
    pub fn parse(account_number: &str, rut: &str, bank_id: &str) -> Result<Self, String> {
        let account = normalize_account_number(account_number);
        if account.is_empty() {
            return Err("account number has no digits".to_string());
        }
        let rut = Rut::parse(rut).map_err(|e| e.to_string())?;
        let bank = bank::resolve(bank_id)
            .ok_or_else(|| format!("unknown destination bank {:?}", bank_id))?;
        if !bank.accepts_account_length(account.len()) {
            let (min, max) = bank.account_digits;
            let expected = if min == max {
                format!("{}", min)
            } else {
                format!("{} to {}", min, max)
            };
            return Err(format!(
                "account number at {} must have {} digits, got {}",
                bank.name,
                expected,
                account.len()
            ));
        }
        Ok(Self {
            account_number: account,
            rut,
            bank,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_fields() {
        let d = Destination::parse("00-123-456", "12.345.678-5", "12").unwrap();
        assert_eq!(d.account_number, "00123456");
        assert_eq!(d.rut.with_dash(), "12345678-5");
        assert_eq!(d.bank.symbol, "BANCO_ESTADO");
    }

    #[test]
    fn test_rejects_locally() {
        assert!(Destination::parse("---", "12345678-5", "012").is_err());
        assert!(Destination::parse("1234", "12345678-9", "012").unwrap_err().contains("RUT"));
        assert!(Destination::parse("1234", "12345678-5", "999").is_err());
    }

    #[test]
    fn test_account_length_follows_destination_bank() {
        let short = Destination::parse("1234567", "12345678-5", "012").unwrap_err();
        assert!(short.contains("must have 8 digits, got 7"), "{}", short);
        assert!(Destination::parse("123456789", "12345678-5", "BANCO_ESTADO").is_err());

        assert!(Destination::parse("123-456-789", "12345678-5", "014").is_ok());
        assert!(Destination::parse("12345678", "12345678-5", "BCI").is_err());

        let long = Destination::parse("12345678901", "12345678-5", "SANTANDER").unwrap_err();
        assert!(long.contains("9 to 10 digits"), "{}", long);
        assert!(Destination::parse("1234567890", "12345678-5", "028").is_ok());

        assert!(Destination::parse("12345678", "12345678-5", "BANCO_FALABELLA").is_ok());
    }
}
