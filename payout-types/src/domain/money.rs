//! Type-safe monetary value with embedded currency.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Currencies the gateway can disburse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    CLP,
    USD,
    EUR,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::str::FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CLP" => Ok(Currency::CLP),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            other => Err(DomainError::ValidationError(format!(
                "Unknown currency: {}",
                other
            ))),
        }
    }
}

/// Type-safe money representation with embedded currency.
///
/// Amount is stored in the smallest unit of the currency (whole pesos for CLP,
/// cents for USD) to avoid floating-point precision issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Creates a new positive Money value. Payouts never move zero or negative amounts.
    pub fn positive(amount: i64, currency: Currency) -> Result<Self, DomainError> {
        if amount <= 0 {
            return Err(DomainError::NonPositiveAmount(amount));
        }
        Ok(Self { amount, currency })
    }

    /// Returns the amount in smallest currency unit.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let money = Money::positive(45000, Currency::CLP).unwrap();
        assert_eq!(money.amount(), 45000);
        assert_eq!(money.currency(), Currency::CLP);
    }

    #[test]
    fn test_non_positive_money_fails() {
        assert!(matches!(
            Money::positive(0, Currency::CLP),
            Err(DomainError::NonPositiveAmount(0))
        ));
        assert!(matches!(
            Money::positive(-100, Currency::USD),
            Err(DomainError::NonPositiveAmount(-100))
        ));
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("clp".parse::<Currency>().unwrap(), Currency::CLP);
        assert_eq!(Currency::USD.to_string(), "USD");
        assert!("JPY".parse::<Currency>().is_err());
    }
}
