//! Chilean national tax identifier (RUT).
//!
//! A RUT is a 7-8 digit body plus a modulo-11 check digit (`0`-`9` or `K`).
//! Users type it in many shapes (`12.345.678-5`, `12345678-5`, `123456785`);
//! each bank wants its own, so the value is parsed once and rendered on demand.

use std::fmt;

use crate::error::DomainError;

/// A parsed, check-digit-verified RUT.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rut {
    body: String,
    check: char,
}

impl Rut {
    /// Parses a RUT in any common format and verifies its check digit.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let cleaned: String = input
            .chars()
            .filter(|c| !matches!(c, '.' | '-' | ' '))
            .collect::<String>()
            .to_uppercase();

        let invalid = || DomainError::InvalidRut(input.to_string());

        let check = cleaned.chars().last().ok_or_else(invalid)?;
        let body = &cleaned[..cleaned.len() - check.len_utf8()];

        if !(7..=8).contains(&body.len()) || !body.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if Self::check_digit(body) != Some(check) {
            return Err(invalid());
        }

        Ok(Self {
            body: body.to_string(),
            check,
        })
    }

    /// Computes the modulo-11 check digit for a numeric body.
    ///
    /// Returns `None` if the body contains non-digit characters.
    pub fn check_digit(body: &str) -> Option<char> {
        let mut sum = 0u32;
        let mut multiplier = 2u32;
        for c in body.chars().rev() {
            sum += c.to_digit(10)? * multiplier;
            multiplier = if multiplier == 7 { 2 } else { multiplier + 1 };
        }
        match 11 - (sum % 11) {
            11 => Some('0'),
            10 => Some('K'),
            d => char::from_digit(d, 10),
        }
    }

    /// `12345678-5`
    pub fn with_dash(&self) -> String {
        format!("{}-{}", self.body, self.check)
    }

    /// `123456785`
    pub fn compact(&self) -> String {
        format!("{}{}", self.body, self.check)
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.body, self.check)
    }
}

impl std::str::FromStr for Rut {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_common_formats() {
        for input in ["12.345.678-5", "12345678-5", "123456785", " 12345678 - 5 "] {
            let rut = Rut::parse(input).unwrap();
            assert_eq!(rut.with_dash(), "12345678-5");
            assert_eq!(rut.compact(), "123456785");
        }
    }

    #[test]
    fn test_check_digit_k_and_zero() {
        // 10 -> K
        assert_eq!(Rut::check_digit("10000013"), Some('K'));
        assert!(Rut::parse("10.000.013-k").is_ok());
        // 11 -> 0
        assert_eq!(Rut::check_digit("10000004"), Some('0'));
    }

    #[test]
    fn test_wrong_check_digit_rejected() {
        assert!(matches!(
            Rut::parse("12.345.678-9"),
            Err(DomainError::InvalidRut(_))
        ));
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(Rut::parse("").is_err());
        assert!(Rut::parse("12-3").is_err());
        assert!(Rut::parse("ABCDEFGH-1").is_err());
    }

    #[test]
    fn test_display_uses_dash() {
        let rut: Rut = "11.111.111-1".parse().unwrap();
        assert_eq!(rut.to_string(), "11111111-1");
    }
}
