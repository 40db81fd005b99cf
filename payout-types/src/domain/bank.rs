//! Chilean bank catalog.
//!
//! Banks are known both by a numeric clearing code (`"012"`) and by a symbolic
//! name (`"BANCO_ESTADO"`). Every lookup goes through [`resolve`], which reduces
//! either form to one catalog entry, so registries keyed by
//! [`BankInfo::symbol`] never hold duplicate entries for the same bank.
//!
//! The display names are for logs and UIs only; business logic branches on
//! the symbol.

use serde::Serialize;

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BankInfo {
    /// Canonical uppercase symbol, the registry key.
    pub symbol: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Clearing codes; the first one is the primary code.
    pub codes: &'static [&'static str],
    /// Inclusive range of digits an account number at this bank has.
    pub account_digits: (usize, usize),
}

impl BankInfo {
    /// Primary clearing code.
    pub fn code(&self) -> &'static str {
        self.codes[0]
    }

    /// True if an account number of `digits` digits can exist at this bank.
    pub fn accepts_account_length(&self, digits: usize) -> bool {
        let (min, max) = self.account_digits;
        (min..=max).contains(&digits)
    }
}

impl std::fmt::Display for BankInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code())
    }
}

/// Account lengths for banks without a known format.
const ANY_ACCOUNT: (usize, usize) = (8, 10);

macro_rules! bank {
    ($symbol:literal, $name:literal, [$($code:literal),+]) => {
        bank!($symbol, $name, [$($code),+], ANY_ACCOUNT)
    };
    ($symbol:literal, $name:literal, [$($code:literal),+], $digits:expr) => {
        BankInfo { symbol: $symbol, name: $name, codes: &[$($code),+], account_digits: $digits }
    };
}

pub const BANCO_DE_CHILE: BankInfo = bank!("BANCO_DE_CHILE", "Banco de Chile", ["001"], (8, 8));
pub const BANCO_ESTADO: BankInfo =
    bank!("BANCO_ESTADO", "Banco del Estado de Chile", ["012"], (8, 8));

/// Every bank the platform knows about, whether or not a provider exists for it.
pub static CATALOG: &[BankInfo] = &[
    BANCO_DE_CHILE,
    bank!("BANCO_INTERNACIONAL", "Banco Internacional", ["009"]),
    BANCO_ESTADO,
    bank!("BCI", "Banco de Crédito e Inversiones (BCI)", ["016", "014"], (9, 9)),
    bank!("CORPBANCA", "Corpbanca", ["027"]),
    bank!("SANTANDER", "Banco Santander", ["028"], (9, 10)),
    bank!("HSBC", "Banco HSBC Bank Chile", ["031"]),
    bank!("SCOTIABANK", "Scotiabank Chile", ["037"], (9, 10)),
    bank!("ITAU", "Banco Itaú Corpbanca", ["039"]),
    bank!("BANCO_SECURITY", "Banco Security", ["049"]),
    bank!("BANCO_FALABELLA", "Banco Falabella", ["051"]),
    bank!("BANCO_RIPLEY", "Banco Ripley", ["053"]),
    bank!("BANCO_CONSORCIO", "Banco Consorcio", ["054"]),
    bank!("BANCO_PENTA", "Banco Penta", ["055"]),
    bank!("SANTANDER_BANEFE", "Banco Santander Banefe", ["056"]),
    bank!("BBVA", "Banco Bilbao Vizcaya Argentaria (BBVA)", ["504"]),
    bank!("BANCO_DEL_DESARROLLO", "Banco del Desarrollo", ["507"]),
];

/// Reduces an identifier to its canonical lookup key.
///
/// Numeric codes are zero-padded to three digits (`"12"` -> `"012"`);
/// names are uppercased with spaces and dashes folded into underscores.
pub fn canonical_key(identifier: &str) -> String {
    let trimmed = identifier.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return format!("{:0>3}", trimmed);
    }
    trimmed
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Resolves a numeric code or symbolic name to its catalog entry.
pub fn resolve(identifier: &str) -> Option<&'static BankInfo> {
    let key = canonical_key(identifier);
    CATALOG
        .iter()
        .find(|bank| bank.symbol == key || bank.codes.contains(&key.as_str()))
}

/// Display name for a bank code or symbol.
pub fn bank_name(identifier: &str) -> Option<&'static str> {
    resolve(identifier).map(|bank| bank.name)
}

/// Primary clearing code for a bank symbol (or code).
pub fn bank_code(identifier: &str) -> Option<&'static str> {
    resolve(identifier).map(BankInfo::code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_and_symbol_resolve_to_same_entry() {
        let by_code = resolve("012").unwrap();
        let by_name = resolve("BANCO_ESTADO").unwrap();
        assert_eq!(by_code, by_name);
        assert_eq!(by_code.symbol, "BANCO_ESTADO");
    }

    #[test]
    fn test_canonicalization() {
        assert_eq!(canonical_key(" banco_estado "), "BANCO_ESTADO");
        assert_eq!(canonical_key("banco-de-chile"), "BANCO_DE_CHILE");
        assert_eq!(canonical_key("12"), "012");
        assert_eq!(resolve("1").unwrap().symbol, "BANCO_DE_CHILE");
    }

    #[test]
    fn test_secondary_codes() {
        assert_eq!(resolve("014").unwrap().symbol, "BCI");
        assert_eq!(bank_code("BCI"), Some("016"));
    }

    #[test]
    fn test_static_lookups() {
        assert_eq!(bank_name("001"), Some("Banco de Chile"));
        assert_eq!(bank_code("banco estado"), Some("012"));
        assert_eq!(bank_name("999"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn test_account_lengths() {
        assert!(BANCO_ESTADO.accepts_account_length(8));
        assert!(!BANCO_ESTADO.accepts_account_length(9));
        assert!(!BANCO_DE_CHILE.accepts_account_length(10));

        let bci = resolve("014").unwrap();
        assert!(bci.accepts_account_length(9));
        assert!(!bci.accepts_account_length(8));

        let santander = resolve("028").unwrap();
        assert!(santander.accepts_account_length(10));
        assert!(!santander.accepts_account_length(8));

        let falabella = resolve("BANCO_FALABELLA").unwrap();
        assert!(falabella.accepts_account_length(8));
        assert!(falabella.accepts_account_length(10));
        assert!(!falabella.accepts_account_length(7));
        assert!(!falabella.accepts_account_length(11));
    }

    #[test]
    fn test_catalog_symbols_and_codes_unique() {
        let mut keys: Vec<&str> = CATALOG
            .iter()
            .flat_map(|b| std::iter::once(b.symbol).chain(b.codes.iter().copied()))
            .collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }
}
