//! Bank account number helpers.

/// Strips every separator from an account number, keeping digits only.
pub fn normalize_account_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Masks an account number for logs, keeping only the last four digits.
pub fn mask_account(raw: &str) -> String {
    let digits = normalize_account_number(raw);
    if digits.len() <= 4 {
        return "****".to_string();
    }
    format!("****{}", &digits[digits.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_separators() {
        assert_eq!(normalize_account_number("0012-3456 78"), "0012345678");
        assert_eq!(normalize_account_number("12.345.678"), "12345678");
    }

    #[test]
    fn test_mask_keeps_last_four() {
        assert_eq!(mask_account("12-345-678"), "****5678");
        assert_eq!(mask_account("123"), "****");
    }
}
