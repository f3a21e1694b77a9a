//! Price and quantity text parsing

use once_cell::sync::Lazy;
use regex::Regex;

static NON_PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]").expect("static regex"));
static DOLLAR_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\d+(\.\d{2})?").expect("static regex"));

/// Numeric value of a price label such as `"Subtotal: $1,234.50"`.
///
/// Everything except digits and `.` is dropped first, so thousands
/// separators and currency symbols are ignored.
pub fn parse_price(text: &str) -> Option<f64> {
    let digits = NON_PRICE.replace_all(text, "");
    let digits = digits.trim_matches('.');
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// First `$12` or `$12.34` amount in `text`.
pub fn find_dollar_amount(text: &str) -> Option<&str> {
    DOLLAR_AMOUNT.find(text).map(|m| m.as_str())
}

/// Whether two amounts agree to the cent.
pub fn same_amount(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.005
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_currency_and_separators() {
        assert_eq!(parse_price("$1,234.50"), Some(1234.5));
        assert_eq!(parse_price("Subtotal: $19.99"), Some(19.99));
        assert_eq!(parse_price("Free"), None);
        assert_eq!(parse_price("1.2.3"), None);
    }

    #[test]
    fn finds_the_first_dollar_amount() {
        assert_eq!(find_dollar_amount("From $24.00 to $30"), Some("$24.00"));
        assert_eq!(find_dollar_amount("Price on request"), None);
    }

    #[test]
    fn cent_tolerance() {
        assert!(same_amount(0.1 + 0.2, 0.3));
        assert!(!same_amount(19.99, 19.98));
    }
}
