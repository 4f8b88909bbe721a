//! Money parsing and contact validation helpers shared by the handlers.
//!
//! All functions are pure and allocation-light.

use validator::ValidateEmail;

/// Extracts a number from free-form money input
///
/// Keeps digits up to a second decimal point, honours a leading minus sign
/// and drops everything else (currency symbols, thousands separators,
/// trailing junk). Returns `None` when no digit survives.
///
/// ```
/// use sitedesk_shared::format::sanitize_amount;
///
/// assert_eq!(sanitize_amount("$1,234.56abc"), Some(1234.56));
/// assert_eq!(sanitize_amount("-75"), Some(-75.0));
/// assert_eq!(sanitize_amount("1,234.56.78"), Some(1234.56));
/// assert_eq!(sanitize_amount("free"), None);
/// ```
pub fn sanitize_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let negative = trimmed.starts_with('-');

    let mut cleaned = String::with_capacity(trimmed.len() + 1);
    if negative {
        cleaned.push('-');
    }

    let mut seen_dot = false;
    for c in trimmed.chars() {
        match c {
            '0'..='9' => cleaned.push(c),
            '.' if seen_dot => break,
            '.' => {
                seen_dot = true;
                cleaned.push(c);
            }
            _ => {}
        }
    }

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    cleaned.parse().ok()
}

pub fn is_valid_email(value: &str) -> bool {
    value.trim().to_string().validate_email()
}

/// Phone numbers: digits with optional `+`, spaces, dashes, dots and parentheses,
/// and between 7 and 15 digits overall
pub fn is_valid_phone(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }

    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '.' | '(' | ')'));
    let digits = value.chars().filter(char::is_ascii_digit).count();

    allowed && (7..=15).contains(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_amount() {
        assert_eq!(sanitize_amount("$1,234.56abc"), Some(1234.56));
        assert_eq!(sanitize_amount("  ₱ 20,000 "), Some(20000.0));
        assert_eq!(sanitize_amount("1.2.3"), Some(1.2));
        assert_eq!(sanitize_amount("1,234.56.78"), Some(1234.56));
        assert_eq!(sanitize_amount("-$40.10"), Some(-40.1));
        assert_eq!(sanitize_amount(""), None);
        assert_eq!(sanitize_amount("abc"), None);
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("office@example.com"));
        assert!(is_valid_email(" office@example.com "));
        assert!(!is_valid_email("office.example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("+63 917 123 4567"));
        assert!(is_valid_phone("(02) 8123-4567"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("call me"));
        assert!(!is_valid_phone(""));
    }}
