//! Contact-form field validators
//!
//! Pure functions: no IO, no session access. Each returns the value to
//! store (trimmed/normalized) or a static user-facing correction message.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+\d{10,15}$").unwrap());

pub fn validate_name(input: &str) -> Result<String, &'static str> {
    let name = input.trim();
    if name.is_empty() {
        return Err("I didn't catch that. Could you tell me your name?");
    }
    if name.len() < 2 {
        return Err("That name looks too short. Could you give me your full name?");
    }
    if name.len() > 100 {
        return Err("That name looks too long. Could you give me a shorter version?");
    }
    Ok(name.to_string())
}

pub fn validate_email(input: &str) -> Result<String, &'static str> {
    let email = input.trim();
    if EMAIL_RE.is_match(email) {
        Ok(email.to_string())
    } else {
        Err("That doesn't look like a valid email address. Could you double-check it? (e.g., name@example.com)")
    }
}

/// Accepts spaces and dashes as separators; stores the compact form.
/// A leading `+` with the country code is required.
pub fn validate_phone(input: &str) -> Result<String, &'static str> {
    let compact: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    if !compact.starts_with('+') {
        return Err("Please include your country code starting with '+' (e.g., +91 98765 43210).");
    }
    if PHONE_RE.is_match(&compact) {
        Ok(compact)
    } else {
        Err("That doesn't look like a valid mobile number. Please send 10-15 digits including the country code.")
    }
}

pub fn validate_datetime(input: &str) -> Result<String, &'static str> {
    let datetime = input.trim();
    if datetime.len() < 5 {
        return Err(
            "Could you be a bit more specific about the time? (e.g., 'Tomorrow 3pm', 'Monday morning')",
        );
    }
    Ok(datetime.to_string())
}

pub fn validate_timezone(input: &str) -> Result<String, &'static str> {
    let timezone = input.trim();
    if timezone.len() < 2 {
        return Err("Please tell me your timezone (e.g., IST, UTC+5:30, EST).");
    }
    Ok(timezone.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_bounds() {
        assert_eq!(validate_name("  Priya Sharma ").unwrap(), "Priya Sharma");
        assert!(validate_name("").is_err());
        assert!(validate_name(" ").is_err());
        assert!(validate_name("A").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
        assert!(validate_name(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("priya@example.com").is_ok());
        assert!(validate_email("a.b+tag@sub.example.co").is_ok());
        assert!(validate_email("missing-at.example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user@example.c").is_err());
    }

    #[test]
    fn test_phone_requires_country_code() {
        assert_eq!(validate_phone("+91 98765 43210").unwrap(), "+919876543210");
        assert_eq!(validate_phone("+1-415-555-0100").unwrap(), "+14155550100");
        assert!(validate_phone("9876543210").is_err());
        assert!(validate_phone("+123").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
        assert!(validate_phone("+12ab4567890").is_err());
    }

    #[test]
    fn test_datetime_and_timezone_minimums() {
        assert!(validate_datetime("soon").is_err());
        assert!(validate_datetime("Tomorrow 3pm").is_ok());
        assert!(validate_timezone("I").is_err());
        assert!(validate_timezone("IST").is_ok());
    }
}
