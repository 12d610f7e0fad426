use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a number.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseNumberError {
    #[error("no value given")]
    Empty,

    #[error("invalid number '{0}'")]
    Invalid(String),
}

/// Normalizes input for numeric parsing: trims whitespace and removes commas (thousands separator).
fn normalize_number_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`). Empty input is
/// an error; callers decide whether a value is required.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseNumberError> {
    let normalized = normalize_number_input(s);
    if normalized.is_empty() {
        return Err(ParseNumberError::Empty);
    }
    normalized.parse().map_err(|e| {
        tracing::warn!(input = %s, "invalid decimal: {}", e);
        ParseNumberError::Invalid(s.trim().to_string())
    })
}

/// Parses a string into a signed whole number, with the same comma handling
/// as [`parse_decimal`].
pub fn parse_integer(s: &str) -> Result<i64, ParseNumberError> {
    let normalized = normalize_number_input(s);
    if normalized.is_empty() {
        return Err(ParseNumberError::Empty);
    }
    normalized.parse().map_err(|e| {
        tracing::warn!(input = %s, "invalid integer: {}", e);
        ParseNumberError::Invalid(s.trim().to_string())
    })
}

/// Parses a Yes/No answer, case-insensitively.
pub fn parse_yes_no(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}
