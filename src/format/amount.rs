//! Monetary amount encoding
//!
//! Amounts are fixed point with `.` as the decimal separator, no grouping,
//! and a sign only when negative. Currency amounts are written with at
//! least two decimal places; finer scales are kept as supplied.

use crate::types::InvalidFieldError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Format an amount for a TRNAMT/BALAMT element
pub fn format_amount(amount: Decimal) -> String {
    let mut value = amount;
    if value.is_zero() {
        value.set_sign_positive(true);
    }
    if value.scale() < 2 {
        value.rescale(2);
    }
    value.to_string()
}

/// Parse an amount element value
///
/// Accepts an optional sign, digits, and a single `.` separator. A `,`
/// separator is tolerated as some institutions emit it; grouping,
/// exponents and underscores are rejected.
pub fn parse_amount(field: &str, raw: &str) -> Result<Decimal, InvalidFieldError> {
    let trimmed = raw.trim();
    let (sign, body) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let separators = body.chars().filter(|c| *c == '.' || *c == ',').count();
    let well_formed = separators <= 1
        && body.chars().any(|c| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',');
    if !well_formed {
        return Err(InvalidFieldError::new(
            field,
            raw,
            "expected a decimal number such as -42.50",
        ));
    }

    let mut normalized = body.replace(',', ".");
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }
    if normalized.ends_with('.') {
        normalized.pop();
    }

    Decimal::from_str(&format!("{}{}", sign, normalized))
        .map_err(|e| InvalidFieldError::new(field, raw, e.to_string()))
}
