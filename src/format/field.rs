//! Field kinds and their formatters
//!
//! Every value the serializer writes goes through exactly one variant of
//! [`FieldValue`], so adding a kind forces every formatter site to handle it.

use super::amount::format_amount;
use super::datetime::format_datetime;
use super::text::encode_text;
use crate::types::{Encoding, InvalidFieldError, OfxDateTime};
use rust_decimal::Decimal;
use std::borrow::Cow;

/// A typed value ready to be written as an OFX element
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// DTPOSTED, DTSTART, DTEND, DTASOF, DTSERVER
    DateTime(&'a OfxDateTime),
    /// TRNAMT, BALAMT
    Amount(Decimal),
    /// Fixed enumeration token (TRNTYPE, ACCTTYPE, LANGUAGE, status codes)
    Token(&'static str),
    /// ISO 4217 code (CURDEF)
    Currency(&'a str),
    /// Free text with its maximum length
    Text { value: &'a str, max_len: usize },
}

impl<'a> FieldValue<'a> {
    /// Shorthand for a bounded text value
    pub fn text(value: &'a str, max_len: usize) -> Self {
        FieldValue::Text { value, max_len }
    }

    /// Encode the value for the element `field`
    ///
    /// # Errors
    ///
    /// Returns an error if the value violates its kind's contract under the
    /// given document encoding.
    pub fn encode(&self, field: &str, encoding: Encoding) -> Result<Cow<'a, str>, InvalidFieldError> {
        match *self {
            FieldValue::DateTime(value) => format_datetime(value)
                .map(Cow::Owned)
                .map_err(|e| e.with_field(field)),
            FieldValue::Amount(value) => Ok(Cow::Owned(format_amount(value))),
            FieldValue::Token(token) => Ok(Cow::Borrowed(token)),
            FieldValue::Currency(code) => check_currency(field, code).map(|_| Cow::Borrowed(code)),
            FieldValue::Text { value, max_len } => {
                encode_text(field, value, max_len, encoding).map(Cow::Borrowed)
            }
        }
    }
}

/// Check an ISO 4217 currency code: exactly three uppercase ASCII letters
pub fn check_currency(field: &str, code: &str) -> Result<(), InvalidFieldError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(InvalidFieldError::new(
            field,
            code,
            "must be three uppercase letters (ISO 4217)",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[test]
    fn test_encode_datetime_reports_element_name() {
        let far_future = OfxDateTime::from_date(NaiveDate::from_ymd_opt(12000, 1, 1).unwrap());
        let error = FieldValue::DateTime(&far_future)
            .encode("DTPOSTED", Encoding::UsAscii)
            .unwrap_err();
        assert_eq!(error.field, "DTPOSTED");
    }

    #[rstest]
    #[case::amount(FieldValue::Amount(Decimal::new(-4250, 2)), "-42.50")]
    #[case::token(FieldValue::Token("DEBIT"), "DEBIT")]
    #[case::currency(FieldValue::Currency("USD"), "USD")]
    #[case::text(FieldValue::text("Groceries", 255), "Groceries")]
    fn test_encode_valid(#[case] value: FieldValue<'static>, #[case] expected: &str) {
        assert_eq!(value.encode("X", Encoding::UsAscii).unwrap(), expected);
    }

    #[rstest]
    #[case::lowercase("usd")]
    #[case::too_short("US")]
    #[case::too_long("USDX")]
    #[case::digits("US1")]
    #[case::empty("")]
    fn test_check_currency_rejects(#[case] code: &str) {
        assert!(check_currency("CURDEF", code).is_err());
    }
}
