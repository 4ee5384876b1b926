//! CSV format handling for transaction records
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to `Transaction`s
//! - The date formats accepted in the `date` column
//!
//! All functions are pure (no I/O) for easy testing.

use crate::format::{parse_amount, parse_datetime};
use crate::types::{InvalidFieldError, OfxDateTime, Transaction, TransactionType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns:
/// `type,date,amount,fitid,check_number,reference,payee,memo`.
/// The last four columns are optional and may be empty or missing.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub tx_type: String,
    pub date: String,
    pub amount: String,
    pub fitid: String,
    pub check_number: Option<String>,
    pub reference: Option<String>,
    pub payee: Option<String>,
    pub memo: Option<String>,
}

/// Convert a CsvRecord to a Transaction
///
/// This function:
/// - Parses the type case-insensitively (`TRANSFER` is accepted for `XFER`)
/// - Parses the date in any of the formats accepted by [`parse_csv_date`]
/// - Parses the amount with the OFX amount rules
/// - Attaches the optional fields that are present and non-empty
///
/// # Errors
///
/// Returns the first field that fails its contract.
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Transaction, InvalidFieldError> {
    let tx_type: TransactionType = csv_record.tx_type.parse()?;
    let posted = parse_csv_date(&csv_record.date)?;
    let amount = parse_amount("amount", &csv_record.amount)?;

    let mut tx = Transaction::new(tx_type, posted, amount, csv_record.fitid.trim())?;
    if let Some(check_number) = non_empty(csv_record.check_number) {
        tx = tx.with_check_number(check_number)?;
    }
    if let Some(reference) = non_empty(csv_record.reference) {
        tx = tx.with_reference_number(reference)?;
    }
    if let Some(payee) = non_empty(csv_record.payee) {
        tx = tx.with_payee(payee)?;
    }
    if let Some(memo) = non_empty(csv_record.memo) {
        tx = tx.with_memo(memo)?;
    }
    Ok(tx)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a date from the CSV `date` column
///
/// Accepted forms, tried in order:
/// - `YYYY-MM-DD`
/// - `YYYY-MM-DD HH:MM:SS[.fff]` or `YYYY-MM-DDTHH:MM:SS[.fff]`
/// - RFC 3339 with an offset, kept as an explicit UTC offset
/// - a raw OFX date-time (`20240301120000[-5:EST]`)
pub fn parse_csv_date(raw: &str) -> Result<OfxDateTime, InvalidFieldError> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(OfxDateTime::from_date(date));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(OfxDateTime::from_naive(datetime));
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return OfxDateTime::from_fixed(datetime).map_err(|e| e.with_field("date"));
    }

    parse_datetime("date", raw).map_err(|_| {
        InvalidFieldError::new(
            "date",
            raw,
            "expected YYYY-MM-DD, YYYY-MM-DD HH:MM:SS, RFC 3339 or an OFX date",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn record(tx_type: &str, date: &str, amount: &str, fitid: &str) -> CsvRecord {
        CsvRecord {
            tx_type: tx_type.to_string(),
            date: date.to_string(),
            amount: amount.to_string(),
            fitid: fitid.to_string(),
            check_number: None,
            reference: None,
            payee: None,
            memo: None,
        }
    }

    #[rstest]
    #[case("debit", TransactionType::Debit)]
    #[case("CREDIT", TransactionType::Credit)]
    #[case("Transfer", TransactionType::Transfer)]
    #[case("xfer", TransactionType::Transfer)]
    fn test_convert_csv_record_types(#[case] raw: &str, #[case] expected: TransactionType) {
        let tx = convert_csv_record(record(raw, "2024-03-01", "-1.00", "TX1")).unwrap();
        assert_eq!(tx.tx_type(), expected);
    }

    #[test]
    fn test_convert_csv_record_optional_fields() {
        let csv_record = CsvRecord {
            check_number: Some("1042".to_string()),
            reference: Some("".to_string()),
            payee: Some("  Landlord ".to_string()),
            memo: None,
            ..record("check", "2024-03-01", "-120.00", "TX9")
        };
        let tx = convert_csv_record(csv_record).unwrap();
        assert_eq!(tx.check_number(), Some("1042"));
        assert_eq!(tx.reference_number(), None);
        assert_eq!(tx.payee(), Some("Landlord"));
        assert_eq!(tx.memo(), None);
        assert_eq!(tx.amount(), Decimal::new(-12000, 2));
    }

    #[rstest]
    #[case::invalid_type(record("refund", "2024-03-01", "1.00", "TX1"), "TRNTYPE")]
    #[case::invalid_date(record("credit", "03/01/2024", "1.00", "TX1"), "date")]
    #[case::invalid_amount(record("credit", "2024-03-01", "1.000,00", "TX1"), "amount")]
    #[case::empty_fitid(record("credit", "2024-03-01", "1.00", ""), "FITID")]
    fn test_convert_csv_record_errors(#[case] csv_record: CsvRecord, #[case] field: &str) {
        let error = convert_csv_record(csv_record).unwrap_err();
        assert_eq!(error.field, field);
    }

    #[test]
    fn test_memo_with_markup_is_rejected() {
        let csv_record = CsvRecord {
            memo: Some("<b>rent</b>".to_string()),
            ..record("debit", "2024-03-01", "-1.00", "TX1")
        };
        assert_eq!(convert_csv_record(csv_record).unwrap_err().field, "MEMO");
    }

    #[rstest]
    #[case::date_only("2024-03-01", "20240301")]
    #[case::space_separated("2024-03-01 09:30:00", "20240301093000")]
    #[case::iso_t("2024-03-01T09:30:00.250", "20240301093000.250")]
    #[case::rfc3339("2024-03-01T09:30:00-05:00", "20240301093000[-5]")]
    #[case::ofx("20240301093000[-5:EST]", "20240301093000[-5:EST]")]
    #[case::leap_second("2024-06-30 23:59:60", "20240630235959.999")]
    fn test_parse_csv_date(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(parse_csv_date(raw).unwrap().to_string(), expected);
    }

    #[test]
    fn test_parse_csv_date_keeps_utc_offset() {
        let value = parse_csv_date("2024-03-01T23:15:00+05:30").unwrap();
        assert_eq!(value.offset().unwrap().minutes(), 330);
        assert_eq!(value.time().unwrap().hour(), 23);
    }
}
