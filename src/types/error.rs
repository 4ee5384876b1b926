//! Error types for the OFX generator
//!
//! This module defines every error the core and its outer layers can report.
//! Errors carry enough context (field, entity, line) to be printed directly
//! by the CLI.
//!
//! # Error Categories
//!
//! - **Field Errors**: a single value fails its formatting contract
//! - **Validation Errors**: statement-level invariants (FITID uniqueness,
//!   sign/type consistency, date ranges), always accumulated
//! - **Parse Errors**: malformed OFX input, always carrying a line number
//! - **Application Errors**: file I/O and CSV problems in the outer layers

use super::datetime::OfxDateTime;
use super::transaction::TransactionType;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// A single value failed its formatting contract
///
/// Raised by the field formatters, by model constructors and by `FromStr`
/// implementations of the enumerated tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field} '{value}': {reason}")]
pub struct InvalidFieldError {
    /// OFX tag or model field name
    pub field: String,
    /// The offending value, as supplied
    pub value: String,
    /// Why the value was rejected
    pub reason: String,
}

impl InvalidFieldError {
    /// Create an InvalidFieldError
    pub fn new(field: &str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        InvalidFieldError {
            field: field.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Re-attribute the error to another field name
    pub fn with_field(self, field: &str) -> Self {
        InvalidFieldError {
            field: field.to_string(),
            ..self
        }
    }
}

/// Sign a transaction amount must carry for its type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSign {
    NonNegative,
    NonPositive,
}

impl fmt::Display for AmountSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountSign::NonNegative => f.write_str("zero or positive"),
            AmountSign::NonPositive => f.write_str("zero or negative"),
        }
    }
}

/// Statement-level validation failure
///
/// Every variant names the entity (and where relevant the field) it
/// concerns, so a caller can report all of them in one pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Two transactions share a FITID
    ///
    /// Reported once per repeated occurrence, referencing the first
    /// transaction that used the identifier.
    #[error("Duplicate FITID '{fitid}' used by transactions[{first}] and transactions[{duplicate}]")]
    DuplicateFitid {
        /// The shared identifier
        fitid: String,
        /// Index of the first transaction using it
        first: usize,
        /// Index of the repeated occurrence
        duplicate: usize,
    },

    /// Amount sign contradicts the transaction type
    #[error("Sign mismatch in transactions[{index}] (FITID '{fitid}'): {tx_type} amount {amount} must be {expected}")]
    SignMismatch {
        /// Index of the transaction
        index: usize,
        /// FITID of the transaction
        fitid: String,
        /// Declared transaction type
        tx_type: TransactionType,
        /// Offending amount
        amount: Decimal,
        /// Sign required by the type
        expected: AmountSign,
    },

    /// A date interval ends before it starts
    #[error("Invalid range in {entity}: start {start} is after end {end}")]
    InvalidRange {
        /// Entity owning the range (e.g. `statement.range`)
        entity: String,
        /// Range start
        start: OfxDateTime,
        /// Range end
        end: OfxDateTime,
    },

    /// A field fails its formatter under the statement's settings
    #[error("Invalid field in {entity}: {source}")]
    InvalidField {
        /// Entity owning the field (e.g. `transactions[2]`)
        entity: String,
        /// The formatter's error
        source: InvalidFieldError,
    },
}

impl ValidationError {
    /// Create a DuplicateFitid error
    pub fn duplicate_fitid(fitid: &str, first: usize, duplicate: usize) -> Self {
        ValidationError::DuplicateFitid {
            fitid: fitid.to_string(),
            first,
            duplicate,
        }
    }

    /// Create a SignMismatch error
    pub fn sign_mismatch(
        index: usize,
        fitid: &str,
        tx_type: TransactionType,
        amount: Decimal,
        expected: AmountSign,
    ) -> Self {
        ValidationError::SignMismatch {
            index,
            fitid: fitid.to_string(),
            tx_type,
            amount,
            expected,
        }
    }

    /// Create an InvalidRange error
    pub fn invalid_range(entity: &str, start: &OfxDateTime, end: &OfxDateTime) -> Self {
        ValidationError::InvalidRange {
            entity: entity.to_string(),
            start: start.clone(),
            end: end.clone(),
        }
    }

    /// Create an InvalidField error
    pub fn invalid_field(entity: &str, source: InvalidFieldError) -> Self {
        ValidationError::InvalidField {
            entity: entity.to_string(),
            source,
        }
    }
}

/// Every validation failure found in one statement
///
/// Never empty when returned as an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Non-fatal validation finding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationWarning {
    /// A transaction was posted outside the statement's date range
    #[error("transactions[{index}] (FITID '{fitid}') posted {posted} outside statement range {start} - {end}")]
    PostedOutsideRange {
        index: usize,
        fitid: String,
        posted: OfxDateTime,
        start: OfxDateTime,
        end: OfxDateTime,
    },
}

/// Malformed OFX input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("OFX parse error at line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line of the offending header line, tag or value
    pub line: usize,
    /// What went wrong
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        ParseError { line, kind }
    }
}

/// Reason a document could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("no <OFX> body found")]
    MissingBody,

    #[error("XML-based OFX is not supported, expected the SGML format")]
    XmlNotSupported,

    #[error("malformed header line '{text}', expected KEY:VALUE")]
    MalformedHeader { text: String },

    #[error("missing required header {key}")]
    MissingHeader { key: &'static str },

    #[error("unsupported value '{value}' for header {key}")]
    UnsupportedHeader { key: String, value: String },

    #[error("malformed tag '{text}'")]
    MalformedTag { text: String },

    #[error("unexpected text '{text}' outside of an element")]
    UnexpectedText { text: String },

    #[error("unexpected closing tag </{found}>{}", expected.as_ref().map(|e| format!(", expected </{}>", e)).unwrap_or_default())]
    MismatchedClose {
        expected: Option<String>,
        found: String,
    },

    #[error("aggregate <{tag}> is never closed")]
    Unclosed { tag: String },

    #[error("unexpected content after </OFX>")]
    TrailingContent,

    #[error("expected <OFX> as the root element, found <{tag}>")]
    UnexpectedRoot { tag: String },

    #[error("missing required tag <{tag}> in <{parent}>")]
    MissingTag { tag: &'static str, parent: String },

    #[error("<{tag}> must be an aggregate")]
    ExpectedAggregate { tag: String },

    #[error("<{tag}> must be an element with a value")]
    ExpectedElement { tag: String },

    #[error("{0}")]
    InvalidField(InvalidFieldError),
}

/// Application-level error for the outer layers (CSV input, CLI, batches)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OfxError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV input could not be read or converted
    #[error("CSV error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    CsvError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the error
        message: String,
    },

    /// A single value is malformed
    #[error(transparent)]
    InvalidField(#[from] InvalidFieldError),

    /// The statement failed validation
    #[error("Statement failed validation:\n{0}")]
    Validation(#[from] ValidationErrors),

    /// OFX input could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The async runtime failed
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the failure
        message: String,
    },
}

// Conversion from io::Error to OfxError
impl From<std::io::Error> for OfxError {
    fn from(error: std::io::Error) -> Self {
        OfxError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to OfxError
impl From<csv::Error> for OfxError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        OfxError::CsvError {
            line,
            message: error.to_string(),
        }
    }
}

impl OfxError {
    /// Create a FileNotFound error
    pub fn file_not_found(path: &str) -> Self {
        OfxError::FileNotFound {
            path: path.to_string(),
        }
    }

    /// Create a CsvError for a given line
    pub fn csv_record(line: Option<u64>, message: impl Into<String>) -> Self {
        OfxError::CsvError {
            line,
            message: message.into(),
        }
    }

    /// Create a Runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        OfxError::Runtime {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn day(y: i32, m: u32, d: u32) -> OfxDateTime {
        OfxDateTime::from_date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[rstest]
    #[case::invalid_field(
        OfxError::InvalidField(InvalidFieldError::new("MEMO", "a<b", "contains '<'")),
        "Invalid MEMO 'a<b': contains '<'"
    )]
    #[case::io_error(
        OfxError::IoError { message: "Permission denied".to_string() },
        "I/O error: Permission denied"
    )]
    #[case::csv_error_with_line(
        OfxError::CsvError { line: Some(42), message: "Invalid amount".to_string() },
        "CSV error at line 42: Invalid amount"
    )]
    #[case::csv_error_without_line(
        OfxError::CsvError { line: None, message: "Invalid amount".to_string() },
        "CSV error: Invalid amount"
    )]
    #[case::parse_error(
        OfxError::Parse(ParseError::new(7, ParseErrorKind::Unclosed { tag: "STMTTRN".to_string() })),
        "OFX parse error at line 7: aggregate <STMTTRN> is never closed"
    )]
    #[case::file_not_found(
        OfxError::file_not_found("missing.ofx"),
        "File not found: missing.ofx"
    )]
    fn test_error_display(#[case] error: OfxError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::duplicate_fitid(
        ValidationError::duplicate_fitid("TX1", 0, 3),
        "Duplicate FITID 'TX1' used by transactions[0] and transactions[3]"
    )]
    #[case::sign_mismatch(
        ValidationError::sign_mismatch(1, "TX2", TransactionType::Debit, Decimal::new(1000, 2), AmountSign::NonPositive),
        "Sign mismatch in transactions[1] (FITID 'TX2'): DEBIT amount 10.00 must be zero or negative"
    )]
    #[case::invalid_range(
        ValidationError::invalid_range("statement.range", &day(2024, 3, 31), &day(2024, 3, 1)),
        "Invalid range in statement.range: start 20240331 is after end 20240301"
    )]
    #[case::invalid_field(
        ValidationError::invalid_field("account", InvalidFieldError::new("CURDEF", "usd", "must be three uppercase letters")),
        "Invalid field in account: Invalid CURDEF 'usd': must be three uppercase letters"
    )]
    fn test_validation_error_display(#[case] error: ValidationError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_validation_errors_display_lists_every_error() {
        let errors = ValidationErrors(vec![
            ValidationError::duplicate_fitid("A", 0, 1),
            ValidationError::duplicate_fitid("B", 2, 3),
        ]);
        let rendered = errors.to_string();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.contains("'A'"));
        assert!(rendered.contains("'B'"));
    }

    #[rstest]
    #[case::mismatched_close_with_expected(
        ParseErrorKind::MismatchedClose { expected: Some("STMTRS".to_string()), found: "STMTTRN".to_string() },
        "unexpected closing tag </STMTTRN>, expected </STMTRS>"
    )]
    #[case::mismatched_close_at_root(
        ParseErrorKind::MismatchedClose { expected: None, found: "OFX".to_string() },
        "unexpected closing tag </OFX>"
    )]
    #[case::missing_tag(
        ParseErrorKind::MissingTag { tag: "FITID", parent: "STMTTRN".to_string() },
        "missing required tag <FITID> in <STMTTRN>"
    )]
    fn test_parse_error_kind_display(#[case] kind: ParseErrorKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: OfxError = io_error.into();
        assert!(matches!(error, OfxError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
