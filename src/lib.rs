//! OFX Statement Generator Library
//! # Overview
//!
//! This library builds, validates, serializes and parses OFX 1.x (SGML) bank
//! statements, with a CSV front end and sync/async batch checking.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Document model (Statement, Transaction, Account, settings, errors)
//! - [`format`] - Field formatters (amounts, date-times, text, tag writer)
//! - [`core`] - Pure document pipeline:
//!   - [`core::validator`] - Statement invariants, all errors reported at once
//!   - [`core::serializer`] - Statement to SGML OFX text
//!   - [`core::parser`] - SGML OFX text back to a statement
//! - [`io`] - CSV transaction input
//! - [`convert`] - CSV to OFX conversion
//! - [`strategy`] - Sync and async batch checks of OFX files
//! - [`cli`] - CLI arguments parsing and log setup
//!
//! # Round trip
//!
//! For any statement `s` that validates, `parse(&serialize(&s)?)? == s`, and
//! serializing the parsed statement reproduces the same text.
//!
//! ```
//! use rust_ofx_generator::{parse, serialize, validate};
//! use rust_ofx_generator::types::*;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let day = |d| OfxDateTime::from_date(NaiveDate::from_ymd_opt(2024, 3, d).unwrap());
//! let statement = Statement::new(
//!     FinancialInstitution::new("Example Bank", "1001", "021000021").unwrap(),
//!     Account::new("123456", AccountType::Checking, "USD").unwrap(),
//!     DateRange::new(day(1), day(2)),
//!     LedgerBalance::new(Decimal::new(10000, 2), day(2)),
//!     vec![Transaction::new(TransactionType::Debit, day(1), Decimal::new(-4250, 2), "TX1").unwrap()],
//! );
//!
//! validate(&statement).unwrap();
//! let text = serialize(&statement).unwrap();
//! assert_eq!(parse(&text).unwrap(), statement);
//! ```

// Module declarations
pub mod cli;
pub mod convert;
pub mod core;
pub mod format;
pub mod io;
pub mod strategy;
pub mod types;

pub use convert::{convert_csv, StatementTemplate};
pub use core::{parse, serialize, validate, warnings};
pub use types::{
    Account, AccountType, FinancialInstitution, OfxDateTime, OfxError, Statement, Transaction,
    TransactionType,
};
