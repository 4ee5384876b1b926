//! Types module
//!
//! Contains the OFX document model used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: institution, account and currency
//! - `transaction`: transaction types and the `Transaction` entity
//! - `datetime`: OFX date-times with optional time and UTC offset
//! - `settings`: header and envelope settings
//! - `statement`: the `Statement` aggregate root
//! - `error`: Error types for the generator

pub mod account;
pub mod datetime;
pub mod error;
pub mod settings;
pub mod statement;
pub mod transaction;

pub use account::{Account, AccountType, CurrencyCode, FinancialInstitution};
pub use datetime::{OfxDateTime, UtcOffset};
pub use error::{
    AmountSign, InvalidFieldError, OfxError, ParseError, ParseErrorKind, ValidationError,
    ValidationErrors, ValidationWarning,
};
pub use settings::{Charset, DocumentSettings, Encoding, Language, LineEnding, OfxVersion};
pub use statement::{DateRange, LedgerBalance, Statement};
pub use transaction::{Transaction, TransactionType};
