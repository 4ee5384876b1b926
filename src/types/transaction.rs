//! Transaction-related types for the OFX generator
//!
//! This module defines the transaction type enumeration and the
//! `Transaction` entity written as one `<STMTTRN>` aggregate.

use super::datetime::OfxDateTime;
use super::error::{AmountSign, InvalidFieldError};
use crate::format::text::{check_text, limits};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Transaction types supported by bank statements (`TRNTYPE`)
///
/// Only `Credit` and `Debit` constrain the sign of the amount; every other
/// type may carry either sign (a `Check` is usually negative, an `Int`
/// usually positive, but reversals exist for both).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Generic credit, amount must be positive
    Credit,
    /// Generic debit, amount must be negative
    Debit,
    /// Interest earned or paid
    Int,
    /// Dividend
    Div,
    /// FI fee
    Fee,
    /// Service charge
    SrvChg,
    /// Deposit
    Dep,
    /// ATM debit or credit
    Atm,
    /// Point of sale debit or credit
    Pos,
    /// Transfer, written as `XFER`
    Transfer,
    /// Check
    Check,
    /// Electronic payment
    Payment,
    /// Cash withdrawal
    Cash,
    /// Direct deposit
    DirectDep,
    /// Merchant initiated debit
    DirectDebit,
    /// Repeating payment or standing order
    RepeatPmt,
    /// Anything else
    Other,
}

impl TransactionType {
    /// Every transaction type, in declaration order
    pub const ALL: [TransactionType; 17] = [
        TransactionType::Credit,
        TransactionType::Debit,
        TransactionType::Int,
        TransactionType::Div,
        TransactionType::Fee,
        TransactionType::SrvChg,
        TransactionType::Dep,
        TransactionType::Atm,
        TransactionType::Pos,
        TransactionType::Transfer,
        TransactionType::Check,
        TransactionType::Payment,
        TransactionType::Cash,
        TransactionType::DirectDep,
        TransactionType::DirectDebit,
        TransactionType::RepeatPmt,
        TransactionType::Other,
    ];

    /// OFX token for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Debit => "DEBIT",
            TransactionType::Int => "INT",
            TransactionType::Div => "DIV",
            TransactionType::Fee => "FEE",
            TransactionType::SrvChg => "SRVCHG",
            TransactionType::Dep => "DEP",
            TransactionType::Atm => "ATM",
            TransactionType::Pos => "POS",
            TransactionType::Transfer => "XFER",
            TransactionType::Check => "CHECK",
            TransactionType::Payment => "PAYMENT",
            TransactionType::Cash => "CASH",
            TransactionType::DirectDep => "DIRECTDEP",
            TransactionType::DirectDebit => "DIRECTDEBIT",
            TransactionType::RepeatPmt => "REPEATPMT",
            TransactionType::Other => "OTHER",
        }
    }

    /// Sign the amount must carry, if the type constrains it
    pub fn expected_sign(&self) -> Option<AmountSign> {
        match self {
            TransactionType::Credit => Some(AmountSign::NonNegative),
            TransactionType::Debit => Some(AmountSign::NonPositive),
            _ => None,
        }
    }
}

impl FromStr for TransactionType {
    type Err = InvalidFieldError;

    /// Parse an OFX token, case-insensitively; `TRANSFER` is accepted for `XFER`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_uppercase();
        if token == "TRANSFER" {
            return Ok(TransactionType::Transfer);
        }
        TransactionType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == token)
            .ok_or_else(|| InvalidFieldError::new("TRNTYPE", s, "unknown transaction type"))
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One financial movement (`<STMTTRN>`)
///
/// Text fields are checked on construction. The amount's sign is not: a
/// DEBIT with a positive amount is constructible and rejected later by the
/// validator, which reports every such problem at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    tx_type: TransactionType,
    posted: OfxDateTime,
    amount: Decimal,
    fitid: String,
    check_number: Option<String>,
    reference_number: Option<String>,
    payee: Option<String>,
    memo: Option<String>,
}

impl Transaction {
    /// Create a transaction with its mandatory fields
    ///
    /// # Arguments
    ///
    /// * `tx_type` - The OFX transaction type
    /// * `posted` - Date the transaction was posted
    /// * `amount` - Signed amount, negative for money leaving the account
    /// * `fitid` - Identifier unique within the statement
    ///
    /// # Errors
    ///
    /// Returns an error if the FITID violates the text rules.
    pub fn new(
        tx_type: TransactionType,
        posted: OfxDateTime,
        amount: Decimal,
        fitid: impl Into<String>,
    ) -> Result<Self, InvalidFieldError> {
        let fitid = fitid.into();
        check_text("FITID", &fitid, limits::FITID)?;

        Ok(Transaction {
            tx_type,
            posted,
            amount,
            fitid,
            check_number: None,
            reference_number: None,
            payee: None,
            memo: None,
        })
    }

    /// Attach a check number (`CHECKNUM`)
    pub fn with_check_number(self, check_number: impl Into<String>) -> Result<Self, InvalidFieldError> {
        let check_number = optional_text("CHECKNUM", check_number.into(), limits::CHECK_NUMBER)?;
        Ok(Transaction {
            check_number,
            ..self
        })
    }

    /// Attach a reference number (`REFNUM`)
    pub fn with_reference_number(
        self,
        reference_number: impl Into<String>,
    ) -> Result<Self, InvalidFieldError> {
        let reference_number =
            optional_text("REFNUM", reference_number.into(), limits::REFERENCE_NUMBER)?;
        Ok(Transaction {
            reference_number,
            ..self
        })
    }

    /// Attach a payee (`NAME`)
    pub fn with_payee(self, payee: impl Into<String>) -> Result<Self, InvalidFieldError> {
        let payee = optional_text("NAME", payee.into(), limits::PAYEE)?;
        Ok(Transaction { payee, ..self })
    }

    /// Attach a memo (`MEMO`)
    pub fn with_memo(self, memo: impl Into<String>) -> Result<Self, InvalidFieldError> {
        let memo = optional_text("MEMO", memo.into(), limits::MEMO)?;
        Ok(Transaction { memo, ..self })
    }

    pub fn tx_type(&self) -> TransactionType {
        self.tx_type
    }

    pub fn posted(&self) -> &OfxDateTime {
        &self.posted
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn fitid(&self) -> &str {
        &self.fitid
    }

    pub fn check_number(&self) -> Option<&str> {
        self.check_number.as_deref()
    }

    pub fn reference_number(&self) -> Option<&str> {
        self.reference_number.as_deref()
    }

    pub fn payee(&self) -> Option<&str> {
        self.payee.as_deref()
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }
}

fn optional_text(
    field: &str,
    value: String,
    max_len: usize,
) -> Result<Option<String>, InvalidFieldError> {
    check_text(field, &value, max_len)?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn posted() -> OfxDateTime {
        OfxDateTime::from_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    #[rstest]
    #[case("DEBIT", TransactionType::Debit)]
    #[case("credit", TransactionType::Credit)]
    #[case("XFER", TransactionType::Transfer)]
    #[case("transfer", TransactionType::Transfer)]
    #[case(" SRVCHG ", TransactionType::SrvChg)]
    #[case("DirectDebit", TransactionType::DirectDebit)]
    fn test_transaction_type_from_str(#[case] raw: &str, #[case] expected: TransactionType) {
        assert_eq!(raw.parse::<TransactionType>().unwrap(), expected);
    }

    #[rstest]
    #[case::unknown("REFUND")]
    #[case::empty("")]
    fn test_transaction_type_rejects_unknown(#[case] raw: &str) {
        let error = raw.parse::<TransactionType>().unwrap_err();
        assert_eq!(error.field, "TRNTYPE");
    }

    #[test]
    fn test_every_token_parses_back() {
        for tx_type in TransactionType::ALL {
            assert_eq!(tx_type.as_str().parse::<TransactionType>().unwrap(), tx_type);
        }
    }

    #[rstest]
    #[case(TransactionType::Credit, Some(AmountSign::NonNegative))]
    #[case(TransactionType::Debit, Some(AmountSign::NonPositive))]
    #[case(TransactionType::Check, None)]
    #[case(TransactionType::Int, None)]
    fn test_expected_sign(#[case] tx_type: TransactionType, #[case] expected: Option<AmountSign>) {
        assert_eq!(tx_type.expected_sign(), expected);
    }

    #[test]
    fn test_new_transaction_with_optional_fields() {
        let tx = Transaction::new(TransactionType::Check, posted(), Decimal::new(-12000, 2), "TX1")
            .unwrap()
            .with_check_number("1042")
            .unwrap()
            .with_payee("Landlord")
            .unwrap()
            .with_memo("March rent")
            .unwrap();

        assert_eq!(tx.fitid(), "TX1");
        assert_eq!(tx.check_number(), Some("1042"));
        assert_eq!(tx.reference_number(), None);
        assert_eq!(tx.payee(), Some("Landlord"));
        assert_eq!(tx.memo(), Some("March rent"));
    }

    #[test]
    fn test_wrong_sign_is_constructible() {
        let tx = Transaction::new(TransactionType::Debit, posted(), Decimal::new(500, 2), "TX1");
        assert!(tx.is_ok());
    }

    #[rstest]
    #[case::empty_fitid("")]
    #[case::markup_fitid("<TX>")]
    fn test_new_rejects_bad_fitid(#[case] fitid: &str) {
        let result = Transaction::new(TransactionType::Credit, posted(), Decimal::ONE, fitid);
        assert_eq!(result.unwrap_err().field, "FITID");
    }

    #[test]
    fn test_payee_length_bound() {
        let tx = Transaction::new(TransactionType::Pos, posted(), Decimal::ONE, "TX1").unwrap();
        let error = tx.with_payee("x".repeat(33)).unwrap_err();
        assert_eq!(error.field, "NAME");
    }
}
