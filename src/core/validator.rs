//! Statement validator
//!
//! Checks the statement-level invariants that the model constructors leave
//! open, accumulating every violation instead of stopping at the first.
//!
//! # Checks
//!
//! - FITID uniqueness across the transaction list
//! - non-zero transaction amounts
//! - sign/type consistency for DEBIT and CREDIT
//! - statement range start on or before its end
//! - currency code shape
//! - every field passes its formatter under the declared encoding
//!
//! A statement that validates cleanly serializes without error. Posted
//! dates outside the statement range are only warnings.

use crate::format::field::check_currency;
use crate::format::{limits, FieldValue};
use crate::types::{
    AmountSign, InvalidFieldError, Statement, Transaction, ValidationError, ValidationErrors,
    ValidationWarning,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Validate a statement
///
/// Logs each [`ValidationWarning`] at warn level; warnings never cause a
/// failure.
///
/// # Errors
///
/// Returns every violation found, in check order.
pub fn validate(statement: &Statement) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    check_fitids(statement.transactions(), &mut errors);
    check_amounts(statement.transactions(), &mut errors);
    check_signs(statement.transactions(), &mut errors);
    check_range(statement, &mut errors);
    check_currency_code(statement, &mut errors);
    check_fields(statement, &mut errors);

    for warning in warnings(statement) {
        warn!("{}", warning);
    }

    debug!(
        transactions = statement.transactions().len(),
        errors = errors.len(),
        "Statement validated"
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Non-fatal findings: transactions posted outside the statement range
pub fn warnings(statement: &Statement) -> Vec<ValidationWarning> {
    let range = statement.range();
    statement
        .transactions()
        .iter()
        .enumerate()
        .filter(|(_, tx)| !range.contains(tx.posted()))
        .map(|(index, tx)| ValidationWarning::PostedOutsideRange {
            index,
            fitid: tx.fitid().to_string(),
            posted: tx.posted().clone(),
            start: range.start.clone(),
            end: range.end.clone(),
        })
        .collect()
}

fn check_fitids(transactions: &[Transaction], errors: &mut Vec<ValidationError>) {
    let mut first_seen: HashMap<&str, usize> = HashMap::with_capacity(transactions.len());
    for (index, tx) in transactions.iter().enumerate() {
        match first_seen.get(tx.fitid()) {
            Some(&first) => {
                errors.push(ValidationError::duplicate_fitid(tx.fitid(), first, index))
            }
            None => {
                first_seen.insert(tx.fitid(), index);
            }
        }
    }
}

fn check_amounts(transactions: &[Transaction], errors: &mut Vec<ValidationError>) {
    for (index, tx) in transactions.iter().enumerate() {
        if tx.amount().is_zero() {
            errors.push(ValidationError::invalid_field(
                &format!("transactions[{}]", index),
                InvalidFieldError::new(
                    "TRNAMT",
                    tx.amount().to_string(),
                    "transaction amount cannot be zero",
                ),
            ));
        }
    }
}

fn check_signs(transactions: &[Transaction], errors: &mut Vec<ValidationError>) {
    for (index, tx) in transactions.iter().enumerate() {
        let Some(expected) = tx.tx_type().expected_sign() else {
            continue;
        };
        let amount = tx.amount();
        let mismatch = match expected {
            AmountSign::NonNegative => amount < Decimal::ZERO,
            AmountSign::NonPositive => amount > Decimal::ZERO,
        };
        if mismatch {
            errors.push(ValidationError::sign_mismatch(
                index,
                tx.fitid(),
                tx.tx_type(),
                amount,
                expected,
            ));
        }
    }
}

fn check_range(statement: &Statement, errors: &mut Vec<ValidationError>) {
    let range = statement.range();
    if range.start.compare(&range.end).is_gt() {
        errors.push(ValidationError::invalid_range(
            "statement.range",
            &range.start,
            &range.end,
        ));
    }
}

fn check_currency_code(statement: &Statement, errors: &mut Vec<ValidationError>) {
    if let Err(source) = check_currency("CURDEF", statement.account().currency().as_str()) {
        errors.push(ValidationError::invalid_field("account", source));
    }
}

/// Run every emitted value through its formatter, as the serializer will
fn check_fields(statement: &Statement, errors: &mut Vec<ValidationError>) {
    let encoding = statement.settings().encoding();
    let mut check = |entity: &str, field: &'static str, value: FieldValue<'_>| {
        if let Err(source) = value.encode(field, encoding) {
            errors.push(ValidationError::invalid_field(entity, source));
        }
    };

    let settings = statement.settings();
    check(
        "settings",
        "TRNUID",
        FieldValue::text(settings.transaction_uid(), limits::TRANSACTION_UID),
    );
    if let Some(uid) = settings.old_file_uid() {
        check("settings", "OLDFILEUID", FieldValue::text(uid, limits::FILE_UID));
    }
    if let Some(uid) = settings.new_file_uid() {
        check("settings", "NEWFILEUID", FieldValue::text(uid, limits::FILE_UID));
    }

    let fi = statement.institution();
    check("institution", "ORG", FieldValue::text(fi.organization(), limits::ORGANIZATION));
    check("institution", "FID", FieldValue::text(fi.fid(), limits::FID));
    check("institution", "BANKID", FieldValue::text(fi.bank_id(), limits::BANK_ID));

    let account = statement.account();
    check("account", "ACCTID", FieldValue::text(account.account_id(), limits::ACCOUNT_ID));
    if let Some(branch) = account.branch_id() {
        check("account", "BRANCHID", FieldValue::text(branch, limits::BRANCH_ID));
    }

    let range = statement.range();
    check("statement.range", "DTSTART", FieldValue::DateTime(&range.start));
    check("statement.range", "DTEND", FieldValue::DateTime(&range.end));
    let as_of = &statement.ledger_balance().as_of;
    check("ledger_balance", "DTASOF", FieldValue::DateTime(as_of));

    for (index, tx) in statement.transactions().iter().enumerate() {
        let entity = format!("transactions[{}]", index);
        check(&entity, "DTPOSTED", FieldValue::DateTime(tx.posted()));
        check(&entity, "FITID", FieldValue::text(tx.fitid(), limits::FITID));
        let optional = [
            ("CHECKNUM", tx.check_number(), limits::CHECK_NUMBER),
            ("REFNUM", tx.reference_number(), limits::REFERENCE_NUMBER),
            ("NAME", tx.payee(), limits::PAYEE),
            ("MEMO", tx.memo(), limits::MEMO),
        ];
        for (field, value, max_len) in optional {
            if let Some(value) = value {
                check(&entity, field, FieldValue::text(value, max_len));
            }
        }
    }
}
