//! OFX serializer
//!
//! Walks a [`Statement`] and emits the SGML document: the flat header block,
//! a blank line, then the signon and bank statement responses.
//!
//! The serializer only runs the per-value formatter checks. Cross-field
//! invariants (FITID uniqueness, signs, ranges) are the validator's job and
//! callers are expected to validate first.

use crate::format::{limits, FieldValue, TagWriter};
use crate::types::{InvalidFieldError, Statement, Transaction};
use tracing::debug;

/// Serialize a statement to OFX text
///
/// # Errors
///
/// Returns an error if a value fails its formatter, which cannot happen for
/// a statement that passed [`validate`](crate::core::validate).
pub fn serialize(statement: &Statement) -> Result<String, InvalidFieldError> {
    let settings = statement.settings();
    let mut writer = TagWriter::new(settings.line_ending(), settings.encoding());

    write_header(&mut writer, statement);

    writer.aggregate("OFX", |w| {
        write_signon(w, statement)?;
        w.aggregate("BANKMSGSRSV1", |w| {
            w.aggregate("STMTTRNRS", |w| {
                w.element(
                    "TRNUID",
                    FieldValue::text(settings.transaction_uid(), limits::TRANSACTION_UID),
                )?;
                write_status(w)?;
                write_statement(w, statement)
            })
        })
    })?;

    let output = writer.finish();
    debug!(
        transactions = statement.transactions().len(),
        bytes = output.len(),
        "Statement serialized"
    );
    Ok(output)
}

fn write_header(w: &mut TagWriter, statement: &Statement) {
    let settings = statement.settings();
    w.header("OFXHEADER", "100");
    w.header("DATA", "OFXSGML");
    w.header("VERSION", settings.version().as_str());
    w.header("SECURITY", "NONE");
    w.header("ENCODING", settings.encoding().as_str());
    w.header("CHARSET", settings.charset().as_str());
    w.header("COMPRESSION", "NONE");
    w.header("OLDFILEUID", settings.old_file_uid().unwrap_or("NONE"));
    w.header("NEWFILEUID", settings.new_file_uid().unwrap_or("NONE"));
    w.blank_line();
}

fn write_status(w: &mut TagWriter) -> Result<(), InvalidFieldError> {
    w.aggregate("STATUS", |w| {
        w.element("CODE", FieldValue::Token("0"))?;
        w.element("SEVERITY", FieldValue::Token("INFO"))
    })
}

fn write_signon(w: &mut TagWriter, statement: &Statement) -> Result<(), InvalidFieldError> {
    let fi = statement.institution();
    w.aggregate("SIGNONMSGSRSV1", |w| {
        w.aggregate("SONRS", |w| {
            write_status(w)?;
            // server time is the ledger as-of date so output stays reproducible
            w.element(
                "DTSERVER",
                FieldValue::DateTime(&statement.ledger_balance().as_of),
            )?;
            w.element(
                "LANGUAGE",
                FieldValue::Token(statement.settings().language().as_str()),
            )?;
            w.aggregate("FI", |w| {
                w.element("ORG", FieldValue::text(fi.organization(), limits::ORGANIZATION))?;
                w.element("FID", FieldValue::text(fi.fid(), limits::FID))
            })
        })
    })
}

fn write_statement(w: &mut TagWriter, statement: &Statement) -> Result<(), InvalidFieldError> {
    let account = statement.account();
    let range = statement.range();
    let balance = statement.ledger_balance();

    w.aggregate("STMTRS", |w| {
        w.element("CURDEF", FieldValue::Currency(account.currency().as_str()))?;
        w.aggregate("BANKACCTFROM", |w| {
            w.element(
                "BANKID",
                FieldValue::text(statement.institution().bank_id(), limits::BANK_ID),
            )?;
            w.optional_element(
                "BRANCHID",
                account
                    .branch_id()
                    .map(|b| FieldValue::text(b, limits::BRANCH_ID)),
            )?;
            w.element(
                "ACCTID",
                FieldValue::text(account.account_id(), limits::ACCOUNT_ID),
            )?;
            w.element("ACCTTYPE", FieldValue::Token(account.account_type().as_str()))
        })?;

        w.aggregate("BANKTRANLIST", |w| {
            w.element("DTSTART", FieldValue::DateTime(&range.start))?;
            w.element("DTEND", FieldValue::DateTime(&range.end))?;
            statement
                .transactions()
                .iter()
                .try_for_each(|tx| write_transaction(w, tx))
        })?;

        w.aggregate("LEDGERBAL", |w| {
            w.element("BALAMT", FieldValue::Amount(balance.amount))?;
            w.element("DTASOF", FieldValue::DateTime(&balance.as_of))
        })
    })
}

fn write_transaction(w: &mut TagWriter, tx: &Transaction) -> Result<(), InvalidFieldError> {
    w.aggregate("STMTTRN", |w| {
        w.element("TRNTYPE", FieldValue::Token(tx.tx_type().as_str()))?;
        w.element("DTPOSTED", FieldValue::DateTime(tx.posted()))?;
        w.element("TRNAMT", FieldValue::Amount(tx.amount()))?;
        w.element("FITID", FieldValue::text(tx.fitid(), limits::FITID))?;
        w.optional_element(
            "CHECKNUM",
            tx.check_number()
                .map(|v| FieldValue::text(v, limits::CHECK_NUMBER)),
        )?;
        w.optional_element(
            "REFNUM",
            tx.reference_number()
                .map(|v| FieldValue::text(v, limits::REFERENCE_NUMBER)),
        )?;
        w.optional_element("NAME", tx.payee().map(|v| FieldValue::text(v, limits::PAYEE)))?;
        w.optional_element("MEMO", tx.memo().map(|v| FieldValue::text(v, limits::MEMO)))
    })
}
