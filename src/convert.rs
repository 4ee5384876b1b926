//! CSV to OFX conversion
//!
//! Builds a [`Statement`] from a CSV transaction file and the statement
//! metadata supplied by the caller, validates it and serializes it.

use crate::core::{serialize, validate};
use crate::io::SyncReader;
use crate::types::{
    Account, DateRange, DocumentSettings, FinancialInstitution, LedgerBalance, OfxDateTime,
    OfxError, Statement, Transaction,
};
use std::path::Path;
use tracing::{error, info};

/// Everything a statement needs besides its transactions
#[derive(Debug, Clone, PartialEq)]
pub struct StatementTemplate {
    pub institution: FinancialInstitution,
    pub account: Account,
    pub ledger_balance: LedgerBalance,
    /// Statement start, defaults to the earliest posted date
    pub start: Option<OfxDateTime>,
    /// Statement end, defaults to the latest posted date
    pub end: Option<OfxDateTime>,
    pub settings: DocumentSettings,
}

impl StatementTemplate {
    /// Combine the template with a transaction list
    ///
    /// A missing range bound falls back to the earliest (start) or latest
    /// (end) posted date, or to the ledger as-of date when there are no
    /// transactions.
    pub fn build(self, transactions: Vec<Transaction>) -> Statement {
        let posted = || transactions.iter().map(Transaction::posted);
        let start = self.start.unwrap_or_else(|| {
            posted()
                .min_by(|a, b| a.compare(b))
                .cloned()
                .unwrap_or_else(|| self.ledger_balance.as_of.clone())
        });
        let end = self.end.unwrap_or_else(|| {
            posted()
                .max_by(|a, b| a.compare(b))
                .cloned()
                .unwrap_or_else(|| self.ledger_balance.as_of.clone())
        });

        Statement::new(
            self.institution,
            self.account,
            DateRange::new(start, end),
            self.ledger_balance,
            transactions,
        )
        .with_settings(self.settings)
    }
}

/// Read every transaction from a CSV file
///
/// Each bad record is logged; if any record failed, no transactions are
/// returned so a partial statement is never produced.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be opened, or a `CsvError`
/// summarising how many records failed.
pub fn read_transactions(input: &Path) -> Result<Vec<Transaction>, OfxError> {
    let mut transactions = Vec::new();
    let mut failures = 0usize;

    for result in SyncReader::new(input)? {
        match result {
            Ok(tx) => transactions.push(tx),
            Err(e) => {
                error!("{}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(OfxError::csv_record(
            None,
            format!(
                "{} of {} records in '{}' could not be converted",
                failures,
                failures + transactions.len(),
                input.display()
            ),
        ));
    }
    Ok(transactions)
}

/// Convert a CSV transaction file into OFX text
///
/// # Errors
///
/// Fails on unreadable input, any invalid record, or a statement that does
/// not pass validation (all validation errors are returned together).
pub fn convert_csv(input: &Path, template: StatementTemplate) -> Result<String, OfxError> {
    let transactions = read_transactions(input)?;
    info!(
        transactions = transactions.len(),
        input = %input.display(),
        "Read CSV transactions"
    );

    let statement = template.build(transactions);
    validate(&statement)?;
    Ok(serialize(&statement)?)
}
