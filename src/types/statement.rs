//! The statement aggregate root

use super::account::{Account, FinancialInstitution};
use super::datetime::OfxDateTime;
use super::settings::DocumentSettings;
use super::transaction::Transaction;
use rust_decimal::Decimal;

/// Account balance reported at a point in time (`<LEDGERBAL>`)
///
/// Independent of the transaction list: it is never compared with the sum
/// of the transaction amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerBalance {
    pub amount: Decimal,
    pub as_of: OfxDateTime,
}

impl LedgerBalance {
    pub fn new(amount: Decimal, as_of: OfxDateTime) -> Self {
        LedgerBalance { amount, as_of }
    }
}

/// Statement period (`DTSTART`/`DTEND`)
///
/// A reversed range is constructible; the validator rejects it.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub start: OfxDateTime,
    pub end: OfxDateTime,
}

impl DateRange {
    pub fn new(start: OfxDateTime, end: OfxDateTime) -> Self {
        DateRange { start, end }
    }

    /// Whether `value` falls within the range, bounds included
    pub fn contains(&self, value: &OfxDateTime) -> bool {
        self.start.compare(value).is_le() && value.compare(&self.end).is_le()
    }
}

/// One account's statement over one date range
///
/// Transactions keep the order they were supplied in.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    settings: DocumentSettings,
    institution: FinancialInstitution,
    account: Account,
    range: DateRange,
    ledger_balance: LedgerBalance,
    transactions: Vec<Transaction>,
}

impl Statement {
    /// Create a statement with default document settings
    pub fn new(
        institution: FinancialInstitution,
        account: Account,
        range: DateRange,
        ledger_balance: LedgerBalance,
        transactions: Vec<Transaction>,
    ) -> Self {
        Statement {
            settings: DocumentSettings::default(),
            institution,
            account,
            range,
            ledger_balance,
            transactions,
        }
    }

    /// Replace the document settings
    pub fn with_settings(self, settings: DocumentSettings) -> Self {
        Statement { settings, ..self }
    }

    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    pub fn institution(&self) -> &FinancialInstitution {
        &self.institution
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn ledger_balance(&self) -> &LedgerBalance {
        &self.ledger_balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn day(d: u32) -> OfxDateTime {
        OfxDateTime::from_date(NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
    }

    #[rstest]
    #[case::start_bound(1, true)]
    #[case::inside(15, true)]
    #[case::end_bound(31, true)]
    fn test_range_contains(#[case] d: u32, #[case] expected: bool) {
        let range = DateRange::new(day(1), day(31));
        assert_eq!(range.contains(&day(d)), expected);
    }

    #[test]
    fn test_range_excludes_outside_dates() {
        let range = DateRange::new(day(2), day(30));
        assert!(!range.contains(&day(1)));
        assert!(!range.contains(&day(31)));
    }
}
