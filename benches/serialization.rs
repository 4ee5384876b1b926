//! Benchmark suite for the document pipeline
//!
//! Measures validate, serialize and parse throughput on generated
//! statements using the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```
//!
//! Statements hold 100, 1,000 and 10,000 transactions cycling through
//! debits, credits and checks with optional fields and offsets.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_ofx_generator::types::{
    Account, AccountType, DateRange, FinancialInstitution, LedgerBalance, OfxDateTime, Statement,
    Transaction, TransactionType, UtcOffset,
};
use rust_ofx_generator::{parse, serialize, validate};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

fn main() {
    divan::main();
}

fn generate_statement(size: usize) -> Statement {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let est = UtcOffset::hours(-5, Some("EST")).expect("valid offset");

    let transactions = (0..size)
        .map(|i| {
            let date = start + chrono::Days::new((i % 365) as u64);
            let posted = match i % 3 {
                0 => OfxDateTime::from_date(date),
                _ => OfxDateTime::from_naive(date.and_hms_opt(12, 30, 0).expect("valid time"))
                    .with_offset(est.clone()),
            };
            let (tx_type, cents) = match i % 3 {
                0 => (TransactionType::Debit, -4250),
                1 => (TransactionType::Credit, 200_000),
                _ => (TransactionType::Check, -70_000),
            };
            let tx = Transaction::new(tx_type, posted, Decimal::new(cents, 2), format!("TX{:08}", i))
                .expect("valid transaction");
            match tx_type {
                TransactionType::Check => tx
                    .with_check_number(format!("{}", 1000 + i))
                    .and_then(|tx| tx.with_payee("Landlord"))
                    .expect("valid check"),
                _ => tx.with_memo("Benchmark transaction").expect("valid memo"),
            }
        })
        .collect();

    let end = OfxDateTime::from_date(NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"));
    Statement::new(
        FinancialInstitution::new("Example Bank", "1001", "021000021").expect("valid institution"),
        Account::new("123456", AccountType::Checking, "USD").expect("valid account"),
        DateRange::new(OfxDateTime::from_date(start), end.clone()),
        LedgerBalance::new(Decimal::new(10000, 2), end),
        transactions,
    )
}

/// Benchmark statement validation
#[divan::bench(args = SIZES)]
fn validate_statement(bencher: divan::Bencher, size: usize) {
    let statement = generate_statement(size);
    bencher.bench(|| validate(divan::black_box(&statement)).expect("Validation failed"));
}

/// Benchmark serialization to OFX text
#[divan::bench(args = SIZES)]
fn serialize_statement(bencher: divan::Bencher, size: usize) {
    let statement = generate_statement(size);
    bencher.bench(|| serialize(divan::black_box(&statement)).expect("Serialization failed"));
}

/// Benchmark parsing OFX text back into a statement
#[divan::bench(args = SIZES)]
fn parse_statement(bencher: divan::Bencher, size: usize) {
    let text = serialize(&generate_statement(size)).expect("Serialization failed");
    bencher.bench(|| parse(divan::black_box(&text)).expect("Parsing failed"));
}
