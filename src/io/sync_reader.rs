//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over transactions from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize CSV records
//! sequentially, delegating conversion to the csv_format module. Records are
//! processed one at a time without loading the entire file into memory.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<Transaction, OfxError>` for each CSV row:
//!
//! ```no_run
//! use rust_ofx_generator::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("transactions.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(tx) => println!("Read transaction {}", tx.fitid()),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record errors are yielded as Err variants carrying the line

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{OfxError, Transaction};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Synchronous CSV reader
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    headers: csv::StringRecord,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (the optional trailing columns may be missing)
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` or `IoError` if the file could not be opened,
    /// or `CsvError` if the header row is unreadable.
    pub fn new(path: &Path) -> Result<Self, OfxError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => OfxError::file_not_found(&path.display().to_string()),
            _ => OfxError::from(e),
        })?;

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);
        let headers = reader.headers()?.clone();

        Ok(Self { reader, headers })
    }
}

impl Iterator for SyncReader {
    type Item = Result<Transaction, OfxError>;

    /// Read and convert the next record
    ///
    /// Conversion errors are reported with the record's line in the file
    /// (the header is line 1).
    fn next(&mut self) -> Option<Self::Item> {
        let mut record = csv::StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(false) => None,
            Ok(true) => {
                let line = record.position().map(|p| p.line());
                Some(
                    record
                        .deserialize::<CsvRecord>(Some(&self.headers))
                        .map_err(OfxError::from)
                        .and_then(|csv_record| {
                            convert_csv_record(csv_record)
                                .map_err(|e| OfxError::csv_record(line, e.to_string()))
                        }),
                )
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}
