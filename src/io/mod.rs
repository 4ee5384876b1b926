//! I/O module
//!
//! Handles CSV transaction input.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, date formats)
//! - `sync_reader` - Synchronous CSV reader with iterator interface

pub mod csv_format;
pub mod sync_reader;

pub use csv_format::{convert_csv_record, parse_csv_date, CsvRecord};
pub use sync_reader::SyncReader;
