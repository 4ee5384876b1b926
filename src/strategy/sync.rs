//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of the
//! ProcessingStrategy trait. Files are read, parsed and validated one after
//! another and each report block is written as soon as its file is done.
//!
//! # Memory Efficiency
//!
//! Only one document is held in memory at a time.

use crate::strategy::{check_document, read_error, write_report, CheckSummary, ProcessingStrategy};
use crate::types::OfxError;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use rust_ofx_generator::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::io;
/// use std::path::PathBuf;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// let summary = strategy
///     .process(&[PathBuf::from("statement.ofx")], &mut output)
///     .expect("Processing failed");
/// assert!(summary.is_success());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        inputs: &[PathBuf],
        output: &mut dyn Write,
    ) -> Result<CheckSummary, OfxError> {
        let mut summary = CheckSummary::default();

        for path in inputs {
            debug!(path = %path.display(), "Checking file");
            let outcome = fs::read_to_string(path)
                .map_err(|e| read_error(path, e))
                .and_then(|text| check_document(&text));
            write_report(output, &mut summary, path, &outcome)?;
        }

        Ok(summary)
    }
}
