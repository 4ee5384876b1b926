//! Processing strategy module for batch OFX checks
//!
//! This module defines the Strategy pattern for the `check` pipeline: each
//! input file is read, parsed and validated independently and one report
//! block is written per file, in input order. This allows different
//! processing implementations (synchronous, asynchronous batch) to be
//! selected at runtime.

use crate::cli::StrategyType;
use crate::core::{parse, validate, warnings};
use crate::types::{OfxError, ValidationWarning};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for batch OFX checks
pub trait ProcessingStrategy: Send + Sync {
    /// Check every input file and write a report to output
    ///
    /// # Arguments
    ///
    /// * `inputs` - Paths of the OFX files to check
    /// * `output` - Writer receiving one report block per file
    ///
    /// # Errors
    ///
    /// Only fails when the report cannot be written or the strategy cannot
    /// start (e.g. the async runtime). Unreadable or invalid files are
    /// reported as failures in the summary and never abort the batch.
    fn process(&self, inputs: &[PathBuf], output: &mut dyn Write)
        -> Result<CheckSummary, OfxError>;
}

/// Counts for one batch of checked files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub checked: usize,
    pub passed: usize,
    pub failed: usize,
}

impl CheckSummary {
    /// True when every checked file passed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// A document that parsed and validated
#[derive(Debug, Clone, PartialEq)]
pub struct FileCheck {
    pub transactions: usize,
    pub warnings: Vec<ValidationWarning>,
}

/// Parse and validate one OFX document
///
/// # Errors
///
/// Returns the parse error, or every validation error of the statement.
pub fn check_document(text: &str) -> Result<FileCheck, OfxError> {
    let statement = parse(text)?;
    validate(&statement)?;
    Ok(FileCheck {
        transactions: statement.transactions().len(),
        warnings: warnings(&statement),
    })
}

/// Map a failed read of an input file to an application error
pub(crate) fn read_error(path: &Path, error: io::Error) -> OfxError {
    match error.kind() {
        ErrorKind::NotFound => OfxError::file_not_found(&path.display().to_string()),
        _ => OfxError::from(error),
    }
}

/// Write the report block for one file and count it in the summary
pub(crate) fn write_report(
    output: &mut dyn Write,
    summary: &mut CheckSummary,
    path: &Path,
    outcome: &Result<FileCheck, OfxError>,
) -> Result<(), OfxError> {
    summary.checked += 1;
    match outcome {
        Ok(check) => {
            summary.passed += 1;
            writeln!(
                output,
                "{}: OK ({} transactions, {} warnings)",
                path.display(),
                check.transactions,
                check.warnings.len()
            )?;
            for warning in &check.warnings {
                writeln!(output, "  warning: {}", warning)?;
            }
        }
        Err(e) => {
            summary.failed += 1;
            writeln!(output, "{}: FAILED: {}", path.display(), e)?;
        }
    }
    Ok(())
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
