//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous, multi-threaded implementation of the
//! ProcessingStrategy trait. Files are read concurrently and checked on the
//! blocking pool, with at most `max_concurrent` files in flight.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (max_concurrent)
//!     ├── tokio::fs (file reads)
//!     ├── spawn_blocking (parse + validate, CPU bound)
//!     └── futures::stream::buffered (bounded, order preserving)
//! ```
//!
//! # Ordering
//!
//! `buffered` yields results in input order even when later files finish
//! first, so the report is identical to the synchronous strategy's.

use crate::strategy::{
    check_document, read_error, write_report, CheckSummary, FileCheck, ProcessingStrategy,
};
use crate::types::OfxError;
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, falling back to the default for zero
    pub fn new(max_concurrent: usize) -> Self {
        let default = Self::default();

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                "Invalid max_concurrent ({}), using default ({})",
                max_concurrent, default.max_concurrent
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self { max_concurrent }
    }

    /// Maximum number of files read and checked concurrently, at least one
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.max(1)
    }
}

/// Asynchronous batch processing strategy
///
/// # Configuration
///
/// The strategy accepts a BatchConfig with:
/// - `max_concurrent`: Files in flight and runtime worker threads (default: CPU cores)
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Check every input on the current runtime
    ///
    /// Returns one outcome per input, in input order.
    pub async fn check_all(&self, inputs: &[PathBuf]) -> Vec<Result<FileCheck, OfxError>> {
        stream::iter(inputs.iter().cloned())
            .map(check_file)
            .buffered(self.config.max_concurrent())
            .collect()
            .await
    }
}

async fn check_file(path: PathBuf) -> Result<FileCheck, OfxError> {
    debug!(path = %path.display(), "Checking file");
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| read_error(&path, e))?;

    tokio::task::spawn_blocking(move || check_document(&text))
        .await
        .map_err(|e| {
            OfxError::runtime(format!("Check of '{}' did not complete: {}", path.display(), e))
        })?
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Check all inputs on a dedicated multi-threaded runtime
    ///
    /// The report is written after every file has been checked.
    ///
    /// # Errors
    ///
    /// Returns a `Runtime` error if the tokio runtime cannot be created, or
    /// an `IoError` if the report cannot be written.
    fn process(
        &self,
        inputs: &[PathBuf],
        output: &mut dyn Write,
    ) -> Result<CheckSummary, OfxError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent())
            .build()
            .map_err(|e| OfxError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

        let outcomes = runtime.block_on(self.check_all(inputs));

        let mut summary = CheckSummary::default();
        for (path, outcome) in inputs.iter().zip(&outcomes) {
            write_report(output, &mut summary, path, outcome)?;
        }
        Ok(summary)
    }
}
