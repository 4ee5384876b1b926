//! Core OFX logic
//!
//! This module contains the pure document pipeline:
//! - `validator` - statement-level invariants, accumulated
//! - `serializer` - statement to SGML OFX text
//! - `sgml` - SGML body tokenizer and element tree
//! - `parser` - SGML OFX text back to a statement
//!
//! Nothing here performs I/O or keeps state between calls, so every
//! function is safe to call concurrently on distinct statements.

pub mod parser;
pub mod serializer;
pub mod sgml;
pub mod validator;

pub use parser::parse;
pub use serializer::serialize;
pub use validator::{validate, warnings};
