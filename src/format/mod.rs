//! Field formatters
//!
//! Pure functions mapping typed values to their OFX text encoding, and the
//! tag writer the serializer drives.
//!
//! # Components
//!
//! - `datetime` - `YYYYMMDD[HHMMSS][.XXX][[offset:TZ]]` encoding and parsing
//! - `amount` - fixed-point amount encoding and parsing
//! - `text` - free-text rules and per-field length limits
//! - `field` - the closed set of field kinds (`FieldValue`)
//! - `tag_writer` - SGML writer enforcing aggregate/leaf asymmetry

pub mod amount;
pub mod datetime;
pub mod field;
pub mod tag_writer;
pub mod text;

pub use amount::{format_amount, parse_amount};
pub use datetime::{format_datetime, parse_datetime};
pub use field::{check_currency, FieldValue};
pub use tag_writer::TagWriter;
pub use text::{check_text, encode_text, limits};
