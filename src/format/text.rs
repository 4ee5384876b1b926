//! Free-text field rules
//!
//! OFX text values are written verbatim, never escaped: strict readers
//! choke on entity references, so unsafe input is rejected instead and the
//! caller is expected to sanitise it.

use crate::types::{Encoding, InvalidFieldError};

/// Maximum lengths, in characters, of the text fields the generator emits
pub mod limits {
    pub const ORGANIZATION: usize = 60;
    pub const FID: usize = 32;
    pub const BANK_ID: usize = 9;
    pub const BRANCH_ID: usize = 22;
    pub const ACCOUNT_ID: usize = 22;
    pub const FITID: usize = 255;
    pub const CHECK_NUMBER: usize = 32;
    pub const REFERENCE_NUMBER: usize = 32;
    pub const PAYEE: usize = 32;
    pub const MEMO: usize = 255;
    pub const TRANSACTION_UID: usize = 36;
    pub const FILE_UID: usize = 36;
}

/// Check a text value against the encoding-independent rules
///
/// The value must be non-empty, at most `max_len` characters, free of
/// control characters (line breaks included), `<` and `&`, and must not
/// start or end with whitespace since SGML readers trim element values.
pub fn check_text(field: &str, value: &str, max_len: usize) -> Result<(), InvalidFieldError> {
    if value.is_empty() {
        return Err(InvalidFieldError::new(field, value, "must not be empty"));
    }

    let length = value.chars().count();
    if length > max_len {
        return Err(InvalidFieldError::new(
            field,
            value,
            format!("is {} characters long, maximum is {}", length, max_len),
        ));
    }

    if let Some(c) = value.chars().find(|c| c.is_control()) {
        let reason = match c {
            '\n' | '\r' => "contains a line break".to_string(),
            _ => format!("contains control character U+{:04X}", c as u32),
        };
        return Err(InvalidFieldError::new(field, value, reason));
    }

    if value.contains('<') {
        return Err(InvalidFieldError::new(field, value, "contains '<'"));
    }
    if value.contains('&') {
        return Err(InvalidFieldError::new(field, value, "contains '&'"));
    }

    if value.trim() != value {
        return Err(InvalidFieldError::new(
            field,
            value,
            "has leading or trailing whitespace",
        ));
    }

    Ok(())
}

/// Check a text value for output under the document's encoding
pub fn encode_text<'a>(
    field: &str,
    value: &'a str,
    max_len: usize,
    encoding: Encoding,
) -> Result<&'a str, InvalidFieldError> {
    check_text(field, value, max_len)?;

    if encoding == Encoding::UsAscii && !value.is_ascii() {
        return Err(InvalidFieldError::new(
            field,
            value,
            "contains non-ASCII characters but the document encoding is USASCII",
        ));
    }

    Ok(value)
}
