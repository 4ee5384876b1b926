//! Structured writer for SGML-style OFX
//!
//! Aggregates are opened and closed by a single scoped call, so every
//! aggregate gets its closing tag and leaf elements never do.

use super::field::FieldValue;
use crate::types::{Encoding, InvalidFieldError, LineEnding};

/// Builds an OFX document line by line
#[derive(Debug)]
pub struct TagWriter {
    output: String,
    open: Vec<&'static str>,
    newline: &'static str,
    encoding: Encoding,
}

impl TagWriter {
    pub fn new(line_ending: LineEnding, encoding: Encoding) -> Self {
        TagWriter {
            output: String::new(),
            open: Vec::new(),
            newline: line_ending.as_str(),
            encoding,
        }
    }

    /// Write a flat `KEY:VALUE` header line
    pub fn header(&mut self, key: &str, value: &str) {
        debug_assert!(self.open.is_empty(), "header written inside the body");
        self.output.push_str(key);
        self.output.push(':');
        self.output.push_str(value);
        self.output.push_str(self.newline);
    }

    /// Terminate the header block
    pub fn blank_line(&mut self) {
        self.output.push_str(self.newline);
    }

    /// Write `<TAG>`, the body, then `</TAG>`
    pub fn aggregate<F>(&mut self, tag: &'static str, body: F) -> Result<(), InvalidFieldError>
    where
        F: FnOnce(&mut Self) -> Result<(), InvalidFieldError>,
    {
        self.tag_line("<", tag);
        self.open.push(tag);

        body(self)?;

        let closed = self.open.pop();
        debug_assert_eq!(closed, Some(tag));
        self.tag_line("</", tag);
        Ok(())
    }

    /// Write a leaf element `<TAG>value` with no closing tag
    pub fn element(&mut self, tag: &'static str, value: FieldValue<'_>) -> Result<(), InvalidFieldError> {
        let encoded = value.encode(tag, self.encoding)?;
        self.output.push('<');
        self.output.push_str(tag);
        self.output.push('>');
        self.output.push_str(&encoded);
        self.output.push_str(self.newline);
        Ok(())
    }

    /// Write a leaf element only when a value is present
    pub fn optional_element(
        &mut self,
        tag: &'static str,
        value: Option<FieldValue<'_>>,
    ) -> Result<(), InvalidFieldError> {
        match value {
            Some(value) => self.element(tag, value),
            None => Ok(()),
        }
    }

    pub fn finish(self) -> String {
        debug_assert!(self.open.is_empty());
        self.output
    }

    fn tag_line(&mut self, opener: &str, tag: &str) {
        self.output.push_str(opener);
        self.output.push_str(tag);
        self.output.push('>');
        self.output.push_str(self.newline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregates_close_and_elements_do_not() {
        let mut writer = TagWriter::new(LineEnding::Lf, Encoding::UsAscii);
        writer
            .aggregate("STATUS", |w| {
                assert_eq!(w.open, ["STATUS"]);
                w.element("CODE", FieldValue::Token("0"))?;
                w.element("SEVERITY", FieldValue::Token("INFO"))
            })
            .unwrap();

        assert!(writer.open.is_empty());
        assert_eq!(
            writer.finish(),
            "<STATUS>\n<CODE>0\n<SEVERITY>INFO\n</STATUS>\n"
        );
    }

    #[test]
    fn test_header_lines_and_crlf() {
        let mut writer = TagWriter::new(LineEnding::CrLf, Encoding::UsAscii);
        writer.header("OFXHEADER", "100");
        writer.header("DATA", "OFXSGML");
        writer.blank_line();
        assert_eq!(writer.finish(), "OFXHEADER:100\r\nDATA:OFXSGML\r\n\r\n");
    }

    #[test]
    fn test_optional_element_omits_absent_values() {
        let mut writer = TagWriter::new(LineEnding::Lf, Encoding::UsAscii);
        writer.optional_element("MEMO", None).unwrap();
        writer
            .optional_element("NAME", Some(FieldValue::text("Shop", 32)))
            .unwrap();
        assert_eq!(writer.finish(), "<NAME>Shop\n");
    }

    #[test]
    fn test_invalid_value_propagates_out_of_aggregate() {
        let mut writer = TagWriter::new(LineEnding::Lf, Encoding::UsAscii);
        let result = writer.aggregate("STMTTRN", |w| {
            w.element("MEMO", FieldValue::text("bad\nmemo", 255))
        });
        let error = result.unwrap_err();
        assert_eq!(error.field, "MEMO");
    }
}
