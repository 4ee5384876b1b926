//! Document-level settings
//!
//! Values written to the OFX header block and the signon/statement
//! envelopes rather than to the statement body itself.

use super::error::InvalidFieldError;
use crate::format::text::{check_text, limits};
use std::fmt;
use std::str::FromStr;

/// OFX 1.x release written in the header (`VERSION`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OfxVersion {
    #[default]
    V102,
    V103,
    V151,
    V160,
}

impl OfxVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfxVersion::V102 => "102",
            OfxVersion::V103 => "103",
            OfxVersion::V151 => "151",
            OfxVersion::V160 => "160",
        }
    }
}

impl FromStr for OfxVersion {
    type Err = InvalidFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "102" => Ok(OfxVersion::V102),
            "103" => Ok(OfxVersion::V103),
            "151" => Ok(OfxVersion::V151),
            "160" => Ok(OfxVersion::V160),
            other => Err(InvalidFieldError::new(
                "VERSION",
                other,
                "supported SGML versions are 102, 103, 151 and 160",
            )),
        }
    }
}

/// Text encoding declared in the header (`ENCODING`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    UsAscii,
    Utf8,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::UsAscii => "USASCII",
            Encoding::Utf8 => "UTF-8",
        }
    }
}

impl FromStr for Encoding {
    type Err = InvalidFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USASCII" => Ok(Encoding::UsAscii),
            "UTF-8" | "UTF8" | "UNICODE" => Ok(Encoding::Utf8),
            _ => Err(InvalidFieldError::new(
                "ENCODING",
                s,
                "expected USASCII or UTF-8",
            )),
        }
    }
}

/// Character set declared in the header (`CHARSET`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    Windows1252,
    Latin1,
    None,
}

impl Charset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Windows1252 => "1252",
            Charset::Latin1 => "ISO-8859-1",
            Charset::None => "NONE",
        }
    }
}

impl FromStr for Charset {
    type Err = InvalidFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1252" => Ok(Charset::Windows1252),
            "ISO-8859-1" | "8859-1" => Ok(Charset::Latin1),
            "NONE" => Ok(Charset::None),
            _ => Err(InvalidFieldError::new(
                "CHARSET",
                s,
                "expected 1252, ISO-8859-1 or NONE",
            )),
        }
    }
}

/// Response language (ISO 639-2 alpha-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Portuguese,
    Spanish,
    French,
    German,
    Italian,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "ENG",
            Language::Portuguese => "POR",
            Language::Spanish => "SPA",
            Language::French => "FRA",
            Language::German => "DEU",
            Language::Italian => "ITA",
        }
    }
}

impl FromStr for Language {
    type Err = InvalidFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENG" => Ok(Language::English),
            "POR" => Ok(Language::Portuguese),
            "SPA" => Ok(Language::Spanish),
            "FRA" => Ok(Language::French),
            "DEU" => Ok(Language::German),
            "ITA" => Ok(Language::Italian),
            _ => Err(InvalidFieldError::new(
                "LANGUAGE",
                s,
                "expected one of ENG, POR, SPA, FRA, DEU, ITA",
            )),
        }
    }
}

/// Line terminator used for every emitted line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

macro_rules! display_as_token {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_token!(OfxVersion, Encoding, Charset, Language);

/// Header and envelope settings for one document
///
/// Defaults produce an OFX 1.02 USASCII/1252 English document with
/// TRNUID `1` and no file UIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSettings {
    version: OfxVersion,
    encoding: Encoding,
    charset: Charset,
    language: Language,
    transaction_uid: String,
    old_file_uid: Option<String>,
    new_file_uid: Option<String>,
    line_ending: LineEnding,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        DocumentSettings {
            version: OfxVersion::default(),
            encoding: Encoding::default(),
            charset: Charset::default(),
            language: Language::default(),
            transaction_uid: "1".to_string(),
            old_file_uid: None,
            new_file_uid: None,
            line_ending: LineEnding::default(),
        }
    }
}

impl DocumentSettings {
    pub fn with_version(self, version: OfxVersion) -> Self {
        DocumentSettings { version, ..self }
    }

    pub fn with_encoding(self, encoding: Encoding) -> Self {
        DocumentSettings { encoding, ..self }
    }

    pub fn with_charset(self, charset: Charset) -> Self {
        DocumentSettings { charset, ..self }
    }

    pub fn with_language(self, language: Language) -> Self {
        DocumentSettings { language, ..self }
    }

    pub fn with_line_ending(self, line_ending: LineEnding) -> Self {
        DocumentSettings {
            line_ending,
            ..self
        }
    }

    /// Set the TRNUID echoed in the statement response
    pub fn with_transaction_uid(
        self,
        transaction_uid: impl Into<String>,
    ) -> Result<Self, InvalidFieldError> {
        let transaction_uid = transaction_uid.into();
        check_text("TRNUID", &transaction_uid, limits::TRANSACTION_UID)?;
        Ok(DocumentSettings {
            transaction_uid,
            ..self
        })
    }

    /// Set the header OLDFILEUID/NEWFILEUID pair
    ///
    /// `NONE` is the header's own spelling of an absent UID and is stored
    /// as `None`.
    pub fn with_file_uids(
        self,
        old_file_uid: Option<&str>,
        new_file_uid: Option<&str>,
    ) -> Result<Self, InvalidFieldError> {
        Ok(DocumentSettings {
            old_file_uid: file_uid("OLDFILEUID", old_file_uid)?,
            new_file_uid: file_uid("NEWFILEUID", new_file_uid)?,
            ..self
        })
    }

    pub fn version(&self) -> OfxVersion {
        self.version
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn transaction_uid(&self) -> &str {
        &self.transaction_uid
    }

    pub fn old_file_uid(&self) -> Option<&str> {
        self.old_file_uid.as_deref()
    }

    pub fn new_file_uid(&self) -> Option<&str> {
        self.new_file_uid.as_deref()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }
}

fn file_uid(field: &str, value: Option<&str>) -> Result<Option<String>, InvalidFieldError> {
    match value {
        None => Ok(None),
        Some(uid) if uid.eq_ignore_ascii_case("NONE") => Ok(None),
        Some(uid) => {
            check_text(field, uid, limits::FILE_UID)?;
            Ok(Some(uid.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("USASCII", Encoding::UsAscii)]
    #[case("UTF-8", Encoding::Utf8)]
    #[case("utf8", Encoding::Utf8)]
    #[case("UNICODE", Encoding::Utf8)]
    fn test_encoding_from_str(#[case] raw: &str, #[case] expected: Encoding) {
        assert_eq!(raw.parse::<Encoding>().unwrap(), expected);
    }

    #[rstest]
    #[case("ENG", Language::English)]
    #[case("por", Language::Portuguese)]
    #[case(" DEU ", Language::German)]
    fn test_language_from_str(#[case] raw: &str, #[case] expected: Language) {
        assert_eq!(raw.parse::<Language>().unwrap(), expected);
    }

    #[rstest]
    #[case::xml_version("211")]
    #[case::garbage("abc")]
    fn test_version_rejects_unsupported(#[case] raw: &str) {
        let error = raw.parse::<OfxVersion>().unwrap_err();
        assert_eq!(error.field, "VERSION");
    }

    #[test]
    fn test_defaults() {
        let settings = DocumentSettings::default();
        assert_eq!(settings.version(), OfxVersion::V102);
        assert_eq!(settings.encoding(), Encoding::UsAscii);
        assert_eq!(settings.charset(), Charset::Windows1252);
        assert_eq!(settings.language(), Language::English);
        assert_eq!(settings.transaction_uid(), "1");
        assert_eq!(settings.old_file_uid(), None);
        assert_eq!(settings.line_ending(), LineEnding::Lf);
    }

    #[test]
    fn test_file_uid_none_spelling_is_absent() {
        let settings = DocumentSettings::default()
            .with_file_uids(Some("NONE"), Some("20240301-0001"))
            .unwrap();
        assert_eq!(settings.old_file_uid(), None);
        assert_eq!(settings.new_file_uid(), Some("20240301-0001"));
    }

    #[rstest]
    #[case::empty("")]
    #[case::too_long("0123456789012345678901234567890123456")]
    #[case::markup("<1>")]
    fn test_transaction_uid_rejects(#[case] uid: &str) {
        assert!(DocumentSettings::default().with_transaction_uid(uid).is_err());
    }
}
