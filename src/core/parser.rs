//! OFX parser
//!
//! Reads an SGML OFX 1.x document back into a [`Statement`]. Used for
//! round-trip verification and for checking existing files.
//!
//! # Design
//!
//! Parsing happens in three passes:
//! - the flat `KEY:VALUE` header block, up to the first `<`
//! - the body, tokenized and built into an element tree by [`super::sgml`]
//! - mapping the tree onto the document model
//!
//! Every error carries the 1-based line it was found on. Tags the model has
//! no place for are skipped (logged at debug level).

use super::sgml::{build_tree, tokenize, Element};
use crate::format::{parse_amount, parse_datetime};
use crate::types::{
    Account, AccountType, Charset, CurrencyCode, DateRange, DocumentSettings, Encoding,
    FinancialInstitution, InvalidFieldError, Language, LedgerBalance, LineEnding, OfxDateTime,
    OfxVersion, ParseError, ParseErrorKind, Statement, Transaction, TransactionType,
};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, warn};

const HEADER_KEYS: [&str; 9] = [
    "OFXHEADER",
    "DATA",
    "VERSION",
    "SECURITY",
    "ENCODING",
    "CHARSET",
    "COMPRESSION",
    "OLDFILEUID",
    "NEWFILEUID",
];

/// Parse an OFX document
///
/// # Errors
///
/// Returns a [`ParseError`] for XML OFX, a malformed or unsupported header,
/// malformed tag nesting, a missing mandatory tag, or an unparsable value.
pub fn parse(text: &str) -> Result<Statement, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some(body_start) = text.find('<') else {
        return Err(ParseError::new(
            newlines(text) + 1,
            ParseErrorKind::MissingBody,
        ));
    };
    let body_line = newlines(&text[..body_start]) + 1;
    if text[body_start..].starts_with("<?") {
        return Err(ParseError::new(body_line, ParseErrorKind::XmlNotSupported));
    }

    let header = Header::parse(&text[..body_start], body_line)?;
    let line_ending = if text.contains("\r\n") {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    };

    let tokens = tokenize(&text[body_start..], body_line)?;
    let root = build_tree(tokens)?;
    let statement = map_statement(&root, header, line_ending)?;

    debug!(
        transactions = statement.transactions().len(),
        "OFX document parsed"
    );
    Ok(statement)
}

fn newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

fn invalid_at(line: usize) -> impl Fn(InvalidFieldError) -> ParseError {
    move |error| ParseError::new(line, ParseErrorKind::InvalidField(error))
}

/// Validated header block
struct Header {
    version: OfxVersion,
    encoding: Encoding,
    charset: Charset,
    old_file_uid: (String, usize),
    new_file_uid: (String, usize),
}

impl Header {
    fn parse(block: &str, body_line: usize) -> Result<Self, ParseError> {
        let mut entries: HashMap<String, (String, usize)> = HashMap::new();

        for (index, raw) in block.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some((key, value)) = trimmed.split_once(':') else {
                return Err(ParseError::new(
                    line,
                    ParseErrorKind::MalformedHeader {
                        text: trimmed.to_string(),
                    },
                ));
            };
            let key = key.trim().to_ascii_uppercase();
            if !HEADER_KEYS.contains(&key.as_str()) {
                debug!(key = %key, line, "Ignoring unknown header");
                continue;
            }
            entries.insert(key, (value.trim().to_string(), line));
        }

        let mut take = |key: &'static str| {
            entries
                .remove(key)
                .ok_or_else(|| ParseError::new(body_line, ParseErrorKind::MissingHeader { key }))
        };

        expect_literal("OFXHEADER", take("OFXHEADER")?, "100")?;
        expect_literal("DATA", take("DATA")?, "OFXSGML")?;
        let version = supported("VERSION", take("VERSION")?)?;
        expect_literal("SECURITY", take("SECURITY")?, "NONE")?;
        let encoding = supported("ENCODING", take("ENCODING")?)?;
        let charset = supported("CHARSET", take("CHARSET")?)?;
        expect_literal("COMPRESSION", take("COMPRESSION")?, "NONE")?;

        Ok(Header {
            version,
            encoding,
            charset,
            old_file_uid: take("OLDFILEUID")?,
            new_file_uid: take("NEWFILEUID")?,
        })
    }
}

fn unsupported(key: &str, value: String, line: usize) -> ParseError {
    ParseError::new(
        line,
        ParseErrorKind::UnsupportedHeader {
            key: key.to_string(),
            value,
        },
    )
}

fn expect_literal(key: &str, entry: (String, usize), expected: &str) -> Result<(), ParseError> {
    let (value, line) = entry;
    if value.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(unsupported(key, value, line))
    }
}

fn supported<T: FromStr>(key: &str, entry: (String, usize)) -> Result<T, ParseError> {
    let (value, line) = entry;
    value.parse().map_err(|_| unsupported(key, value.clone(), line))
}

/// Look up a mandatory aggregate
fn aggregate<'a>(parent: &'a Element, tag: &'static str) -> Result<&'a Element, ParseError> {
    let element = parent.child(tag).ok_or_else(|| missing(parent, tag))?;
    if element.is_aggregate() {
        Ok(element)
    } else {
        Err(ParseError::new(
            element.line,
            ParseErrorKind::ExpectedAggregate {
                tag: tag.to_string(),
            },
        ))
    }
}

/// Look up a mandatory leaf, returning its value and line
fn value<'a>(parent: &'a Element, tag: &'static str) -> Result<(&'a str, usize), ParseError> {
    optional_value(parent, tag)?.ok_or_else(|| missing(parent, tag))
}

fn optional_value<'a>(
    parent: &'a Element,
    tag: &'static str,
) -> Result<Option<(&'a str, usize)>, ParseError> {
    match parent.child(tag) {
        None => Ok(None),
        Some(element) => match element.value() {
            Some(value) => Ok(Some((value, element.line))),
            None => Err(ParseError::new(
                element.line,
                ParseErrorKind::ExpectedElement {
                    tag: tag.to_string(),
                },
            )),
        },
    }
}

fn missing(parent: &Element, tag: &'static str) -> ParseError {
    ParseError::new(
        parent.line,
        ParseErrorKind::MissingTag {
            tag,
            parent: parent.tag.clone(),
        },
    )
}

fn datetime(parent: &Element, tag: &'static str) -> Result<OfxDateTime, ParseError> {
    let (raw, line) = value(parent, tag)?;
    parse_datetime(tag, raw).map_err(invalid_at(line))
}

fn token<T>(parent: &Element, tag: &'static str) -> Result<T, ParseError>
where
    T: FromStr<Err = InvalidFieldError>,
{
    let (raw, line) = value(parent, tag)?;
    raw.parse().map_err(invalid_at(line))
}

fn skip_unknown(parent: &Element, known: &[&str]) {
    for child in parent.children() {
        if !known.contains(&child.tag.as_str()) {
            debug!(tag = %child.tag, parent = %parent.tag, line = child.line, "Ignoring unknown tag");
        }
    }
}

/// Check a `<STATUS>` aggregate, warning on a non-zero code
fn check_status(parent: &Element) -> Result<(), ParseError> {
    let status = aggregate(parent, "STATUS")?;
    let (code, line) = value(status, "CODE")?;
    let code: u32 = code.parse().map_err(|_| {
        invalid_at(line)(InvalidFieldError::new(
            "CODE",
            code,
            "expected a numeric status code",
        ))
    })?;
    if code != 0 {
        let severity = optional_value(status, "SEVERITY")?.map(|(s, _)| s);
        let status_message = optional_value(status, "MESSAGE")?.map(|(m, _)| m);
        warn!(
            code,
            severity,
            status_message,
            aggregate = %parent.tag,
            "Non-zero status in OFX response"
        );
    }
    Ok(())
}

fn map_statement(
    root: &Element,
    header: Header,
    line_ending: LineEnding,
) -> Result<Statement, ParseError> {
    skip_unknown(root, &["SIGNONMSGSRSV1", "BANKMSGSRSV1"]);

    let signon = aggregate(aggregate(root, "SIGNONMSGSRSV1")?, "SONRS")?;
    skip_unknown(signon, &["STATUS", "DTSERVER", "LANGUAGE", "FI"]);
    check_status(signon)?;
    // validated only, the serializer derives DTSERVER from the ledger date
    datetime(signon, "DTSERVER")?;
    let language: Language = token(signon, "LANGUAGE")?;
    let fi = aggregate(signon, "FI")?;
    let (organization, org_line) = value(fi, "ORG")?;
    let (fid, fid_line) = value(fi, "FID")?;

    let trnrs = aggregate(aggregate(root, "BANKMSGSRSV1")?, "STMTTRNRS")?;
    skip_unknown(trnrs, &["TRNUID", "STATUS", "STMTRS"]);
    let (trnuid, trnuid_line) = value(trnrs, "TRNUID")?;
    check_status(trnrs)?;

    let stmtrs = aggregate(trnrs, "STMTRS")?;
    skip_unknown(
        stmtrs,
        &["CURDEF", "BANKACCTFROM", "BANKTRANLIST", "LEDGERBAL"],
    );
    let (currency, _) = value(stmtrs, "CURDEF")?;

    let acct = aggregate(stmtrs, "BANKACCTFROM")?;
    skip_unknown(acct, &["BANKID", "BRANCHID", "ACCTID", "ACCTTYPE"]);
    let (bank_id, bank_id_line) = value(acct, "BANKID")?;
    let institution = FinancialInstitution::new(organization, fid, bank_id).map_err(|e| {
        let line = match e.field.as_str() {
            "ORG" => org_line,
            "FID" => fid_line,
            _ => bank_id_line,
        };
        invalid_at(line)(e)
    })?;
    let (account_id, account_line) = value(acct, "ACCTID")?;
    let account_type: AccountType = token(acct, "ACCTTYPE")?;
    let mut account = Account::new(account_id, account_type, CurrencyCode::new(currency))
        .map_err(invalid_at(account_line))?;
    if let Some((branch, line)) = optional_value(acct, "BRANCHID")? {
        account = account.with_branch_id(branch).map_err(invalid_at(line))?;
    }

    let list = aggregate(stmtrs, "BANKTRANLIST")?;
    skip_unknown(list, &["DTSTART", "DTEND", "STMTTRN"]);
    let range = DateRange::new(datetime(list, "DTSTART")?, datetime(list, "DTEND")?);
    let transactions = list
        .children()
        .iter()
        .filter(|c| c.tag == "STMTTRN")
        .map(map_transaction)
        .collect::<Result<Vec<_>, _>>()?;

    let ledger = aggregate(stmtrs, "LEDGERBAL")?;
    skip_unknown(ledger, &["BALAMT", "DTASOF"]);
    let (balance, balance_line) = value(ledger, "BALAMT")?;
    let ledger_balance = LedgerBalance::new(
        parse_amount("BALAMT", balance).map_err(invalid_at(balance_line))?,
        datetime(ledger, "DTASOF")?,
    );

    let (old_uid, old_line) = &header.old_file_uid;
    let (new_uid, new_line) = &header.new_file_uid;
    let settings = DocumentSettings::default()
        .with_version(header.version)
        .with_encoding(header.encoding)
        .with_charset(header.charset)
        .with_language(language)
        .with_line_ending(line_ending)
        .with_transaction_uid(trnuid)
        .map_err(invalid_at(trnuid_line))?
        .with_file_uids(Some(old_uid.as_str()), Some(new_uid.as_str()))
        .map_err(|e| {
            let line = if e.field == "OLDFILEUID" { *old_line } else { *new_line };
            invalid_at(line)(e)
        })?;

    Ok(Statement::new(institution, account, range, ledger_balance, transactions)
        .with_settings(settings))
}

fn map_transaction(element: &Element) -> Result<Transaction, ParseError> {
    if !element.is_aggregate() {
        return Err(ParseError::new(
            element.line,
            ParseErrorKind::ExpectedAggregate {
                tag: element.tag.clone(),
            },
        ));
    }
    skip_unknown(
        element,
        &[
            "TRNTYPE", "DTPOSTED", "TRNAMT", "FITID", "CHECKNUM", "REFNUM", "NAME", "MEMO",
        ],
    );

    let tx_type: TransactionType = token(element, "TRNTYPE")?;
    let posted = datetime(element, "DTPOSTED")?;
    let (amount, amount_line) = value(element, "TRNAMT")?;
    let amount = parse_amount("TRNAMT", amount).map_err(invalid_at(amount_line))?;
    let (fitid, fitid_line) = value(element, "FITID")?;

    let mut tx = Transaction::new(tx_type, posted, amount, fitid).map_err(invalid_at(fitid_line))?;
    if let Some((check, line)) = optional_value(element, "CHECKNUM")? {
        tx = tx.with_check_number(check).map_err(invalid_at(line))?;
    }
    if let Some((reference, line)) = optional_value(element, "REFNUM")? {
        tx = tx.with_reference_number(reference).map_err(invalid_at(line))?;
    }
    if let Some((payee, line)) = optional_value(element, "NAME")? {
        tx = tx.with_payee(payee).map_err(invalid_at(line))?;
    }
    if let Some((memo, line)) = optional_value(element, "MEMO")? {
        tx = tx.with_memo(memo).map_err(invalid_at(line))?;
    }
    Ok(tx)
}
