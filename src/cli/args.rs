use crate::convert::StatementTemplate;
use crate::format::parse_amount;
use crate::io::parse_csv_date;
use crate::strategy::BatchConfig;
use crate::types::{
    Account, AccountType, Charset, DocumentSettings, Encoding, FinancialInstitution,
    InvalidFieldError, Language, LedgerBalance, LineEnding, OfxDateTime, OfxVersion,
};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Generate and check OFX 1.x (SGML) bank statements
#[derive(Parser, Debug)]
#[command(name = "ofx-generator")]
#[command(about = "Generate and check OFX 1.x (SGML) bank statements", long_about = None)]
pub struct CliArgs {
    /// Log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a CSV transaction file into an OFX statement
    Convert(ConvertArgs),
    /// Parse and validate OFX statement files
    Check(CheckArgs),
}

/// Statement metadata and input for `convert`
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input CSV file path containing transaction records
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input: PathBuf,

    /// Institution name (ORG)
    #[arg(long, value_name = "NAME")]
    pub org: String,

    /// Financial institution id (FID)
    #[arg(long, value_name = "ID")]
    pub fid: String,

    /// Bank routing number (BANKID)
    #[arg(long = "bank-id", value_name = "ID")]
    pub bank_id: String,

    /// Branch identifier (BRANCHID)
    #[arg(long = "branch-id", value_name = "ID")]
    pub branch_id: Option<String>,

    /// Account number (ACCTID)
    #[arg(long = "account-id", value_name = "ID")]
    pub account_id: String,

    #[arg(
        long = "account-type",
        value_name = "TYPE",
        default_value = "CHECKING",
        help = "CHECKING, SAVINGS, CREDITLINE, MONEYMRKT or CD"
    )]
    pub account_type: AccountType,

    /// ISO 4217 currency code (CURDEF)
    #[arg(long, value_name = "CODE", default_value = "USD")]
    pub currency: String,

    /// Ledger balance amount (BALAMT)
    #[arg(long, value_name = "AMOUNT", value_parser = parse_balance, allow_hyphen_values = true)]
    pub balance: Decimal,

    /// Ledger balance date (DTASOF), also written as DTSERVER
    #[arg(long = "balance-date", value_name = "DATE", value_parser = parse_csv_date)]
    pub balance_date: OfxDateTime,

    /// Statement start (default: earliest posted date)
    #[arg(long, value_name = "DATE", value_parser = parse_csv_date)]
    pub start: Option<OfxDateTime>,

    /// Statement end (default: latest posted date)
    #[arg(long, value_name = "DATE", value_parser = parse_csv_date)]
    pub end: Option<OfxDateTime>,

    /// Client transaction UID echoed in the response
    #[arg(long, value_name = "UID", default_value = "1")]
    pub trnuid: String,

    #[arg(long = "ofx-version", value_name = "VERSION", default_value = "102")]
    pub ofx_version: OfxVersion,

    #[arg(long, value_name = "LANG", default_value = "ENG")]
    pub language: Language,

    #[arg(long, value_name = "ENCODING", default_value = "USASCII")]
    pub encoding: Encoding,

    /// Header CHARSET (default: 1252 for USASCII, NONE for UTF-8)
    #[arg(long, value_name = "CHARSET")]
    pub charset: Option<Charset>,

    /// Terminate lines with CRLF instead of LF
    #[arg(long)]
    pub crlf: bool,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,
}

/// Input files and processing options for `check`
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// OFX files to check
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Processing strategy to use for checking files
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for concurrent checks"
    )]
    pub strategy: StrategyType,

    /// Maximum number of files checked concurrently (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of files checked concurrently (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,
}

/// Available processing strategies for batch checks
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

fn parse_balance(raw: &str) -> Result<Decimal, InvalidFieldError> {
    parse_amount("balance", raw)
}

impl ConvertArgs {
    /// Build the statement template from the metadata flags
    ///
    /// # Errors
    ///
    /// Returns the first identifier or TRNUID that fails its field rules.
    pub fn to_template(&self) -> Result<StatementTemplate, InvalidFieldError> {
        let institution = FinancialInstitution::new(&self.org, &self.fid, &self.bank_id)?;

        let mut account =
            Account::new(&self.account_id, self.account_type, self.currency.as_str())?;
        if let Some(branch_id) = &self.branch_id {
            account = account.with_branch_id(branch_id)?;
        }

        let charset = self.charset.unwrap_or(match self.encoding {
            Encoding::UsAscii => Charset::Windows1252,
            Encoding::Utf8 => Charset::None,
        });
        let line_ending = if self.crlf {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        };
        let settings = DocumentSettings::default()
            .with_version(self.ofx_version)
            .with_encoding(self.encoding)
            .with_charset(charset)
            .with_language(self.language)
            .with_line_ending(line_ending)
            .with_transaction_uid(&self.trnuid)?;

        Ok(StatementTemplate {
            institution,
            account,
            ledger_balance: LedgerBalance::new(self.balance, self.balance_date.clone()),
            start: self.start.clone(),
            end: self.end.clone(),
            settings,
        })
    }
}

impl CheckArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Zero falls back to the default with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        match self.max_concurrent {
            Some(max_concurrent) => BatchConfig::new(max_concurrent),
            None => BatchConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const CONVERT: [&str; 13] = [
        "program",
        "convert",
        "input.csv",
        "--org",
        "Example Bank",
        "--fid",
        "1001",
        "--bank-id",
        "021000021",
        "--account-id",
        "123456",
        "--balance",
        "100.00",
    ];

    fn convert_args(extra: &[&str]) -> Result<ConvertArgs, clap::Error> {
        let args: Vec<&str> = CONVERT
            .iter()
            .copied()
            .chain(["--balance-date", "2024-03-02"])
            .chain(extra.iter().copied())
            .collect();
        match CliArgs::try_parse_from(args)?.command {
            Command::Convert(args) => Ok(args),
            other => panic!("Expected convert, got {:?}", other),
        }
    }

    fn check_args(args: &[&str]) -> Result<CheckArgs, clap::Error> {
        match CliArgs::try_parse_from(args)?.command {
            Command::Check(args) => Ok(args),
            other => panic!("Expected check, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_defaults() {
        let args = convert_args(&[]).unwrap();
        assert_eq!(args.account_type, AccountType::Checking);
        assert_eq!(args.currency, "USD");
        assert_eq!(args.trnuid, "1");
        assert_eq!(args.balance, Decimal::new(10000, 2));
        assert!(!args.crlf);
        assert_eq!(args.output, None);

        let template = args.to_template().unwrap();
        assert_eq!(template.settings, DocumentSettings::default());
        assert_eq!(template.account.branch_id(), None);
        assert_eq!(template.start, None);
    }

    #[test]
    fn test_convert_all_options() {
        let args = convert_args(&[
            "--branch-id",
            "0042",
            "--account-type",
            "savings",
            "--currency",
            "EUR",
            "--start",
            "2024-03-01",
            "--end",
            "2024-03-31",
            "--trnuid",
            "abc-1",
            "--language",
            "fra",
            "--encoding",
            "UTF-8",
            "--crlf",
            "--output",
            "out.ofx",
        ])
        .unwrap();
        let template = args.to_template().unwrap();

        assert_eq!(template.account.branch_id(), Some("0042"));
        assert_eq!(template.account.account_type(), AccountType::Savings);
        assert_eq!(template.account.currency().as_str(), "EUR");
        assert_eq!(template.settings.language(), Language::French);
        assert_eq!(template.settings.encoding(), Encoding::Utf8);
        assert_eq!(template.settings.charset(), Charset::None);
        assert_eq!(template.settings.line_ending(), LineEnding::CrLf);
        assert_eq!(template.settings.transaction_uid(), "abc-1");
        assert!(template.start.is_some() && template.end.is_some());
        assert_eq!(args.output, Some(PathBuf::from("out.ofx")));
    }

    #[test]
    fn test_convert_negative_balance() {
        let mut args: Vec<&str> = CONVERT.to_vec();
        args[12] = "-25.10";
        args.extend(["--balance-date", "2024-03-02"]);
        match CliArgs::try_parse_from(args).unwrap().command {
            Command::Convert(args) => assert_eq!(args.balance, Decimal::new(-2510, 2)),
            other => panic!("Expected convert, got {:?}", other),
        }
    }

    #[rstest]
    #[case::invalid_account_type(&["--account-type", "brokerage"])]
    #[case::invalid_language(&["--language", "klingon"])]
    #[case::invalid_encoding(&["--encoding", "EBCDIC"])]
    #[case::invalid_date(&["--start", "03/01/2024"])]
    fn test_convert_rejects_invalid_tokens(#[case] extra: &[&str]) {
        assert!(convert_args(extra).is_err());
    }

    #[test]
    fn test_convert_defers_currency_check() {
        // currency shape is a validation error, reported with the statement
        let template = convert_args(&["--currency", "usd"])
            .unwrap()
            .to_template()
            .unwrap();
        assert!(!template.account.currency().is_well_formed());
    }

    #[rstest]
    #[case::bank_id(&["--bank-id", "02-100"])]
    #[case::trnuid(&["--trnuid", "a<b"])]
    fn test_to_template_rejects_invalid_identifiers(#[case] extra: &[&str]) {
        assert!(convert_args(extra).unwrap().to_template().is_err());
    }

    #[test]
    fn test_verbose_counts() {
        let args = CliArgs::try_parse_from(["program", "-vv", "check", "a.ofx"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    // Strategy parsing tests
    #[rstest]
    #[case::default_strategy(&["program", "check", "a.ofx"], StrategyType::Async)]
    #[case::explicit_sync(&["program", "check", "--strategy", "sync", "a.ofx"], StrategyType::Sync)]
    #[case::explicit_async(&["program", "check", "--strategy", "async", "a.ofx"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        assert_eq!(check_args(args).unwrap().strategy, expected);
    }

    #[test]
    fn test_check_multiple_paths() {
        let args = check_args(&["program", "check", "a.ofx", "b.ofx", "c.ofx"]).unwrap();
        assert_eq!(args.paths.len(), 3);
    }

    // BatchConfig conversion tests
    #[rstest]
    #[case::default(&["program", "check", "a.ofx"], num_cpus::get())]
    #[case::custom(&["program", "check", "--max-concurrent", "8", "a.ofx"], 8)]
    #[case::zero_falls_back(&["program", "check", "--max-concurrent", "0", "a.ofx"], num_cpus::get())]
    fn test_batch_config_conversion(#[case] args: &[&str], #[case] expected: usize) {
        let config = check_args(args).unwrap().to_batch_config();
        assert_eq!(config.max_concurrent(), expected);
    }

    // Error handling tests
    #[rstest]
    #[case::missing_command(&["program"])]
    #[case::missing_paths(&["program", "check"])]
    #[case::invalid_strategy(&["program", "check", "--strategy", "invalid", "a.ofx"])]
    #[case::convert_missing_metadata(&["program", "convert", "input.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
