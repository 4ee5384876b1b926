//! OFX Statement Generator CLI
//!
//! Command-line interface for converting CSV transaction files into OFX 1.x
//! (SGML) bank statements and for checking existing OFX files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- convert transactions.csv --org "Example Bank" --fid 1001 \
//!     --bank-id 021000021 --account-id 123456 --balance 100.00 \
//!     --balance-date 2024-03-31 > statement.ofx
//! cargo run -- check statement.ofx other.ofx
//! cargo run -- check --strategy sync statement.ofx
//! cargo run -- -vv check --strategy async --max-concurrent 8 *.ofx
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Conversion failed, or at least one checked file failed

use rust_ofx_generator::cli::{self, CheckArgs, Command, ConvertArgs, StrategyType};
use rust_ofx_generator::convert::convert_csv;
use rust_ofx_generator::strategy;
use rust_ofx_generator::types::OfxError;
use std::io::Write;
use std::process;
use tracing::info;

fn main() {
    let args = cli::parse_args();
    cli::init_tracing(args.verbose);

    let result = match &args.command {
        Command::Convert(convert_args) => run_convert(convert_args),
        Command::Check(check_args) => run_check(check_args),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_convert(args: &ConvertArgs) -> Result<bool, OfxError> {
    let template = args.to_template()?;
    let document = convert_csv(&args.input, template)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, document.as_bytes())?;
            info!(output = %path.display(), "Statement written");
        }
        None => std::io::stdout().write_all(document.as_bytes())?,
    }
    Ok(true)
}

fn run_check(args: &CheckArgs) -> Result<bool, OfxError> {
    let config = if args.strategy == StrategyType::Async {
        Some(args.to_batch_config())
    } else {
        None
    };
    let strategy = strategy::create_strategy(args.strategy.clone(), config);

    let mut output = std::io::stdout();
    let summary = strategy.process(&args.paths, &mut output)?;
    info!(
        checked = summary.checked,
        passed = summary.passed,
        failed = summary.failed,
        "Check complete"
    );
    Ok(summary.is_success())
}
