// CLI module
// Command-line interface, argument parsing and log setup

mod args;

pub use args::{CheckArgs, CliArgs, Command, ConvertArgs, StrategyType};

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Parse command-line arguments using clap
///
/// If parsing fails (e.g., invalid arguments, missing required arguments,
/// or --help flag), clap will automatically display an error message or
/// help text and exit the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Default log filter for a `-v` count
pub fn verbosity_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global tracing subscriber, logging to stderr
///
/// `RUST_LOG` wins over the `-v` count when it is set and valid.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "warn")]
    #[case(1, "info")]
    #[case(2, "debug")]
    #[case(3, "trace")]
    #[case(9, "trace")]
    fn test_verbosity_filter(#[case] verbosity: u8, #[case] expected: &str) {
        assert_eq!(verbosity_filter(verbosity), expected);
    }
}
