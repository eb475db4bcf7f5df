//! CLI argument definitions for pricehist.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fetch` | Resolve a request file, download the history table, export CSV and chart |
//! | `resolve` | Validate a request file and print the resolved query |
//! | `parse` | Extract and normalize a saved history page offline |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--base-url` | `$PRICEHIST_BASE_URL` or Yahoo | History page origin |
//! | `--timeout-ms` | `$PRICEHIST_TIMEOUT_MS` or `10000` | Request timeout in ms |
//! | `-v` | off | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! # Full run, CSV and chart land in ./out
//! pricehist fetch request.json --out-dir out
//!
//! # Check what a request resolves to
//! pricehist resolve request.json --pretty
//!
//! # Re-parse a saved page, keeping only the last three months
//! pricehist parse TCS.html --span 3M --format table
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Price-history scraper.
///
/// Reads a JSON request (symbol, exchange, frequency, and a date range or
/// span), fetches the history table, and writes a CSV snapshot plus a
/// candlestick chart.
#[derive(Debug, Parser)]
#[command(name = "pricehist", author, version, about = "Price-history scraper")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Origin of the history page, overriding PRICEHIST_BASE_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds, overriding PRICEHIST_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Plain text table for terminal display.
    Table,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the whole pipeline for a request file.
    ///
    /// # Examples
    ///
    ///   pricehist fetch request.json
    ///   pricehist fetch request.json --out-dir out --no-chart
    Fetch(FetchArgs),

    /// Validate and resolve a request file without fetching.
    ///
    /// # Examples
    ///
    ///   pricehist resolve request.json --pretty
    Resolve(ResolveArgs),

    /// Parse a saved history page.
    ///
    /// # Examples
    ///
    ///   pricehist parse TCS.html
    ///   pricehist parse TCS.html --span YTD
    Parse(ParseArgs),
}

/// Arguments for the `fetch` command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Path to the JSON request file.
    pub input: PathBuf,

    /// Directory receiving `<SYMBOL>.csv` and `<SYMBOL>.html`.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Skip the CSV snapshot.
    #[arg(long, default_value_t = false)]
    pub no_csv: bool,

    /// Skip the candlestick chart.
    #[arg(long, default_value_t = false)]
    pub no_chart: bool,
}

/// Arguments for the `resolve` command.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Path to the JSON request file.
    pub input: PathBuf,
}

/// Arguments for the `parse` command.
#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Saved history page.
    pub html_file: PathBuf,

    /// Relative span applied after parsing (1D, 5D, 3M, 6M, YTD, 1Y).
    #[arg(long)]
    pub span: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fetch_with_global_flags() {
        let cli = Cli::try_parse_from([
            "pricehist",
            "fetch",
            "request.json",
            "--no-chart",
            "--timeout-ms",
            "2500",
            "-v",
        ])
        .expect("valid args");

        assert!(cli.verbose);
        assert_eq!(cli.timeout_ms, Some(2500));
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert!(args.no_chart);
        assert!(!args.no_csv);
        assert_eq!(args.out_dir, PathBuf::from("."));
    }

    #[test]
    fn parse_accepts_span() {
        let cli = Cli::try_parse_from(["pricehist", "parse", "page.html", "--span", "YTD"])
            .expect("valid args");
        let Command::Parse(args) = cli.command else {
            panic!("expected parse");
        };
        assert_eq!(args.span.as_deref(), Some("YTD"));
    }
}
