use std::str::FromStr;

use pricehist_core::{extract_history_table, normalize_table, DeferredSpan, QueryWindow};
use serde_json::json;
use tracing::info;

use crate::cli::ParseArgs;
use crate::error::CliError;

use super::{read_input, CommandResult};

pub fn run(args: &ParseArgs) -> Result<CommandResult, CliError> {
    let window = match &args.span {
        Some(span) => QueryWindow::Deferred {
            span: DeferredSpan::from_str(span)?,
        },
        None => QueryWindow::Unbounded,
    };

    let page = read_input(&args.html_file)?;
    let table = extract_history_table(&page).ok_or_else(|| CliError::Input {
        path: args.html_file.display().to_string(),
        message: String::from("no history table found"),
    })?;
    info!(rows = table.rows.len(), "table extracted from saved page");

    let (series, report) = normalize_table(&table, window)?;

    let data = json!({
        "report": report,
        "series": series,
    });

    Ok(CommandResult::new(data)
        .with_line("rows", report.total_rows)
        .with_line("dropped", report.dropped_rows())
        .with_line("points", series.len())
        .with_series(series))
}
