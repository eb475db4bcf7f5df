use std::fmt::Write as _;

use pricehist_core::{PricePoint, TimeSeries};

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&result.data)?
            } else {
                serde_json::to_string(&result.data)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(result)),
    }

    Ok(())
}

fn render_table(result: &CommandResult) -> String {
    let mut out = String::new();
    let width = result
        .summary
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0);
    for (label, value) in &result.summary {
        let _ = writeln!(out, "{label:<width$} : {value}");
    }

    if let Some(series) = &result.series {
        out.push('\n');
        out.push_str(&series_table(series));
    }
    out
}

fn series_table(series: &TimeSeries) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:>12}  {:>12}  {:>12}  {:>12}  {:>12}  {:>14}",
        "Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"
    );
    for point in series {
        let _ = writeln!(out, "{}", series_row(point));
    }
    out
}

fn series_row(point: &PricePoint) -> String {
    let adj_close = point
        .adj_close
        .map(|value| format!("{value:.2}"))
        .unwrap_or_default();
    let volume = point.volume.map(|value| value.to_string()).unwrap_or_default();
    format!(
        "{:<10}  {:>12.2}  {:>12.2}  {:>12.2}  {:>12.2}  {:>12}  {:>14}",
        point.date.to_string(),
        point.open,
        point.high,
        point.low,
        point.close,
        adj_close,
        volume
    )
}
