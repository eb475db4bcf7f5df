use std::sync::Arc;

use pricehist_core::{ChartSink, CsvSink, FetchConfig, Pipeline, YahooHistorySource};
use serde_json::json;

use crate::cli::FetchArgs;
use crate::error::CliError;

use super::{load_request, CommandResult};

pub async fn run(args: &FetchArgs, config: FetchConfig) -> Result<CommandResult, CliError> {
    let request = load_request(&args.input)?;
    let base_url = config.base_url.clone();

    let mut pipeline = Pipeline::new(Arc::new(YahooHistorySource::new(config)));
    if !args.no_csv {
        pipeline = pipeline.with_sink(CsvSink::new(&args.out_dir));
    }
    if !args.no_chart {
        pipeline = pipeline.with_sink(ChartSink::new(&args.out_dir));
    }

    let output = pipeline.run_now(&request).await?;
    let url = output.query.history_url(&base_url);

    let data = json!({
        "query": output.query,
        "url": url,
        "report": output.report,
        "points": output.series.len(),
        "first_date": output.series.min_date().map(|date| date.to_string()),
        "last_date": output.series.max_date().map(|date| date.to_string()),
        "exports": output.exports,
    });

    let mut result = CommandResult::new(data)
        .with_line("ticker", output.query.ticker())
        .with_line("url", url)
        .with_line("rows", output.report.total_rows)
        .with_line("dropped", output.report.dropped_rows())
        .with_line("points", output.series.len());
    for export in &output.exports {
        result = result.with_line(export.sink, export.path.display());
    }
    Ok(result)
}
