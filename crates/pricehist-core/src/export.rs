//! Export collaborators: CSV snapshot and candlestick chart.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;
use tracing::info;

use crate::{ExportError, PricePoint, Symbol, TimeSeries};

/// Column order of the CSV snapshot.
pub const CSV_HEADERS: [&str; 7] = ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"];

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A destination for a finished series.
pub trait SeriesSink: Send + Sync {
    /// Short name used in logs and run summaries.
    fn name(&self) -> &'static str;

    /// Write `series` for `symbol`, returning the file written.
    fn publish(&self, symbol: &Symbol, series: &TimeSeries) -> Result<PathBuf, ExportError>;
}

/// Writes `<dir>/<SYMBOL>.csv`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

#[derive(Serialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    adj_close: Option<f64>,
    volume: Option<u64>,
}

impl CsvRow {
    fn from_point(point: &PricePoint) -> Result<Self, ExportError> {
        Ok(Self {
            date: format_date(point.date)?,
            open: point.open,
            high: point.high,
            low: point.low,
            close: point.close,
            adj_close: point.adj_close,
            volume: point.volume,
        })
    }
}

impl SeriesSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn publish(&self, symbol: &Symbol, series: &TimeSeries) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(symbol);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(CSV_HEADERS)?;
        for point in series {
            writer.serialize(CsvRow::from_point(point)?)?;
        }
        writer.flush()?;

        info!(path = %path.display(), rows = series.len(), "csv written");
        Ok(path)
    }
}

/// Writes `<dir>/<SYMBOL>.html`, a standalone plotly candlestick page.
#[derive(Debug, Clone)]
pub struct ChartSink {
    dir: PathBuf,
}

impl ChartSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.dir.join(format!("{symbol}.html"))
    }
}

impl SeriesSink for ChartSink {
    fn name(&self) -> &'static str {
        "chart"
    }

    fn publish(&self, symbol: &Symbol, series: &TimeSeries) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(symbol);
        write_chart(&path, symbol, series)?;
        info!(path = %path.display(), points = series.len(), "chart written");
        Ok(path)
    }
}

fn write_chart(path: &Path, symbol: &Symbol, series: &TimeSeries) -> Result<(), ExportError> {
    fs::write(path, render_chart(symbol, series)?)?;
    Ok(())
}

/// Standalone HTML document drawing `series` as a candlestick.
pub fn render_chart(symbol: &Symbol, series: &TimeSeries) -> Result<String, ExportError> {
    let dates = series
        .iter()
        .map(|point| format_date(point.date))
        .collect::<Result<Vec<_>, _>>()?;

    let trace = json!({
        "type": "candlestick",
        "x": dates,
        "open": series.iter().map(|p| p.open).collect::<Vec<_>>(),
        "high": series.iter().map(|p| p.high).collect::<Vec<_>>(),
        "low": series.iter().map(|p| p.low).collect::<Vec<_>>(),
        "close": series.iter().map(|p| p.close).collect::<Vec<_>>(),
    });
    let layout = json!({
        "title": { "text": symbol.as_str() },
        "yaxis": { "title": { "text": "Stock Price" } },
        "xaxis": { "title": { "text": "Date" } },
    });

    // "</" inside a <script> would end it early.
    let data = serde_json::to_string(&[trace])?.replace("</", "<\\/");
    let layout = serde_json::to_string(&layout)?.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{symbol}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:100vh;"></div>
<script>
Plotly.newPlot("chart", {data}, {layout});
</script>
</body>
</html>
"#
    ))
}

fn format_date(date: Date) -> Result<String, ExportError> {
    date.format(ISO_DATE)
        .map_err(|error| ExportError::Format(error.to_string()))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn series() -> TimeSeries {
        TimeSeries::new(vec![
            PricePoint::new(date!(2024 - 06 - 14), 10.0, 12.0, 9.5, 11.0)
                .with_adj_close(10.8)
                .with_volume(1_200),
            PricePoint::new(date!(2024 - 06 - 13), 9.0, 10.5, 8.75, 10.0),
        ])
    }

    #[test]
    fn chart_carries_title_axes_and_ohlc() {
        let symbol = Symbol::parse("TCS").expect("symbol");
        let html = render_chart(&symbol, &series()).expect("render");

        assert!(html.contains("<title>TCS</title>"));
        assert!(html.contains(r#""type":"candlestick""#));
        assert!(html.contains(r#""x":["2024-06-14","2024-06-13"]"#));
        assert!(html.contains(r#""low":[9.5,8.75]"#));
        assert!(html.contains("Stock Price"));
        assert!(html.contains(PLOTLY_CDN));
    }

    #[test]
    fn csv_leaves_missing_optionals_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let symbol = Symbol::parse("TCS").expect("symbol");

        let path = CsvSink::new(dir.path())
            .publish(&symbol, &series())
            .expect("publish");
        let text = fs::read_to_string(path).expect("read");

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Open,High,Low,Close,Adj Close,Volume");
        assert_eq!(lines[1], "2024-06-14,10.0,12.0,9.5,11.0,10.8,1200");
        assert_eq!(lines[2], "2024-06-13,9.0,10.5,8.75,10.0,,");
    }
}
