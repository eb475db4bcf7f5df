//! Raw history table to [`TimeSeries`] conversion.
//!
//! The parser is strict about structure and lenient about content: a row
//! that does not line up with the header, or a table without a single
//! parseable date, is a [`TableError`]; a row with a bad date, a missing
//! number, or a repeated date is dropped and counted in [`ParseReport`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;
use tracing::{debug, warn};

use crate::normalize::{normalize_number, normalize_volume};
use crate::{PricePoint, TableError, TimeSeries};

/// `Jun 14, 2024` / `Jun 4, 2024`.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]");

/// Header and row-cell text as read from the rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn parse(&self) -> Result<TimeSeries, TableError> {
        parse_table(&self.headers, &self.rows)
    }

    pub fn parse_with_report(&self) -> Result<(TimeSeries, ParseReport), TableError> {
        parse_table_with_report(&self.headers, &self.rows)
    }
}

/// Row accounting for one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub unparseable_dates: usize,
    pub incomplete_rows: usize,
    pub duplicate_dates: usize,
}

impl ParseReport {
    pub const fn dropped_rows(&self) -> usize {
        self.unparseable_dates + self.incomplete_rows + self.duplicate_dates
    }
}

/// Parse headers and rows into a series, discarding the report.
pub fn parse_table(headers: &[String], rows: &[Vec<String>]) -> Result<TimeSeries, TableError> {
    parse_table_with_report(headers, rows).map(|(series, _)| series)
}

pub fn parse_table_with_report(
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<(TimeSeries, ParseReport), TableError> {
    let layout = ColumnLayout::locate(headers)?;

    if let Some((row, cells)) = rows
        .iter()
        .enumerate()
        .find(|(_, cells)| cells.len() != headers.len())
    {
        return Err(TableError::ArityMismatch {
            row,
            expected: headers.len(),
            actual: cells.len(),
        });
    }
    if rows.is_empty() {
        return Err(TableError::NoRows);
    }

    let mut report = ParseReport {
        total_rows: rows.len(),
        ..ParseReport::default()
    };
    let mut seen = HashSet::with_capacity(rows.len());
    let mut points = Vec::with_capacity(rows.len());

    for (index, cells) in rows.iter().enumerate() {
        let Some(date) = parse_date(&cells[layout.date]) else {
            debug!(row = index, cell = %cells[layout.date], "dropping row with unparseable date");
            report.unparseable_dates += 1;
            continue;
        };

        let Some(point) = layout.point(date, cells) else {
            debug!(row = index, %date, "dropping row with missing numeric field");
            report.incomplete_rows += 1;
            continue;
        };

        if !seen.insert(date) {
            debug!(row = index, %date, "dropping row with repeated date");
            report.duplicate_dates += 1;
            continue;
        }

        points.push(point);
    }

    if report.unparseable_dates == report.total_rows {
        return Err(TableError::NoParseableDates {
            rows: report.total_rows,
        });
    }

    report.kept_rows = points.len();
    if report.dropped_rows() > 0 {
        warn!(
            total = report.total_rows,
            kept = report.kept_rows,
            unparseable_dates = report.unparseable_dates,
            incomplete = report.incomplete_rows,
            duplicates = report.duplicate_dates,
            "history table rows dropped during normalization"
        );
    }

    Ok((TimeSeries::new(points), report))
}

/// Parse a table date cell such as `Jun 14, 2024`.
pub fn parse_date(cell: &str) -> Option<Date> {
    Date::parse(cell.trim(), DATE_FORMAT).ok()
}

/// Column positions resolved from header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    adj_close: Option<usize>,
    volume: Option<usize>,
}

impl ColumnLayout {
    fn locate(headers: &[String]) -> Result<Self, TableError> {
        if headers.is_empty() {
            return Err(TableError::NoHeaders);
        }

        let required = |column: &'static str| {
            find_column(headers, column).ok_or(TableError::MissingColumn { column })
        };

        Ok(Self {
            date: required("Date")?,
            open: required("Open")?,
            high: required("High")?,
            low: required("Low")?,
            close: required("Close")?,
            adj_close: find_column(headers, "Adj Close"),
            volume: find_column(headers, "Volume"),
        })
    }

    fn point(&self, date: Date, cells: &[String]) -> Option<PricePoint> {
        let number = |index: usize| normalize_number(cells.get(index).map(String::as_str));

        let mut point = PricePoint::new(
            date,
            number(self.open)?,
            number(self.high)?,
            number(self.low)?,
            number(self.close)?,
        );
        if let Some(index) = self.adj_close {
            point = point.with_adj_close(number(index)?);
        }
        if let Some(index) = self.volume {
            point = point.with_volume(normalize_volume(cells.get(index).map(String::as_str))?);
        }
        Some(point)
    }
}

/// Match `name` against header text, tolerating footnote markers
/// (`Close*`, `Adj Close**`) and tooltip text after the label
/// (`Close Close price adjusted for splits.`).
fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|header| {
        let label = header.replace('*', "");
        let label = label.trim();
        label == name
            || label
                .strip_prefix(name)
                .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|label| (*label).to_owned()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| (*cell).to_owned()).collect()
    }

    fn standard_headers() -> Vec<String> {
        headers(&["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"])
    }

    #[test]
    fn parses_dates_in_table_format() {
        assert_eq!(parse_date("Jun 14, 2024"), Some(date!(2024 - 06 - 14)));
        assert_eq!(parse_date("Jun 4, 2024"), Some(date!(2024 - 06 - 04)));
        assert_eq!(parse_date(" sep 30, 2023 "), Some(date!(2023 - 09 - 30)));
        assert_eq!(parse_date("2024-06-14"), None);
        assert_eq!(parse_date("Feb 30, 2024"), None);
    }

    #[test]
    fn normalizes_complete_rows() {
        let rows = vec![row(&[
            "Jun 14, 2024",
            "2,950.00",
            "2,990.50",
            "2,940.10",
            "2,985.35",
            "2,980.00",
            "5,123,456",
        ])];

        let series = parse_table(&standard_headers(), &rows).expect("table should parse");
        let point = &series.points()[0];
        assert_eq!(point.date, date!(2024 - 06 - 14));
        assert_eq!(point.open, 2950.0);
        assert_eq!(point.close, 2985.35);
        assert_eq!(point.adj_close, Some(2980.0));
        assert_eq!(point.volume, Some(5_123_456));
    }

    #[test]
    fn drops_rows_with_any_null_field() {
        let rows = vec![
            row(&["Jun 14, 2024", "10", "11", "9", "10.5", "10.5", "100"]),
            row(&["Jun 13, 2024", "10", "11", "9", "10.5", "10.5", "-"]),
            row(&["Jun 12, 2024", "0.25 Dividend", "", "", "", "", ""]),
        ];

        let (series, report) =
            parse_table_with_report(&standard_headers(), &rows).expect("table should parse");
        assert_eq!(series.len(), 1);
        assert_eq!(report.incomplete_rows, 2);
        assert_eq!(report.kept_rows, 1);
    }

    #[test]
    fn discards_individual_bad_dates() {
        let rows = vec![
            row(&["not a date", "10", "11", "9", "10.5", "10.5", "100"]),
            row(&["Jun 13, 2024", "10", "11", "9", "10.5", "10.5", "100"]),
        ];

        let (series, report) =
            parse_table_with_report(&standard_headers(), &rows).expect("table should parse");
        assert_eq!(series.len(), 1);
        assert_eq!(report.unparseable_dates, 1);
    }

    #[test]
    fn fails_when_no_date_parses() {
        let rows = vec![
            row(&["garbage", "10", "11", "9", "10.5", "10.5", "100"]),
            row(&["", "10", "11", "9", "10.5", "10.5", "100"]),
        ];

        let err = parse_table(&standard_headers(), &rows).expect_err("must fail");
        assert_eq!(err, TableError::NoParseableDates { rows: 2 });
    }

    #[test]
    fn fails_on_arity_mismatch() {
        let rows = vec![row(&["Jun 14, 2024", "10", "11"])];

        let err = parse_table(&standard_headers(), &rows).expect_err("must fail");
        assert_eq!(
            err,
            TableError::ArityMismatch {
                row: 0,
                expected: 7,
                actual: 3
            }
        );
    }

    #[test]
    fn fails_on_missing_required_column() {
        let rows = vec![row(&["Jun 14, 2024", "10", "11", "9"])];

        let err = parse_table(&headers(&["Date", "Open", "High", "Low"]), &rows)
            .expect_err("must fail");
        assert_eq!(err, TableError::MissingColumn { column: "Close" });
    }

    #[test]
    fn tolerates_footnote_and_tooltip_headers() {
        let headers = headers(&[
            "Date",
            "Open",
            "High",
            "Low",
            "Close Close price adjusted for splits.",
            "Adj Close** Adjusted close price adjusted for splits and dividend",
            "Volume",
        ]);
        let rows = vec![row(&["Jun 14, 2024", "10", "11", "9", "10.5", "10.4", "100"])];

        let series = parse_table(&headers, &rows).expect("table should parse");
        assert_eq!(series.points()[0].close, 10.5);
        assert_eq!(series.points()[0].adj_close, Some(10.4));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let headers = headers(&["Date", "Open", "High", "Low", "Close"]);
        let rows = vec![row(&["Jun 14, 2024", "10", "11", "9", "10.5"])];

        let series = parse_table(&headers, &rows).expect("table should parse");
        assert_eq!(series.points()[0].adj_close, None);
        assert_eq!(series.points()[0].volume, None);
    }

    #[test]
    fn preserves_source_order_and_drops_repeated_dates() {
        let rows = vec![
            row(&["Jun 12, 2024", "1", "1", "1", "1", "1", "1"]),
            row(&["Jun 14, 2024", "2", "2", "2", "2", "2", "2"]),
            row(&["Jun 12, 2024", "3", "3", "3", "3", "3", "3"]),
            row(&["Jun 13, 2024", "4", "4", "4", "4", "4", "4"]),
        ];

        let (series, report) =
            parse_table_with_report(&standard_headers(), &rows).expect("table should parse");
        let dates: Vec<_> = series.iter().map(|point| point.date).collect();
        assert_eq!(
            dates,
            vec![date!(2024 - 06 - 12), date!(2024 - 06 - 14), date!(2024 - 06 - 13)]
        );
        assert_eq!(report.duplicate_dates, 1);
    }

    #[test]
    fn reparsing_output_drops_nothing_further() {
        let rows = vec![
            row(&["Jun 14, 2024", "10", "11", "9", "10.5", "10.5", "100"]),
            row(&["Jun 13, 2024", "-", "11", "9", "10.5", "10.5", "100"]),
            row(&["Jun 12, 2024", "10", "11", "9", "10.5", "10.5", "200"]),
        ];
        let series = parse_table(&standard_headers(), &rows).expect("first pass");

        let rendered: Vec<Vec<String>> = series
            .iter()
            .map(|point| {
                vec![
                    format!(
                        "{} {}, {}",
                        &point.date.month().to_string()[..3],
                        point.date.day(),
                        point.date.year()
                    ),
                    point.open.to_string(),
                    point.high.to_string(),
                    point.low.to_string(),
                    point.close.to_string(),
                    point.adj_close.map(|v| v.to_string()).unwrap_or_default(),
                    point.volume.map(|v| v.to_string()).unwrap_or_default(),
                ]
            })
            .collect();

        let (again, report) =
            parse_table_with_report(&standard_headers(), &rendered).expect("second pass");
        assert_eq!(report.dropped_rows(), 0);
        assert_eq!(again, series);
    }
}
