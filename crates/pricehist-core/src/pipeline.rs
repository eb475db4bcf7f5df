//! Run orchestration: resolve → fetch → parse → filter → export.
//!
//! Stages run strictly in sequence. Request validation happens before the
//! source is touched, so an invalid request never reaches the network.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;

use crate::export::SeriesSink;
use crate::fetch::TableSource;
use crate::request::{resolve_request, RequestMap};
use crate::table::{ParseReport, RawTable};
use crate::{CoreError, QueryWindow, ResolvedQuery, TableError, TimeSeries};

/// One file written by a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    pub sink: &'static str,
    pub path: PathBuf,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub query: ResolvedQuery,
    pub report: ParseReport,
    pub series: TimeSeries,
    pub exports: Vec<ExportRecord>,
}

/// Parse a fetched table and apply the query's deferred span, if any.
pub fn normalize_table(
    table: &RawTable,
    window: QueryWindow,
) -> Result<(TimeSeries, ParseReport), TableError> {
    let (series, report) = table.parse_with_report()?;
    let series = match window.deferred_span() {
        Some(span) => span.apply(series),
        None => series,
    };
    Ok((series, report))
}

pub struct Pipeline {
    source: Arc<dyn TableSource>,
    sinks: Vec<Box<dyn SeriesSink>>,
}

impl Pipeline {
    pub fn new(source: Arc<dyn TableSource>) -> Self {
        Self {
            source,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: impl SeriesSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Run the whole pipeline for `raw`, resolving relative windows
    /// against `now`.
    pub async fn run(&self, raw: &RequestMap, now: OffsetDateTime) -> Result<PipelineOutput, CoreError> {
        let query = resolve_request(raw, now)?;
        info!(ticker = %query.ticker(), frequency = query.frequency.code(), "request resolved");

        let table = self.source.fetch_table(&query).await?;
        info!(rows = table.rows.len(), "table fetched");

        let (series, report) = normalize_table(&table, query.window)?;
        info!(
            kept = report.kept_rows,
            dropped = report.dropped_rows(),
            points = series.len(),
            "table normalized"
        );

        let mut exports = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            let path = sink.publish(&query.symbol, &series)?;
            exports.push(ExportRecord {
                sink: sink.name(),
                path,
            });
        }

        Ok(PipelineOutput {
            query,
            report,
            series,
            exports,
        })
    }

    /// [`Pipeline::run`] against the system clock.
    pub async fn run_now(&self, raw: &RequestMap) -> Result<PipelineOutput, CoreError> {
        self.run(raw, OffsetDateTime::now_utc()).await
    }
}
