//! # Pricehist Core
//!
//! Request resolution and table normalization for price-history pages.
//!
//! ## Overview
//!
//! This crate turns a loosely-typed request into a history page query and
//! the scraped history table into a clean series:
//!
//! - **Request resolution**: symbol validation, exchange and frequency
//!   aliases, explicit date ranges or named spans
//! - **Table normalization**: header matching, date parsing, numeric
//!   cleanup, strict row-drop policy
//! - **Span filtering**: relative spans the source cannot express are
//!   applied after the fetch
//! - **Collaborators**: scoped HTTP fetch, CSV and chart export
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Fetch settings and environment overrides |
//! | [`domain`] | Domain models (Symbol, aliases, PricePoint, TimeSeries) |
//! | [`error`] | Error types |
//! | [`export`] | CSV and candlestick chart sinks |
//! | [`fetch`] | Table source trait and the history page source |
//! | [`html`] | History table extraction from page HTML |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Numeric cell normalizer |
//! | [`pipeline`] | Run orchestration |
//! | [`query`] | History page URL rendering |
//! | [`request`] | Request validation and resolution |
//! | [`span`] | Named spans and the post-fetch filter |
//! | [`table`] | Raw table to series parsing |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use pricehist_core::{CsvSink, FetchConfig, Pipeline, RequestMap, YahooHistorySource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = YahooHistorySource::new(FetchConfig::from_env());
//!     let pipeline = Pipeline::new(Arc::new(source)).with_sink(CsvSink::new("."));
//!
//!     let request: RequestMap = serde_json::from_str(r#"{"symbol": "TCS", "span": "1Y"}"#)?;
//!     let output = pipeline.run_now(&request).await?;
//!     println!("{} rows", output.series.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Request map    │
//! └────────┬────────┘
//!          │ resolve_request
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ ResolvedQuery   │────▶│ TableSource      │──▶ FetchSession (scoped)
//! └─────────────────┘     └────────┬─────────┘
//!                                  │ RawTable
//!                                  ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ DeferredSpan    │◀────│ Table parser     │
//! └────────┬────────┘     └──────────────────┘
//!          │ TimeSeries
//!          ▼
//! ┌─────────────────┐
//! │ SeriesSink(s)   │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every run returns [`CoreError`], whose variants mirror the stages:
//!
//! ```rust
//! use pricehist_core::CoreError;
//!
//! fn exit_code(error: &CoreError) -> u8 {
//!     match error {
//!         CoreError::InvalidRequest(_) => 2,
//!         CoreError::MalformedTable(_) => 3,
//!         CoreError::Fetch(_) => 4,
//!         CoreError::Export(_) => 10,
//!     }
//! }
//! ```
//!
//! Row-level defects are not errors: such rows are dropped and counted in
//! [`ParseReport`].

pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod fetch;
pub mod html;
pub mod http_client;
pub mod normalize;
pub mod pipeline;
pub mod query;
pub mod request;
pub mod span;
pub mod table;

pub use config::FetchConfig;

pub use domain::{Exchange, Frequency, PricePoint, Symbol, TimeSeries};

pub use error::{CoreError, ExportError, RequestError, TableError};

pub use export::{ChartSink, CsvSink, SeriesSink};

pub use fetch::{FetchError, FetchErrorKind, FetchSession, TableSource, YahooHistorySource};

pub use html::extract_history_table;

pub use http_client::{
    HttpClient, HttpConnector, HttpError, HttpRequest, HttpResponse, ReqwestConnector,
    ReqwestHttpClient,
};

pub use normalize::{normalize_number, normalize_volume};

pub use pipeline::{normalize_table, ExportRecord, Pipeline, PipelineOutput};

pub use query::DEFAULT_BASE_URL;

pub use request::{
    resolve_request, resolve_request_now, QueryWindow, RequestMap, RequestMode, ResolvedQuery,
};

pub use span::{DeferredSpan, Span, SpanResolution};

pub use table::{parse_table, parse_table_with_report, ParseReport, RawTable};
