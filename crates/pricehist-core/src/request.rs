//! Request validation and resolution.
//!
//! A request is a loosely-typed JSON object. [`resolve_request`] validates
//! it in a fixed order (symbol, unknown keys, exchange, frequency, mode)
//! and produces an immutable [`ResolvedQuery`].
//!
//! ```rust
//! use pricehist_core::{resolve_request, QueryWindow, RequestMap};
//! use time::macros::datetime;
//!
//! let raw: RequestMap = serde_json::from_str(r#"{"symbol": "TCS", "span": "YTD"}"#).unwrap();
//! let query = resolve_request(&raw, datetime!(2024-06-15 0:00 UTC)).unwrap();
//! assert_eq!(query.ticker(), "TCS.NS");
//! assert!(matches!(query.window, QueryWindow::Deferred { .. }));
//! ```

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::{debug, warn};

use crate::span::{DeferredSpan, Span, SpanResolution};
use crate::{Exchange, Frequency, RequestError, Symbol};

/// Raw request object as loaded from JSON.
pub type RequestMap = Map<String, Value>;

/// Keys a request may carry.
pub const VALID_KEYS: &[&str] = &[
    "symbol",
    "exchange",
    "frequency",
    "start_date",
    "end_date",
    "span",
];

const REQUEST_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// The three mutually exclusive ways a request can bound its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    ExplicitRange {
        start: OffsetDateTime,
        end: OffsetDateTime,
    },
    NamedSpan(Span),
    Unbounded,
}

impl RequestMode {
    /// Pick the mode by key presence: `start_date`, then `span`, then none.
    pub fn from_request(raw: &RequestMap, now: OffsetDateTime) -> Result<Self, RequestError> {
        if let Some(start_date) = string_field(raw, "start_date")? {
            if raw.contains_key("span") {
                warn!("'span' is ignored when 'start_date' is present");
            }

            let start = parse_request_date("start_date", start_date)?;
            let end_date = string_field(raw, "end_date")?;
            let end = match end_date {
                Some(end_date) => parse_request_date("end_date", end_date)?,
                None => now,
            };
            if end < start {
                return Err(RequestError::InvertedRange {
                    start: start_date.to_owned(),
                    end: end_date.unwrap_or("now").to_owned(),
                });
            }
            return Ok(Self::ExplicitRange { start, end });
        }

        if raw.contains_key("end_date") {
            warn!("'end_date' is ignored without 'start_date'");
        }

        match string_field(raw, "span")? {
            Some(span) => Ok(Self::NamedSpan(Span::from_str(span)?)),
            None => Ok(Self::Unbounded),
        }
    }

    /// Collapse the mode into what the fetch step needs.
    pub fn window(self, now: OffsetDateTime) -> QueryWindow {
        match self {
            Self::ExplicitRange { start, end } => QueryWindow::bounded(start, end),
            Self::NamedSpan(span) => match span.resolve(now) {
                SpanResolution::Bounds { start, end } => QueryWindow::bounded(start, end),
                SpanResolution::Deferred(span) => QueryWindow::Deferred { span },
            },
            Self::Unbounded => QueryWindow::Unbounded,
        }
    }
}

/// Time window of a resolved query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryWindow {
    /// Absolute bounds in Unix epoch seconds, passed as `period1`/`period2`.
    Bounded { period1: i64, period2: i64 },
    /// Full history is fetched, then restricted by the span.
    Deferred { span: DeferredSpan },
    /// Full history, unfiltered.
    Unbounded,
}

impl QueryWindow {
    fn bounded(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self::Bounded {
            period1: start.unix_timestamp(),
            period2: end.unix_timestamp(),
        }
    }

    pub const fn deferred_span(&self) -> Option<DeferredSpan> {
        match self {
            Self::Deferred { span } => Some(*span),
            _ => None,
        }
    }
}

/// Concrete data-source query produced once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedQuery {
    pub symbol: Symbol,
    pub exchange: Exchange,
    pub frequency: Frequency,
    pub window: QueryWindow,
}

impl ResolvedQuery {
    /// Symbol with exchange suffix, e.g. `RELIANCE.NS`.
    pub fn ticker(&self) -> String {
        format!("{}.{}", self.symbol, self.exchange.code())
    }
}

/// Validate `raw` and resolve it against an externally supplied `now`.
pub fn resolve_request(raw: &RequestMap, now: OffsetDateTime) -> Result<ResolvedQuery, RequestError> {
    let symbol = match raw.get("symbol") {
        None | Some(Value::Null) => return Err(RequestError::MissingSymbol),
        Some(Value::String(value)) => Symbol::parse(value)?,
        Some(_) => return Err(RequestError::NotAString { field: "symbol" }),
    };

    let mut unknown: Vec<String> = raw
        .keys()
        .filter(|key| !VALID_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(RequestError::UnknownKeys {
            keys: unknown,
            valid: VALID_KEYS,
        });
    }

    let exchange = string_field(raw, "exchange")?
        .map(Exchange::from_str)
        .transpose()?
        .unwrap_or_default();
    let frequency = string_field(raw, "frequency")?
        .map(Frequency::from_str)
        .transpose()?
        .unwrap_or_default();

    let window = RequestMode::from_request(raw, now)?.window(now);

    let query = ResolvedQuery {
        symbol,
        exchange,
        frequency,
        window,
    };
    debug!(ticker = %query.ticker(), frequency = query.frequency.code(), window = ?query.window, "resolved request");
    Ok(query)
}

/// [`resolve_request`] with the system clock.
pub fn resolve_request_now(raw: &RequestMap) -> Result<ResolvedQuery, RequestError> {
    resolve_request(raw, OffsetDateTime::now_utc())
}

fn string_field<'a>(raw: &'a RequestMap, field: &'static str) -> Result<Option<&'a str>, RequestError> {
    match raw.get(field) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(RequestError::NotAString { field }),
    }
}

/// `YYYY-MM-DD` at midnight UTC.
fn parse_request_date(field: &'static str, value: &str) -> Result<OffsetDateTime, RequestError> {
    Date::parse(value, REQUEST_DATE_FORMAT)
        .map(|date| date.midnight().assume_utc())
        .map_err(|_| RequestError::InvalidDate {
            field,
            value: value.to_owned(),
        })
}
