//! Named relative spans.
//!
//! The history page only accepts absolute `period1`/`period2` bounds, so a
//! span either resolves to bounds before the fetch (`5Y`, `Max`) or is kept
//! as a [`DeferredSpan`] and applied to the fetched series afterwards.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::macros::datetime;
use time::{Date, Duration, Month, OffsetDateTime};
use tracing::debug;

use crate::{RequestError, TimeSeries};

/// Fixed start of the `Max` span.
pub const MAX_HISTORY_START: OffsetDateTime = datetime!(1980-01-01 0:00 UTC);

/// A named relative time window requested instead of explicit dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Span {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDays,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "Max")]
    Max,
}

impl Span {
    pub const ALL: [Self; 8] = [
        Self::OneDay,
        Self::FiveDays,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::YearToDate,
        Self::OneYear,
        Self::FiveYears,
        Self::Max,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::FiveDays => "5D",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::YearToDate => "YTD",
            Self::OneYear => "1Y",
            Self::FiveYears => "5Y",
            Self::Max => "Max",
        }
    }

    /// Split into fetch-time bounds or a post-fetch filter.
    pub fn resolve(self, now: OffsetDateTime) -> SpanResolution {
        match self {
            Self::FiveYears => SpanResolution::Bounds {
                start: now - Duration::days(5 * 365),
                end: now,
            },
            Self::Max => SpanResolution::Bounds {
                start: MAX_HISTORY_START,
                end: now,
            },
            Self::OneDay => SpanResolution::Deferred(DeferredSpan::OneDay),
            Self::FiveDays => SpanResolution::Deferred(DeferredSpan::FiveDays),
            Self::ThreeMonths => SpanResolution::Deferred(DeferredSpan::ThreeMonths),
            Self::SixMonths => SpanResolution::Deferred(DeferredSpan::SixMonths),
            Self::YearToDate => SpanResolution::Deferred(DeferredSpan::YearToDate),
            Self::OneYear => SpanResolution::Deferred(DeferredSpan::OneYear),
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Span {
    type Err = RequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "1D" => Ok(Self::OneDay),
            "5D" => Ok(Self::FiveDays),
            "3M" => Ok(Self::ThreeMonths),
            "6M" => Ok(Self::SixMonths),
            "YTD" => Ok(Self::YearToDate),
            "1Y" => Ok(Self::OneYear),
            "5Y" => Ok(Self::FiveYears),
            "Max" => Ok(Self::Max),
            _ => Err(RequestError::InvalidSpan {
                value: value.to_owned(),
            }),
        }
    }
}

/// Outcome of resolving a [`Span`] against the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanResolution {
    Bounds {
        start: OffsetDateTime,
        end: OffsetDateTime,
    },
    Deferred(DeferredSpan),
}

/// A span applied to the fetched series, relative to its latest date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeferredSpan {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDays,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
}

impl DeferredSpan {
    pub const ALL: [Self; 6] = [
        Self::OneDay,
        Self::FiveDays,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::YearToDate,
        Self::OneYear,
    ];

    pub const fn as_str(self) -> &'static str {
        self.span().as_str()
    }

    pub const fn span(self) -> Span {
        match self {
            Self::OneDay => Span::OneDay,
            Self::FiveDays => Span::FiveDays,
            Self::ThreeMonths => Span::ThreeMonths,
            Self::SixMonths => Span::SixMonths,
            Self::YearToDate => Span::YearToDate,
            Self::OneYear => Span::OneYear,
        }
    }

    /// Earliest date kept when the series ends on `max_date`.
    ///
    /// `None` means the cutoff falls outside the representable calendar
    /// and nothing is excluded.
    pub fn cutoff(self, max_date: Date) -> Option<Date> {
        match self {
            Self::OneDay => Some(max_date),
            Self::FiveDays => max_date.checked_sub(Duration::days(5)),
            Self::ThreeMonths => subtract_months(max_date, 3),
            Self::SixMonths => subtract_months(max_date, 6),
            Self::OneYear => subtract_months(max_date, 12),
            Self::YearToDate => Date::from_calendar_date(max_date.year(), Month::January, 1).ok(),
        }
    }

    /// Restrict `series` to this span. Order is preserved; an empty series
    /// stays empty.
    pub fn apply(self, series: TimeSeries) -> TimeSeries {
        let Some(max_date) = series.max_date() else {
            return series;
        };
        let Some(cutoff) = self.cutoff(max_date) else {
            return series;
        };

        let before = series.len();
        let filtered = series.retain(|point| point.date >= cutoff);
        debug!(
            span = self.as_str(),
            %max_date,
            %cutoff,
            before,
            after = filtered.len(),
            "applied deferred span"
        );
        filtered
    }
}

impl Display for DeferredSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeferredSpan {
    type Err = RequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match Span::from_str(value)?.resolve(OffsetDateTime::UNIX_EPOCH) {
            SpanResolution::Deferred(deferred) => Ok(deferred),
            SpanResolution::Bounds { .. } => Err(RequestError::InvalidSpan {
                value: value.to_owned(),
            }),
        }
    }
}

/// Calendar-aware month subtraction; the day is clamped to the length of
/// the target month (`Mar 31` minus one month is `Feb 28` or `Feb 29`).
pub fn subtract_months(date: Date, months: u32) -> Option<Date> {
    let index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 - i32::try_from(months).ok()?;
    let year = index.div_euclid(12);
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;
    let day = date.day().min(month.length(year));
    Date::from_calendar_date(year, month, day).ok()
}
