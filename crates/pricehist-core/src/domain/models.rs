use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// One row of the history table after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// `None` only when the source table has no adjusted-close column.
    pub adj_close: Option<f64>,
    /// `None` only when the source table has no volume column.
    pub volume: Option<u64>,
}

impl PricePoint {
    pub const fn new(date: Date, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            adj_close: None,
            volume: None,
        }
    }

    pub fn with_adj_close(mut self, adj_close: f64) -> Self {
        self.adj_close = Some(adj_close);
        self
    }

    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// Date-keyed price series in source order.
///
/// Dates are unique; ordering is whatever the source table used (the
/// history page lists newest first) and is never changed by filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: Vec<PricePoint>,
}

impl TimeSeries {
    /// Build a series, keeping the first occurrence of each date.
    pub fn new(points: Vec<PricePoint>) -> Self {
        let mut seen = HashSet::with_capacity(points.len());
        let points = points
            .into_iter()
            .filter(|point| seen.insert(point.date))
            .collect();
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }

    pub fn max_date(&self) -> Option<Date> {
        self.points.iter().map(|point| point.date).max()
    }

    pub fn min_date(&self) -> Option<Date> {
        self.points.iter().map(|point| point.date).min()
    }

    /// Keep the points matching `keep`, preserving order.
    pub fn retain(mut self, keep: impl FnMut(&PricePoint) -> bool) -> Self {
        self.points.retain(keep);
        self
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
