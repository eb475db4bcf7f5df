//! Rendering a [`ResolvedQuery`] into the history page URL.

use crate::{QueryWindow, ResolvedQuery};

/// Default origin of the history page.
pub const DEFAULT_BASE_URL: &str = "https://finance.yahoo.com";

impl ResolvedQuery {
    /// Query string in the data source's convention.
    ///
    /// Bounded windows pass `period1`/`period2`; deferred and unbounded
    /// windows pass only `frequency`.
    pub fn query_string(&self) -> String {
        match self.window {
            QueryWindow::Bounded { period1, period2 } => format!(
                "period1={period1}&period2={period2}&frequency={}",
                self.frequency.code()
            ),
            QueryWindow::Deferred { .. } | QueryWindow::Unbounded => {
                format!("frequency={}", self.frequency.code())
            }
        }
    }

    /// Full history page URL under `base_url`.
    pub fn history_url(&self, base_url: &str) -> String {
        format!(
            "{}/quote/{}/history?{}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(&self.ticker()),
            self.query_string()
        )
    }
}
