//! Fetch collaborator: download the history page and extract its table.
//!
//! Each [`TableSource::fetch_table`] call opens a [`FetchSession`], a fresh
//! transport with its own cookie jar, and drops it before returning,
//! whether the fetch succeeded or not. No state survives between fetches.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::html::extract_history_table;
use crate::http_client::{HttpClient, HttpConnector, HttpError, HttpRequest, ReqwestConnector};
use crate::{FetchConfig, RawTable, ResolvedQuery};

/// Category of fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The transport could not be built.
    Session,
    /// Connection, timeout, or body read failure.
    Transport,
    /// Non-2xx response.
    Status,
    /// Page downloaded but no history table found.
    MissingTable,
}

/// Structured fetch error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    pub fn session(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Session,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn transport(error: &HttpError) -> Self {
        Self {
            kind: FetchErrorKind::Transport,
            message: error.message().to_owned(),
            retryable: error.retryable(),
        }
    }

    pub fn status(status: u16, url: &str) -> Self {
        Self {
            kind: FetchErrorKind::Status,
            message: format!("history page returned status {status} for {url}"),
            retryable: status == 429 || status >= 500,
        }
    }

    pub fn missing_table(url: &str) -> Self {
        Self {
            kind: FetchErrorKind::MissingTable,
            message: format!("no history table found at {url}"),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Session => "fetch.session",
            FetchErrorKind::Transport => "fetch.transport",
            FetchErrorKind::Status => "fetch.status",
            FetchErrorKind::MissingTable => "fetch.missing_table",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// Anything that can deliver the raw history table for a query.
pub trait TableSource: Send + Sync {
    fn fetch_table<'a>(
        &'a self,
        query: &'a ResolvedQuery,
    ) -> Pin<Box<dyn Future<Output = Result<RawTable, FetchError>> + Send + 'a>>;
}

/// Transport scoped to a single fetch.
pub struct FetchSession {
    client: Box<dyn HttpClient>,
    ticker: String,
}

impl FetchSession {
    pub fn open(
        connector: &dyn HttpConnector,
        config: &FetchConfig,
        ticker: String,
    ) -> Result<Self, FetchError> {
        let client = connector
            .connect(config)
            .map_err(|error| FetchError::session(error.message()))?;
        debug!(%ticker, "fetch session opened");
        Ok(Self { client, ticker })
    }

    pub async fn get_page(&self, url: &str, timeout_ms: u64) -> Result<String, FetchError> {
        let request = HttpRequest::get(url)
            .with_header("accept", "text/html,application/xhtml+xml")
            .with_header("accept-language", "en-US,en;q=0.9")
            .with_timeout_ms(timeout_ms);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|error| FetchError::transport(&error))?;

        if !response.is_success() {
            return Err(FetchError::status(response.status, url));
        }
        Ok(response.body)
    }
}

impl Drop for FetchSession {
    fn drop(&mut self) {
        debug!(ticker = %self.ticker, "fetch session closed");
    }
}

/// History page source over HTTP.
#[derive(Clone)]
pub struct YahooHistorySource {
    config: FetchConfig,
    connector: Arc<dyn HttpConnector>,
}

impl Default for YahooHistorySource {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl YahooHistorySource {
    pub fn new(config: FetchConfig) -> Self {
        Self::with_connector(config, Arc::new(ReqwestConnector))
    }

    pub fn with_connector(config: FetchConfig, connector: Arc<dyn HttpConnector>) -> Self {
        Self { config, connector }
    }

    pub fn history_url(&self, query: &ResolvedQuery) -> String {
        query.history_url(&self.config.base_url)
    }

    async fn download(&self, query: &ResolvedQuery) -> Result<RawTable, FetchError> {
        let url = self.history_url(query);
        let session = FetchSession::open(self.connector.as_ref(), &self.config, query.ticker())?;

        info!(%url, "fetching history page");
        let page = session.get_page(&url, self.config.timeout_ms).await?;
        drop(session);

        let table = extract_history_table(&page).ok_or_else(|| FetchError::missing_table(&url))?;
        debug!(
            headers = table.headers.len(),
            rows = table.rows.len(),
            "history table extracted"
        );
        Ok(table)
    }
}

impl TableSource for YahooHistorySource {
    fn fetch_table<'a>(
        &'a self,
        query: &'a ResolvedQuery,
    ) -> Pin<Box<dyn Future<Output = Result<RawTable, FetchError>> + Send + 'a>> {
        Box::pin(self.download(query))
    }
}
