use thiserror::Error;

use crate::fetch::FetchError;

/// Request validation failures. Every variant is an invalid-request condition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("request must contain a non-empty 'symbol'")]
    MissingSymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("incorrect keys: {keys:?}, valid keys: {valid:?}")]
    UnknownKeys {
        keys: Vec<String>,
        valid: &'static [&'static str],
    },
    #[error("field '{field}' must be a string")]
    NotAString { field: &'static str },

    #[error("invalid exchange '{value}', expected one of NSE, BSE")]
    InvalidExchange { value: String },
    #[error("invalid frequency '{value}', expected one of Daily, Weekly, Monthly")]
    InvalidFrequency { value: String },
    #[error("incorrect span '{value}', span should be one of 5Y, Max, 1D, 5D, 3M, 6M, YTD, 1Y")]
    InvalidSpan { value: String },

    #[error("field '{field}' must be a YYYY-MM-DD date: '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("end_date {end} precedes start_date {start}")]
    InvertedRange { start: String, end: String },
}

/// Table structure failures. Every variant is a malformed-table condition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("table has no header cells")]
    NoHeaders,
    #[error("table is missing required column '{column}'")]
    MissingColumn { column: &'static str },
    #[error("row {row} has {actual} cells, header has {expected}")]
    ArityMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("table contains no rows")]
    NoRows,
    #[error("none of the {rows} rows carries a parseable Date")]
    NoParseableDates { rows: usize },
}

/// Export collaborator failures.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("chart serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("date formatting error: {0}")]
    Format(String),
}

/// Top-level error type for a pipeline run.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("malformed table: {0}")]
    MalformedTable(#[from] TableError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

impl CoreError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "request.invalid",
            Self::MalformedTable(_) => "table.malformed",
            Self::Fetch(_) => "fetch.failed",
            Self::Export(_) => "export.failed",
        }
    }
}
