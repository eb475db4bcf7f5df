use thiserror::Error;

use pricehist_core::{CoreError, ExportError, RequestError, TableError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("malformed table: {0}")]
    MalformedTable(#[from] TableError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] pricehist_core::FetchError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("request file is not a JSON object: {0}")]
    RequestShape(String),

    #[error("{path}: {message}")]
    Input { path: String, message: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::InvalidRequest(error) => Self::InvalidRequest(error),
            CoreError::MalformedTable(error) => Self::MalformedTable(error),
            CoreError::Fetch(error) => Self::Fetch(error),
            CoreError::Export(error) => Self::Export(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidRequest(_) | Self::RequestShape(_) => 2,
            Self::MalformedTable(_) => 3,
            Self::Fetch(_) => 4,
            Self::Serialization(_) => 5,
            Self::Export(_) | Self::Input { .. } | Self::Io(_) => 10,
        }
    }
}
