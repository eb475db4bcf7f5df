mod fetch;
mod parse;
mod resolve;

use std::fs;
use std::path::Path;

use pricehist_core::{FetchConfig, RequestMap, TimeSeries};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub summary: Vec<(&'static str, String)>,
    pub series: Option<TimeSeries>,
}

impl CommandResult {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            summary: Vec::new(),
            series: None,
        }
    }

    pub fn with_line(mut self, label: &'static str, value: impl ToString) -> Self {
        self.summary.push((label, value.to_string()));
        self
    }

    pub fn with_series(mut self, series: TimeSeries) -> Self {
        self.series = Some(series);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let config = fetch_config(cli);

    match &cli.command {
        Command::Fetch(args) => fetch::run(args, config).await,
        Command::Resolve(args) => resolve::run(args, &config),
        Command::Parse(args) => parse::run(args),
    }
}

/// Environment first, then explicit flags.
fn fetch_config(cli: &Cli) -> FetchConfig {
    let mut config = FetchConfig::from_env();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    config
}

fn load_request(path: &Path) -> Result<RequestMap, CliError> {
    let text = read_input(path)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map),
        other => Err(CliError::RequestShape(format!(
            "{} holds a JSON {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

fn read_input(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|error| CliError::Input {
        path: path.display().to_string(),
        message: error.to_string(),
    })
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
