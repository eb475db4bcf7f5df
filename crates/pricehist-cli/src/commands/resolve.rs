use pricehist_core::{resolve_request_now, FetchConfig};
use serde_json::json;

use crate::cli::ResolveArgs;
use crate::error::CliError;

use super::{load_request, CommandResult};

pub fn run(args: &ResolveArgs, config: &FetchConfig) -> Result<CommandResult, CliError> {
    let request = load_request(&args.input)?;
    let query = resolve_request_now(&request)?;
    let url = query.history_url(&config.base_url);

    let data = json!({
        "query": query,
        "ticker": query.ticker(),
        "url": url,
    });

    Ok(CommandResult::new(data)
        .with_line("ticker", query.ticker())
        .with_line("frequency", query.frequency.code())
        .with_line("window", format!("{:?}", query.window))
        .with_line("url", url))
}
