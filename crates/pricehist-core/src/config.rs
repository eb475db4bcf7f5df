use serde::Serialize;

use crate::query::DEFAULT_BASE_URL;

pub const ENV_BASE_URL: &str = "PRICEHIST_BASE_URL";
pub const ENV_USER_AGENT: &str = "PRICEHIST_USER_AGENT";
pub const ENV_TIMEOUT_MS: &str = "PRICEHIST_TIMEOUT_MS";

/// The history page rejects non-browser agents.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Settings of the fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            user_agent: String::from(DEFAULT_USER_AGENT),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl FetchConfig {
    /// Defaults overridden by `PRICEHIST_*` environment variables.
    ///
    /// An unparseable timeout falls back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: lookup(ENV_BASE_URL)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.base_url),
            user_agent: lookup(ENV_USER_AGENT)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            timeout_ms: lookup(ENV_TIMEOUT_MS)
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.timeout_ms),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn environment_overrides_defaults() {
        let env = HashMap::from([
            (ENV_BASE_URL, "http://localhost:9000"),
            (ENV_TIMEOUT_MS, "2500"),
        ]);
        let config = FetchConfig::from_lookup(|name| env.get(name).map(|v| (*v).to_owned()));

        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn bad_timeout_falls_back_to_default() {
        let config = FetchConfig::from_lookup(|name| {
            (name == ENV_TIMEOUT_MS).then(|| String::from("soon"))
        });
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
