use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::RequestError;

const MAX_SYMBOL_LEN: usize = 20;

/// Normalized ticker symbol, without the exchange suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol to uppercase.
    pub fn parse(input: &str) -> Result<Self, RequestError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RequestError::MissingSymbol);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(RequestError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        // NSE tickers such as M&M and BAJAJ-AUTO, BSE numeric scrip codes, ^ indices.
        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '&' | '^');
            if !valid {
                return Err(RequestError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = RequestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = RequestError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_symbol() {
        let parsed = Symbol::parse(" reliance ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "RELIANCE");
    }

    #[test]
    fn accepts_exchange_specific_shapes() {
        for raw in ["M&M", "BAJAJ-AUTO", "500325", "^NSEI"] {
            assert!(Symbol::parse(raw).is_ok(), "{raw} should parse");
        }
    }

    #[test]
    fn rejects_blank_symbol() {
        let err = Symbol::parse("   ").expect_err("must fail");
        assert_eq!(err, RequestError::MissingSymbol);
    }

    #[test]
    fn rejects_overlong_symbol() {
        assert!(Symbol::parse(&"A".repeat(20)).is_ok());

        let err = Symbol::parse(&"A".repeat(21)).expect_err("must fail");
        assert_eq!(err, RequestError::SymbolTooLong { len: 21, max: 20 });
    }

    #[test]
    fn rejects_invalid_chars() {
        let err = Symbol::parse("TCS/NS").expect_err("must fail");
        assert!(matches!(err, RequestError::SymbolInvalidChar { ch: '/', .. }));
    }
}
