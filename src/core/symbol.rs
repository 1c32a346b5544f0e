//! Ticker symbol normalization and market classification

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Exchange suffixes that mark a symbol as domestic (NSE/BSE listed).
const DOMESTIC_SUFFIXES: [&str; 2] = [".NS", ".BO"];

/// Market classification used to pick the first price source to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
    Domestic,
    Foreign,
}

/// A normalized ticker identifier: trimmed, uppercased, with an optional
/// exchange suffix (e.g. `RELIANCE`, `TCS.NS`, `AAPL.US`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Normalizes the raw ticker. Idempotent: normalizing an already
    /// normalized symbol yields the same value.
    pub fn new(raw: &str) -> Self {
        Symbol(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classifies the symbol by its exchange suffix. Unsuffixed symbols are
    /// treated as domestic; this is a heuristic, not a listing guarantee.
    pub fn market(&self) -> Market {
        match self.0.rsplit_once('.') {
            Some((_, suffix)) => {
                let dotted = format!(".{suffix}");
                if DOMESTIC_SUFFIXES.contains(&dotted.as_str()) {
                    Market::Domestic
                } else {
                    Market::Foreign
                }
            }
            None => Market::Domestic,
        }
    }

    /// The ticker without its exchange suffix, as domestic exchange APIs
    /// expect it (`RELIANCE.NS` -> `RELIANCE`).
    pub fn exchange_ticker(&self) -> &str {
        for suffix in DOMESTIC_SUFFIXES {
            if let Some(stripped) = self.0.strip_suffix(suffix) {
                return stripped;
            }
        }
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Symbol::new(raw)
    }
}
