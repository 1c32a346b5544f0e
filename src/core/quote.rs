//! Price quote type and the provider abstraction

use crate::core::errors::SourceUnavailable;
use crate::core::symbol::Symbol;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identity of the provider that produced a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// Domestic-exchange-specialized source (exchange-native fields).
    Nse,
    /// General-purpose multi-market source (normalized fields).
    Yahoo,
}

impl Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceId::Nse => write!(f, "nse"),
            SourceId::Yahoo => write!(f, "yahoo"),
        }
    }
}

/// A single point-in-time price observation with provenance.
///
/// `change` and `change_percent` are derived from `previous_close` at
/// construction; they are present exactly when `previous_close` is, never
/// zero-filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: f64,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub source: SourceId,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    /// Builds a quote, deriving the change fields. A non-positive
    /// `previous_close` is discarded rather than producing nonsense deltas.
    pub fn new(symbol: Symbol, price: f64, previous_close: Option<f64>, source: SourceId) -> Self {
        let previous_close = previous_close.filter(|p| *p > 0.0);
        let change = previous_close.map(|prev| price - prev);
        let change_percent = previous_close
            .zip(change)
            .map(|(prev, delta)| delta / prev * 100.0);

        Quote {
            symbol,
            price,
            previous_close,
            change,
            change_percent,
            source,
            fetched_at: Utc::now(),
        }
    }
}

/// One external price provider. `fetch` performs a single best-effort
/// network call with a bounded timeout; every provider-specific failure is
/// converted to `SourceUnavailable` at this boundary.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn id(&self) -> SourceId;

    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, SourceUnavailable>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_derived_from_previous_close() {
        let quote = Quote::new(Symbol::new("TCS"), 110.0, Some(100.0), SourceId::Nse);
        assert_eq!(quote.change, Some(10.0));
        assert!((quote.change_percent.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_absent_without_previous_close() {
        let quote = Quote::new(Symbol::new("TCS"), 110.0, None, SourceId::Yahoo);
        assert!(quote.previous_close.is_none());
        assert!(quote.change.is_none());
        assert!(quote.change_percent.is_none());
    }

    #[test]
    fn test_non_positive_previous_close_is_discarded() {
        let quote = Quote::new(Symbol::new("TCS"), 110.0, Some(0.0), SourceId::Yahoo);
        assert!(quote.previous_close.is_none());
        assert!(quote.change.is_none());
    }

    #[test]
    fn test_negative_change() {
        let quote = Quote::new(Symbol::new("TCS"), 90.0, Some(100.0), SourceId::Nse);
        assert_eq!(quote.change, Some(-10.0));
        assert!((quote.change_percent.unwrap() + 10.0).abs() < 1e-9);
    }
}
