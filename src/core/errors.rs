//! Error taxonomy for the price-fetch subsystem.
//!
//! Nothing here is fatal: a `SourceUnavailable` is absorbed by the fallback
//! resolver, an `AllSourcesFailed` is absorbed by the batch fetcher (the
//! symbol is simply missing from the result map).

use crate::core::quote::SourceId;
use crate::core::symbol::Symbol;
use thiserror::Error;

/// One provider failed for one symbol on one attempt. All provider-specific
/// errors (network, HTTP status, malformed payload, missing or non-positive
/// price, timeout) are converted into this at the provider boundary.
#[derive(Debug, Clone, Error)]
#[error("{source_id}: {reason}")]
pub struct SourceUnavailable {
    pub source_id: SourceId,
    pub reason: String,
}

impl SourceUnavailable {
    pub fn new(source_id: SourceId, reason: impl Into<String>) -> Self {
        Self {
            source_id,
            reason: reason.into(),
        }
    }
}

/// Every source in the fallback chain failed for one symbol. Carries the
/// per-source reasons for diagnostics.
#[derive(Debug, Error)]
#[error("all price sources failed for {symbol}: [{}]", format_failures(.failures))]
pub struct AllSourcesFailed {
    pub symbol: Symbol,
    pub failures: Vec<SourceUnavailable>,
}

fn format_failures(failures: &[SourceUnavailable]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sources_failed_lists_reasons() {
        let err = AllSourcesFailed {
            symbol: Symbol::new("RELIANCE"),
            failures: vec![
                SourceUnavailable::new(SourceId::Nse, "HTTP 500"),
                SourceUnavailable::new(SourceId::Yahoo, "timed out"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("RELIANCE"));
        assert!(msg.contains("nse: HTTP 500"));
        assert!(msg.contains("yahoo: timed out"));
    }
}
