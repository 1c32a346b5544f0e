//! Fallback chain over heterogeneous price sources.

use crate::core::errors::AllSourcesFailed;
use crate::core::quote::{PriceSource, Quote};
use crate::core::symbol::{Market, Symbol};
use std::sync::Arc;
use tracing::debug;

/// Tries sources in a fixed priority order per market classification and
/// returns the first successful quote. One pass only; retry policy, if any,
/// belongs to the caller.
pub struct FallbackResolver {
    domestic: Arc<dyn PriceSource>,
    general: Arc<dyn PriceSource>,
}

impl FallbackResolver {
    pub fn new(domestic: Arc<dyn PriceSource>, general: Arc<dyn PriceSource>) -> Self {
        Self { domestic, general }
    }

    /// Priority order for a symbol: the domestic-specialized source first
    /// for domestic-classified symbols, the general-purpose source always
    /// as the final fallback.
    fn order(&self, symbol: &Symbol) -> Vec<&Arc<dyn PriceSource>> {
        match symbol.market() {
            Market::Domestic => vec![&self.domestic, &self.general],
            Market::Foreign => vec![&self.general],
        }
    }

    pub async fn resolve(&self, symbol: &Symbol) -> Result<Quote, AllSourcesFailed> {
        let mut failures = Vec::new();

        for source in self.order(symbol) {
            match source.fetch(symbol).await {
                Ok(quote) => {
                    debug!("Resolved {symbol} via {}", source.id());
                    return Ok(quote);
                }
                Err(failure) => {
                    debug!("Source {} failed for {symbol}: {}", source.id(), failure);
                    failures.push(failure);
                }
            }
        }

        Err(AllSourcesFailed {
            symbol: symbol.clone(),
            failures,
        })
    }
}
