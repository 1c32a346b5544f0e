//! Bounded fan-out/fan-in batch fetching with an overall deadline.

use crate::core::quote::Quote;
use crate::core::symbol::{Market, Symbol};
use crate::fetch::cache::QuoteCache;
use crate::fetch::resolver::FallbackResolver;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

/// Fans out one fetch task per uncached symbol across a bounded worker
/// pool, aggregates whatever completes before the deadline, and writes
/// successes through to the quote cache.
///
/// Best-effort by contract: the result map is a subset of the requested
/// set, every entry is a genuine successful quote, and absence means the
/// price could not be determined this round.
pub struct BatchFetcher {
    resolver: Arc<FallbackResolver>,
    cache: QuoteCache,
    workers: usize,
}

impl BatchFetcher {
    pub fn new(resolver: Arc<FallbackResolver>, cache: QuoteCache, workers: usize) -> Self {
        Self {
            resolver,
            cache,
            workers: workers.max(1),
        }
    }

    pub async fn fetch_all(
        &self,
        symbols: &[Symbol],
        deadline: Duration,
    ) -> HashMap<Symbol, Quote> {
        let mut results = HashMap::new();
        let mut to_fetch = Vec::new();

        // Serve cached symbols immediately; only misses go to the network.
        for symbol in symbols {
            if results.contains_key(symbol) || to_fetch.contains(symbol) {
                continue;
            }
            match self.cache.get(symbol).await {
                Some(quote) => {
                    results.insert(symbol.clone(), quote);
                }
                None => to_fetch.push(symbol.clone()),
            }
        }

        if to_fetch.is_empty() {
            return results;
        }

        let domestic = to_fetch
            .iter()
            .filter(|s| s.market() == Market::Domestic)
            .count();
        debug!(
            "Batch fetching {} symbols ({} domestic, {} foreign), {} cached",
            to_fetch.len(),
            domestic,
            to_fetch.len() - domestic,
            results.len()
        );

        let cutoff = Instant::now() + deadline;
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks: JoinSet<(Symbol, Option<Quote>)> = JoinSet::new();

        for symbol in to_fetch {
            let resolver = Arc::clone(&self.resolver);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (symbol, None),
                };
                match resolver.resolve(&symbol).await {
                    Ok(quote) => (symbol, Some(quote)),
                    Err(err) => {
                        debug!("{err}");
                        (symbol, None)
                    }
                }
            });
        }

        // Fan-in, order-independent. Write-through happens here rather than
        // inside the tasks so results landing after the cutoff are discarded
        // along with their cache update.
        while !tasks.is_empty() {
            match timeout_at(cutoff, tasks.join_next()).await {
                Ok(Some(Ok((symbol, Some(quote))))) => {
                    self.cache.put(quote.clone()).await;
                    results.insert(symbol, quote);
                }
                Ok(Some(Ok((_, None)))) => {}
                Ok(Some(Err(join_err))) => {
                    warn!("Fetch task panicked: {join_err}");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!("Batch deadline exceeded, abandoning {} tasks", tasks.len());
                    tasks.abort_all();
                    break;
                }
            }
        }

        results
    }
}
