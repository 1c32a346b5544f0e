//! Price-fetch orchestration: TTL cache, fallback resolver, batch fan-out.

pub mod batch;
pub mod cache;
pub mod resolver;

use crate::core::config::FetchConfig;
use crate::core::quote::{PriceSource, Quote};
use crate::core::symbol::Symbol;
use batch::BatchFetcher;
use cache::{CacheStats, QuoteCache};
use resolver::FallbackResolver;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Single entry point for all price fetching. Constructed once at startup
/// and passed by reference to consumers; there are no global instances.
pub struct PriceService {
    cache: QuoteCache,
    fetcher: BatchFetcher,
    resolver: Arc<FallbackResolver>,
    deadline: Duration,
}

impl PriceService {
    pub fn new(
        domestic: Arc<dyn PriceSource>,
        general: Arc<dyn PriceSource>,
        config: &FetchConfig,
    ) -> Self {
        let cache = QuoteCache::new(config.cache_ttl_secs);
        let resolver = Arc::new(FallbackResolver::new(domestic, general));
        let fetcher = BatchFetcher::new(Arc::clone(&resolver), cache.clone(), config.workers);
        Self {
            cache,
            fetcher,
            resolver,
            deadline: Duration::from_secs(config.deadline_secs),
        }
    }

    /// Best-effort batch fetch; symbols that could not be priced this round
    /// are absent from the result map.
    pub async fn fetch_all(&self, symbols: &[Symbol]) -> HashMap<Symbol, Quote> {
        self.fetcher.fetch_all(symbols, self.deadline).await
    }

    /// Single-symbol lookup through the same cache and fallback chain.
    pub async fn get_single(&self, symbol: &Symbol) -> Option<Quote> {
        if let Some(quote) = self.cache.get(symbol).await {
            return Some(quote);
        }
        match self.resolver.resolve(symbol).await {
            Ok(quote) => {
                self.cache.put(quote.clone()).await;
                Some(quote)
            }
            Err(err) => {
                debug!("{err}");
                None
            }
        }
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Reconfigures the cache validity window; out-of-range values clamp.
    pub async fn set_cache_ttl_secs(&self, ttl_secs: u64) {
        self.cache.set_ttl_secs(ttl_secs).await;
    }

    pub async fn invalidate_cache(&self) {
        self.cache.invalidate_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quote::SourceId;
    use crate::fetch::resolver::tests::ScriptedSource;

    fn service(nse: Arc<ScriptedSource>, yahoo: Arc<ScriptedSource>) -> PriceService {
        PriceService::new(nse, yahoo, &FetchConfig::default())
    }

    #[tokio::test]
    async fn test_get_single_caches_the_quote() {
        let nse = Arc::new(ScriptedSource::new(SourceId::Nse, &[("TCS", 3500.0)]));
        let yahoo = Arc::new(ScriptedSource::new(SourceId::Yahoo, &[]));
        let service = service(nse.clone(), yahoo);

        let quote = service.get_single(&Symbol::new("TCS")).await.unwrap();
        assert_eq!(quote.price, 3500.0);

        let again = service.get_single(&Symbol::new("TCS")).await.unwrap();
        assert_eq!(again.price, 3500.0);
        assert_eq!(nse.call_count(), 1);
    }

    #[tokio::test]
    async fn test_get_single_returns_none_when_all_sources_fail() {
        let nse = Arc::new(ScriptedSource::new(SourceId::Nse, &[]));
        let yahoo = Arc::new(ScriptedSource::new(SourceId::Yahoo, &[]));
        let service = service(nse, yahoo);

        assert!(service.get_single(&Symbol::new("NOPE")).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_forces_a_refetch() {
        let nse = Arc::new(ScriptedSource::new(SourceId::Nse, &[("TCS", 3500.0)]));
        let yahoo = Arc::new(ScriptedSource::new(SourceId::Yahoo, &[]));
        let service = service(nse.clone(), yahoo);

        service.get_single(&Symbol::new("TCS")).await.unwrap();
        service.invalidate_cache().await;
        service.get_single(&Symbol::new("TCS")).await.unwrap();
        assert_eq!(nse.call_count(), 2);
    }

    #[tokio::test]
    async fn test_cache_stats_reflect_fetches() {
        let nse = Arc::new(ScriptedSource::new(SourceId::Nse, &[("A", 1.0), ("B", 2.0)]));
        let yahoo = Arc::new(ScriptedSource::new(SourceId::Yahoo, &[]));
        let service = service(nse, yahoo);

        service
            .fetch_all(&[Symbol::new("A"), Symbol::new("B")])
            .await;
        let stats = service.cache_stats().await;
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.fresh_entries, 2);
    }
}
