//! Time-bound in-memory quote cache.
//!
//! Expiry is lazy: stale entries are reported as misses and overwritten by
//! the next successful fetch. The symbol set is bounded by portfolio size,
//! so memory is never reclaimed proactively.

use crate::core::quote::Quote;
use crate::core::symbol::Symbol;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Bounds for the configurable validity window, in seconds.
pub const MIN_TTL_SECS: u64 = 10;
pub const MAX_TTL_SECS: u64 = 300;
pub const DEFAULT_TTL_SECS: u64 = 60;

struct CacheEntry {
    quote: Quote,
    inserted_at: Instant,
}

/// Snapshot of cache occupancy, reported on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Entries currently within the validity window.
    pub fresh_entries: usize,
    /// All entries, including lazily expired ones.
    pub total_entries: usize,
    pub ttl: Duration,
}

#[derive(Clone)]
pub struct QuoteCache {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    entries: HashMap<Symbol, CacheEntry>,
    ttl: Duration,
}

impl QuoteCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                ttl: Duration::from_secs(clamp_ttl_secs(ttl_secs)),
            })),
        }
    }

    /// Pure time-based lookup: a hit is an entry younger than the TTL.
    pub async fn get(&self, symbol: &Symbol) -> Option<Quote> {
        let inner = self.inner.lock().await;
        match inner.entries.get(symbol) {
            Some(entry) if entry.inserted_at.elapsed() < inner.ttl => {
                debug!("Cache HIT for {symbol}");
                Some(entry.quote.clone())
            }
            Some(_) => {
                debug!("Cache EXPIRED for {symbol}");
                None
            }
            None => {
                debug!("Cache MISS for {symbol}");
                None
            }
        }
    }

    /// Unconditional overwrite; the entry is replaced, never merged.
    pub async fn put(&self, quote: Quote) {
        let mut inner = self.inner.lock().await;
        debug!("Cache PUT for {}", quote.symbol);
        inner.entries.insert(
            quote.symbol.clone(),
            CacheEntry {
                quote,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn invalidate_all(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        debug!("Cache CLEAR");
    }

    /// Reconfigures the validity window, clamping out-of-range values.
    pub async fn set_ttl_secs(&self, ttl_secs: u64) {
        let mut inner = self.inner.lock().await;
        inner.ttl = Duration::from_secs(clamp_ttl_secs(ttl_secs));
    }

    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        let fresh_entries = inner
            .entries
            .values()
            .filter(|e| e.inserted_at.elapsed() < inner.ttl)
            .count();
        CacheStats {
            fresh_entries,
            total_entries: inner.entries.len(),
            ttl: inner.ttl,
        }
    }

    /// Sets a raw TTL below the clamp floor so expiry tests stay fast.
    #[cfg(test)]
    pub(crate) async fn set_ttl_for_test(&self, ttl: Duration) {
        let mut inner = self.inner.lock().await;
        inner.ttl = ttl;
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECS)
    }
}

fn clamp_ttl_secs(ttl_secs: u64) -> u64 {
    ttl_secs.clamp(MIN_TTL_SECS, MAX_TTL_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quote::SourceId;
    use tokio::time::sleep;

    fn quote(symbol: &str, price: f64) -> Quote {
        Quote::new(Symbol::new(symbol), price, None, SourceId::Yahoo)
    }

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = QuoteCache::default();
        let aapl = Symbol::new("AAPL");

        assert!(cache.get(&aapl).await.is_none());

        cache.put(quote("AAPL", 150.0)).await;
        assert_eq!(cache.get(&aapl).await.unwrap().price, 150.0);

        // Idempotent reads: two gets without an intervening put agree
        let first = cache.get(&aapl).await.unwrap();
        let second = cache.get(&aapl).await.unwrap();
        assert_eq!(first.price, second.price);
        assert_eq!(first.fetched_at, second.fetched_at);

        assert!(cache.get(&Symbol::new("MSFT")).await.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_unconditionally() {
        let cache = QuoteCache::default();
        let tcs = Symbol::new("TCS");

        cache.put(quote("TCS", 100.0)).await;
        cache.put(quote("TCS", 101.5)).await;

        assert_eq!(cache.get(&tcs).await.unwrap().price, 101.5);
        assert_eq!(cache.stats().await.total_entries, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiry_is_a_miss() {
        let cache = QuoteCache::default();
        cache.set_ttl_for_test(Duration::from_millis(20)).await;
        let aapl = Symbol::new("AAPL");

        cache.put(quote("AAPL", 150.0)).await;
        assert_eq!(cache.get(&aapl).await.unwrap().price, 150.0);

        sleep(Duration::from_millis(30)).await;
        assert!(cache.get(&aapl).await.is_none());

        // Expired entries are not evicted, only treated as misses
        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.fresh_entries, 0);

        // The next put supersedes the stale entry
        cache.put(quote("AAPL", 151.0)).await;
        assert_eq!(cache.get(&aapl).await.unwrap().price, 151.0);
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let cache = QuoteCache::default();
        cache.put(quote("AAPL", 150.0)).await;
        cache.put(quote("TCS", 3500.0)).await;

        cache.invalidate_all().await;

        assert!(cache.get(&Symbol::new("AAPL")).await.is_none());
        assert_eq!(cache.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_ttl_clamped_to_bounds() {
        let cache = QuoteCache::new(5);
        assert_eq!(cache.stats().await.ttl, Duration::from_secs(MIN_TTL_SECS));

        cache.set_ttl_secs(10_000).await;
        assert_eq!(cache.stats().await.ttl, Duration::from_secs(MAX_TTL_SECS));

        cache.set_ttl_secs(120).await;
        assert_eq!(cache.stats().await.ttl, Duration::from_secs(120));
    }
}
