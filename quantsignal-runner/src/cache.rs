//! Bounded in-memory cache of finished reports.
//!
//! Owned by whoever wants reuse across requests; the engine never sees it.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::{Deserialize, Serialize};

use quantsignal_core::BacktestReport;

/// What a cached report was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub strategy_id: String,
    pub symbol: String,
    pub timeframe: String,
}

impl CacheKey {
    pub fn new(
        strategy_id: impl Into<String>,
        symbol: impl Into<String>,
        timeframe: impl Into<String>,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            symbol: symbol.into(),
            timeframe: timeframe.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.strategy_id, self.symbol, self.timeframe)
    }
}

/// Least-recently-used report cache with a fixed capacity.
pub struct ReportCache {
    inner: LruCache<CacheKey, Arc<BacktestReport>>,
}

impl ReportCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }

    /// Look up a report, marking it most recently used.
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<BacktestReport>> {
        self.inner.get(key).cloned()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.contains(key)
    }

    /// Store a report, returning the previous one for the same key.
    pub fn put(&mut self, key: CacheKey, report: Arc<BacktestReport>) -> Option<Arc<BacktestReport>> {
        self.inner.put(key, report)
    }

    /// Return the cached report, or compute and store it. Errors are not cached.
    pub fn get_or_try_insert_with<E, F>(
        &mut self,
        key: CacheKey,
        compute: F,
    ) -> Result<Arc<BacktestReport>, E>
    where
        F: FnOnce() -> Result<BacktestReport, E>,
    {
        if let Some(hit) = self.inner.get(&key) {
            return Ok(Arc::clone(hit));
        }
        let report = Arc::new(compute()?);
        self.inner.put(key, Arc::clone(&report));
        Ok(report)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl fmt::Debug for ReportCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportCache")
            .field("len", &self.inner.len())
            .field("capacity", &self.inner.cap())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantsignal_core::report::generate_report;

    fn report(capital: f64) -> BacktestReport {
        generate_report(&[], &[], &[], capital)
    }

    fn key(strategy: &str) -> CacheKey {
        CacheKey::new(strategy, "BTCUSDT", "1h")
    }

    #[test]
    fn put_then_get() {
        let mut cache = ReportCache::new(4);
        assert!(cache.is_empty());
        cache.put(key("ma_cross"), Arc::new(report(1000.0)));

        let hit = cache.get(&key("ma_cross")).unwrap();
        assert_eq!(hit.summary.initial_capital, 1000.0);
        assert!(cache.get(&key("dual_ema")).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_differ_by_every_field() {
        let mut cache = ReportCache::new(8);
        cache.put(CacheKey::new("s", "BTCUSDT", "1h"), Arc::new(report(1.0)));
        assert!(!cache.contains(&CacheKey::new("s", "ETHUSDT", "1h")));
        assert!(!cache.contains(&CacheKey::new("s", "BTCUSDT", "4h")));
        assert!(!cache.contains(&CacheKey::new("t", "BTCUSDT", "1h")));
        assert!(cache.contains(&CacheKey::new("s", "BTCUSDT", "1h")));
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = ReportCache::new(2);
        cache.put(key("a"), Arc::new(report(1.0)));
        cache.put(key("b"), Arc::new(report(2.0)));
        // touch "a" so "b" becomes the eviction candidate
        assert!(cache.get(&key("a")).is_some());
        cache.put(key("c"), Arc::new(report(3.0)));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&key("a")));
        assert!(!cache.contains(&key("b")));
        assert!(cache.contains(&key("c")));
    }

    #[test]
    fn get_or_try_insert_computes_once() {
        let mut cache = ReportCache::new(2);
        let mut calls = 0;

        for _ in 0..3 {
            let r = cache
                .get_or_try_insert_with(key("x"), || {
                    calls += 1;
                    Ok::<_, String>(report(42.0))
                })
                .unwrap();
            assert_eq!(r.summary.initial_capital, 42.0);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cache = ReportCache::new(2);
        let err = cache.get_or_try_insert_with(key("x"), || Err::<BacktestReport, _>("boom"));
        assert_eq!(err.unwrap_err(), "boom");
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut cache = ReportCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put(key("a"), Arc::new(report(1.0)));
        cache.put(key("b"), Arc::new(report(2.0)));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
