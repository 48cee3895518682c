// src/indicators/cache.rs
//! Read-through cache of fetched series keyed by (country, indicator).
//!
//! Nothing invalidates entries implicitly except the configured freshness:
//! `Session` keeps entries until `invalidate`/`clear`, `Ttl` treats entries
//! older than the TTL as missing. Empty series are never stored, so an
//! upstream outage is retried on the next request instead of being pinned.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use metrics::counter;

use crate::indicators::types::{IndicatorSeries, IndicatorSource, SeriesKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Session,
    Ttl(Duration),
}

impl Freshness {
    /// `0` means session-scoped.
    pub fn from_secs(secs: u64) -> Self {
        if secs == 0 {
            Self::Session
        } else {
            Self::Ttl(Duration::from_secs(secs))
        }
    }
}

/// A cached series plus the wall-clock time it was fetched.
#[derive(Debug, Clone)]
pub struct CachedSeries {
    pub series: Arc<IndicatorSeries>,
    pub fetched_at: DateTime<Utc>,
    stored: Instant,
}

#[derive(Debug)]
pub struct SeriesCache {
    inner: RwLock<HashMap<SeriesKey, CachedSeries>>,
    freshness: Freshness,
}

impl SeriesCache {
    pub fn new(freshness: Freshness) -> Self {
        crate::indicators::ensure_metrics_described();
        Self {
            inner: RwLock::new(HashMap::new()),
            freshness,
        }
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    fn is_fresh(&self, entry: &CachedSeries) -> bool {
        match self.freshness {
            Freshness::Session => true,
            Freshness::Ttl(ttl) => entry.stored.elapsed() < ttl,
        }
    }

    /// Fresh entry for `key`, if any.
    pub fn get(&self, key: &SeriesKey) -> Option<CachedSeries> {
        let map = self.inner.read().unwrap_or_else(|p| p.into_inner());
        map.get(key).filter(|e| self.is_fresh(e)).cloned()
    }

    /// Store a series. Empty series are ignored and `None` is returned.
    pub fn insert(&self, series: IndicatorSeries) -> Option<CachedSeries> {
        if series.is_empty() {
            return None;
        }
        let entry = CachedSeries {
            series: Arc::new(series),
            fetched_at: Utc::now(),
            stored: Instant::now(),
        };
        let mut map = self.inner.write().unwrap_or_else(|p| p.into_inner());
        map.insert(entry.series.key.clone(), entry.clone());
        Some(entry)
    }

    pub fn invalidate(&self, key: &SeriesKey) -> bool {
        let mut map = self.inner.write().unwrap_or_else(|p| p.into_inner());
        map.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut map = self.inner.write().unwrap_or_else(|p| p.into_inner());
        map.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serve from cache when fresh, otherwise fetch (best-effort) and store.
    ///
    /// The lock is never held across the upstream call; two concurrent misses
    /// for the same key may both fetch, and the later insert wins.
    pub async fn get_or_fetch(
        &self,
        source: &dyn IndicatorSource,
        key: &SeriesKey,
    ) -> CachedSeries {
        if let Some(hit) = self.get(key) {
            counter!("indicator_cache_hits_total").increment(1);
            tracing::debug!(%key, "indicator cache hit");
            return hit;
        }
        counter!("indicator_cache_misses_total").increment(1);

        let series = source.fetch_series(key).await;
        match self.insert(series.clone()) {
            Some(entry) => entry,
            None => CachedSeries {
                series: Arc::new(series),
                fetched_at: Utc::now(),
                stored: Instant::now(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::types::{FetchError, Observation};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn series(country: &str, n: usize) -> IndicatorSeries {
        IndicatorSeries {
            key: SeriesKey::new(country, "FP.CPI.TOTL").unwrap(),
            observations: (0..n)
                .map(|i| Observation {
                    period: 2000 + i as i32,
                    value: i as f64,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_series_is_not_cached() {
        let c = SeriesCache::new(Freshness::Session);
        assert!(c.insert(series("CA", 0)).is_none());
        assert!(c.is_empty());
    }

    #[test]
    fn session_entries_stay_until_invalidated() {
        let c = SeriesCache::new(Freshness::Session);
        let s = series("CA", 3);
        let key = s.key.clone();
        c.insert(s);
        assert_eq!(c.get(&key).unwrap().series.len(), 3);
        assert!(c.invalidate(&key));
        assert!(c.get(&key).is_none());
        assert!(!c.invalidate(&key));
    }

    #[test]
    fn ttl_expiry_hides_entry() {
        let c = SeriesCache::new(Freshness::Ttl(Duration::from_millis(1)));
        let s = series("US", 2);
        let key = s.key.clone();
        c.insert(s);
        std::thread::sleep(Duration::from_millis(20));
        assert!(c.get(&key).is_none());
        // still physically present until overwritten or cleared
        assert_eq!(c.len(), 1);
        c.clear();
        assert!(c.is_empty());
    }

    #[test]
    fn freshness_from_secs() {
        assert_eq!(Freshness::from_secs(0), Freshness::Session);
        assert_eq!(
            Freshness::from_secs(60),
            Freshness::Ttl(Duration::from_secs(60))
        );
    }

    /// Slow upstream that counts calls and always returns three points.
    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IndicatorSource for CountingSource {
        async fn try_fetch(&self, key: &SeriesKey) -> Result<IndicatorSeries, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            let mut s = series(&key.country, 3);
            s.key = key.clone();
            Ok(s)
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lookups_share_one_entry() {
        const TASKS: usize = 16;
        let cache = Arc::new(SeriesCache::new(Freshness::Session));
        let source = Arc::new(CountingSource::default());
        let key = SeriesKey::new("CA", "NY.GDP.MKTP.CD").unwrap();

        let handles: Vec<_> = (0..TASKS)
            .map(|_| {
                let (cache, source, key) = (cache.clone(), source.clone(), key.clone());
                tokio::spawn(async move { cache.get_or_fetch(source.as_ref(), &key).await })
            })
            .collect();

        let mut results = Vec::with_capacity(TASKS);
        for h in handles {
            results.push(h.await.unwrap());
        }

        let first = &results[0].series;
        assert_eq!(first.len(), 3);
        for r in &results {
            assert_eq!(r.series.key, key);
            assert_eq!(r.series.observations, first.observations);
        }

        let calls = source.calls.load(Ordering::SeqCst);
        assert!((1..=TASKS).contains(&calls), "calls={calls}");
        assert_eq!(cache.len(), 1);

        // once populated every reader is served from the store
        let readers: Vec<_> = (0..TASKS)
            .map(|_| {
                let (cache, source, key) = (cache.clone(), source.clone(), key.clone());
                tokio::spawn(async move { cache.get_or_fetch(source.as_ref(), &key).await })
            })
            .collect();
        for h in readers {
            assert_eq!(h.await.unwrap().series.observations, first.observations);
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), calls);
        assert_eq!(cache.len(), 1);
    }
}
