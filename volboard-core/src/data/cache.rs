//! Time-boxed in-memory cache in front of any bar repository.
//!
//! Keyed by (symbol, granularity, start, end). Entries expire after the TTL so
//! a dashboard refresh within the window reuses the series instead of hitting
//! the provider again. Quotes are never cached: they are the one figure the
//! user expects to move on every refresh.

use super::provider::{BarRepository, DataError};
use crate::domain::{BarSeries, Granularity, Quote};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    symbol: String,
    granularity: Granularity,
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug)]
struct CacheEntry {
    series: BarSeries,
    stored_at: Instant,
}

/// Hit/miss counters, mostly for tests and debug logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    stats: CacheStats,
}

/// Repository wrapper that memoises successful bar fetches for `ttl`.
///
/// Failed fetches are not cached, so a transient provider error does not
/// poison subsequent refreshes.
pub struct CachedRepository<R> {
    inner: R,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl<R: BarRepository> CachedRepository<R> {
    pub fn new(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Drop every entry whose TTL has elapsed.
    pub fn evict_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        before - state.entries.len()
    }
}

impl<R: BarRepository> BarRepository for CachedRepository<R> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BarSeries, DataError> {
        let key = CacheKey {
            symbol: symbol.to_string(),
            granularity,
            start,
            end,
        };

        {
            let mut state = self.lock();
            let fresh = state
                .entries
                .get(&key)
                .filter(|e| e.stored_at.elapsed() < self.ttl)
                .map(|e| e.series.clone());
            if let Some(series) = fresh {
                state.stats.hits += 1;
                tracing::debug!(symbol, %granularity, "bar cache hit");
                return Ok(series);
            }
            state.stats.misses += 1;
        }

        // The lock is released while the provider is called.
        let series = self.inner.fetch_bars(symbol, granularity, start, end)?;
        let evicted = self.evict_expired();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted expired bar cache entries");
        }
        self.lock().entries.insert(
            key,
            CacheEntry {
                series: series.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(series)
    }

    fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        self.inner.fetch_latest_quote(symbol)
    }
}
