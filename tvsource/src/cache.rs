//! Time-boxed in-memory cache
//!
//! [`TimedCache`] memoizes the result of an async computation for a fixed
//! duration. Entries are keyed by [`CacheKey`], i.e. the logical operation
//! plus its argument tuple, so `market_ip()` and `market_location(lat, lon)`
//! never share a slot, and two coordinate pairs never share one either.
//!
//! Each entry carries its own time-to-live, so one cache can hold results of
//! operations with different durations. There is no eviction besides expiry
//! and no protection against concurrent recomputation.

use moka::future::Cache as MokaCache;
use moka::Expiry;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Key of a cached computation: operation name + arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: &'static str,
    args: Vec<String>,
}

impl CacheKey {
    /// Key for an operation without arguments
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            args: Vec::new(),
        }
    }

    /// Appends one argument to the key
    pub fn arg(mut self, value: impl ToString) -> Self {
        self.args.push(value.to_string());
        self
    }

    pub fn operation(&self) -> &str {
        self.operation
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[derive(Debug, Clone)]
struct Timed<V> {
    value: V,
    ttl: Duration,
}

/// Expires every entry after the TTL it was stored with
struct PerEntryTtl;

impl<V> Expiry<CacheKey, Timed<V>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &Timed<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Timed<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Time-boxed cache of computed values
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use tvsource::{CacheKey, TimedCache};
///
/// # async fn example() -> Result<(), std::io::Error> {
/// let cache: TimedCache<u32> = TimedCache::new();
/// let market = cache
///     .get_or_try_insert(CacheKey::new("market_ip"), Duration::from_secs(600), || async {
///         Ok::<_, std::io::Error>(4)
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TimedCache<V: Clone + Send + Sync + 'static> {
    inner: MokaCache<CacheKey, Timed<V>>,
}

impl<V: Clone + Send + Sync + 'static> TimedCache<V> {
    pub fn new() -> Self {
        Self {
            inner: MokaCache::builder().expire_after(PerEntryTtl).build(),
        }
    }

    /// Returns the live value stored under `key`, if any
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        self.inner.get(key).await.map(|timed| timed.value)
    }

    /// Stores `value` under `key` for `ttl`
    pub async fn insert(&self, key: CacheKey, value: V, ttl: Duration) {
        self.inner.insert(key, Timed { value, ttl }).await;
    }

    /// Returns the cached value for `key`, computing it with `init` on a miss
    ///
    /// A failing `init` stores nothing and its error is returned as is.
    pub async fn get_or_try_insert<F, Fut, E>(
        &self,
        key: CacheKey,
        ttl: Duration,
        init: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!(operation = key.operation, args = ?key.args, "cache hit");
            return Ok(value);
        }

        debug!(operation = key.operation, args = ?key.args, "cache miss");
        let value = init().await?;
        self.insert(key, value.clone(), ttl).await;
        Ok(value)
    }

    /// Drops the entry stored under `key`
    pub async fn invalidate(&self, key: &CacheKey) {
        self.inner.invalidate(key).await;
    }

    /// Drops every entry
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    /// Number of live entries
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V: Clone + Send + Sync + 'static> Default for TimedCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync + 'static> std::fmt::Debug for TimedCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
