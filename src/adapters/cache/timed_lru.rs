//! Time-bounded LRU memoization.
//!
//! A [`TimedLruCache`] holds at most `maxsize` entries with least-recently-used
//! eviction. Independently, once `timeout` has elapsed since the cache was
//! created or last expired, the next access clears *everything* (entries and
//! statistics) and starts a fresh window. There is no per-entry expiry.
//!
//! The expiry check and the lookup share one lock. The wrapped function runs
//! outside of it.

use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::Serialize;
use tracing::trace;

use super::clock::{Clock, MonotonicClock};
use super::key::{CacheArgs, CacheKey};

/// Default seconds before the whole cache is invalidated
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default maximum number of cached argument tuples
pub const DEFAULT_MAXSIZE: usize = 128;

/// Settings for a timed LRU cache
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// How long cached values stay valid before the entire cache is cleared
    pub timeout: Duration,
    /// Maximum distinct entries. `None` is unbounded, `Some(0)` caches nothing.
    pub maxsize: Option<usize>,
    /// Distinguish equal arguments of different types (`3` vs `3.0`)
    pub typed: bool,
    clock: Arc<dyn Clock>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            maxsize: Some(DEFAULT_MAXSIZE),
            typed: false,
            clock: Arc::new(MonotonicClock),
        }
    }
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn maxsize(mut self, maxsize: Option<usize>) -> Self {
        self.maxsize = maxsize;
        self
    }

    #[must_use]
    pub fn typed(mut self, typed: bool) -> Self {
        self.typed = typed;
        self
    }

    /// Use a different time source (tests step a `ManualClock`)
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Cache statistics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub hits: u64,
    pub misses: u64,
    pub maxsize: Option<usize>,
    pub currsize: usize,
}

struct CacheState<K: Hash + Eq, V> {
    /// `None` when `maxsize` is zero
    store: Option<LruCache<K, V>>,
    /// `None` when `now + timeout` overflows, meaning never
    expiration: Option<Instant>,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq, V> CacheState<K, V> {
    fn clear(&mut self) {
        if let Some(store) = self.store.as_mut() {
            store.clear();
        }
        self.hits = 0;
        self.misses = 0;
    }

    fn len(&self) -> usize {
        self.store.as_ref().map_or(0, LruCache::len)
    }
}

/// Bounded key/value store with whole-cache time expiry
pub struct TimedLruCache<K: Hash + Eq, V> {
    state: Mutex<CacheState<K, V>>,
    timeout: Duration,
    maxsize: Option<usize>,
    clock: Arc<dyn Clock>,
}

impl<K: Hash + Eq, V: Clone> TimedLruCache<K, V> {
    pub fn new(options: &CacheOptions) -> Self {
        let store = match options.maxsize {
            None => Some(LruCache::unbounded()),
            Some(n) => NonZeroUsize::new(n).map(LruCache::new),
        };
        let expiration = options.clock.now().checked_add(options.timeout);

        Self {
            state: Mutex::new(CacheState {
                store,
                expiration,
                hits: 0,
                misses: 0,
            }),
            timeout: options.timeout,
            maxsize: options.maxsize,
            clock: Arc::clone(&options.clock),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        // Every mutation leaves the state consistent, so a panic elsewhere
        // cannot have left it half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expire_if_due(&self, state: &mut CacheState<K, V>) {
        let now = self.clock.now();
        if state.expiration.is_some_and(|at| now >= at) {
            trace!(
                entries = state.len(),
                timeout_ms = self.timeout.as_millis(),
                "cache window elapsed, clearing"
            );
            state.clear();
            state.expiration = now.checked_add(self.timeout);
        }
    }

    /// Look up a key, counting a hit or a miss.
    ///
    /// Clears the whole cache first if the timeout has elapsed.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.lock();
        self.expire_if_due(&mut state);

        let found = state.store.as_mut().and_then(|store| store.get(key).cloned());
        if found.is_some() {
            state.hits += 1;
        } else {
            state.misses += 1;
        }
        found
    }

    /// Store a value, evicting the least recently used entry when full
    pub fn insert(&self, key: K, value: V) {
        let mut state = self.lock();
        if let Some(store) = state.store.as_mut() {
            store.put(key, value);
        }
    }

    /// Return the cached value or compute and store it.
    ///
    /// `compute` runs without the lock held. An `Err` is returned as-is and
    /// nothing is stored.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        match self.get_or_try_insert_with(key, || Ok::<V, Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    pub fn info(&self) -> CacheInfo {
        let state = self.lock();
        CacheInfo {
            hits: state.hits,
            misses: state.misses,
            maxsize: self.maxsize,
            currsize: state.len(),
        }
    }

    /// Drop every entry and reset statistics. The expiry window is kept.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<K: Hash + Eq, V: Clone> fmt::Debug for TimedLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedLruCache")
            .field("timeout", &self.timeout)
            .field("info", &self.info())
            .finish_non_exhaustive()
    }
}

/// A function wrapped with a [`TimedLruCache`]
pub struct CachedFn<A, V, F> {
    func: F,
    cache: TimedLruCache<CacheKey, V>,
    typed: bool,
    _args: PhantomData<fn(A)>,
}

/// Memoize `func` with a timed LRU cache.
///
/// ```
/// use qmkctx::adapters::cache::{timed_lru_cache, CacheOptions};
///
/// let square = timed_lru_cache(CacheOptions::new(), |(n,): (u64,)| n * n);
/// assert_eq!(square.call((4,)), 16);
/// assert_eq!(square.call((4,)), 16);
/// assert_eq!(square.cache_info().hits, 1);
/// ```
pub fn timed_lru_cache<A, V, F>(options: CacheOptions, func: F) -> CachedFn<A, V, F>
where
    A: CacheArgs,
    V: Clone,
{
    CachedFn {
        func,
        cache: TimedLruCache::new(&options),
        typed: options.typed,
        _args: PhantomData,
    }
}

impl<A: CacheArgs, V: Clone, F> CachedFn<A, V, F> {
    /// Call through the cache
    pub fn call(&self, args: A) -> V
    where
        F: Fn(A) -> V,
    {
        let key = args.cache_key(self.typed);
        self.cache.get_or_insert_with(key, || (self.func)(args))
    }

    /// Call a fallible function through the cache. Errors are not cached.
    pub fn try_call<E>(&self, args: A) -> Result<V, E>
    where
        F: Fn(A) -> Result<V, E>,
    {
        let key = args.cache_key(self.typed);
        self.cache.get_or_try_insert_with(key, || (self.func)(args))
    }

    pub fn cache_info(&self) -> CacheInfo {
        self.cache.info()
    }

    pub fn cache_clear(&self) {
        self.cache.clear();
    }
}

impl<A, V: Clone, F> fmt::Debug for CachedFn<A, V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFn")
            .field("typed", &self.typed)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::ManualClock;
    use std::cell::Cell;

    fn manual() -> (Arc<ManualClock>, CacheOptions) {
        let clock = Arc::new(ManualClock::new());
        let options = CacheOptions::new().clock(clock.clone());
        (clock, options)
    }

    #[test]
    fn test_second_call_is_a_hit() {
        let calls = Cell::new(0);
        let double = timed_lru_cache(CacheOptions::new(), |(n,): (i64,)| {
            calls.set(calls.get() + 1);
            n * 2
        });

        assert_eq!(double.call((21,)), 42);
        assert_eq!(double.call((21,)), 42);

        assert_eq!(calls.get(), 1);
        let info = double.cache_info();
        assert_eq!(info.hits, 1);
        assert_eq!(info.misses, 1);
        assert_eq!(info.currsize, 1);
        assert_eq!(info.maxsize, Some(DEFAULT_MAXSIZE));
    }

    #[test]
    fn test_timeout_clears_whole_cache() {
        let (clock, options) = manual();
        let calls = Cell::new(0);
        let f = timed_lru_cache(options.timeout(Duration::from_secs(10)), |(n,): (u32,)| {
            calls.set(calls.get() + 1);
            n + 1
        });

        f.call((1,));
        f.call((2,));
        f.call((1,));
        assert_eq!(f.cache_info().currsize, 2);

        clock.advance(Duration::from_secs(10));
        f.call((1,));

        assert_eq!(calls.get(), 3);
        let info = f.cache_info();
        assert_eq!(info.currsize, 1, "entry for 2 went with the expiry");
        assert_eq!(info.hits, 0);
        assert_eq!(info.misses, 1);
    }

    #[test]
    fn test_expiry_window_rolls_forward() {
        let (clock, options) = manual();
        let calls = Cell::new(0);
        let f = timed_lru_cache(options.timeout(Duration::from_secs(10)), |(): ()| {
            calls.set(calls.get() + 1);
        });

        f.call(());
        clock.advance(Duration::from_secs(9));
        f.call(());
        assert_eq!(calls.get(), 1);

        clock.advance(Duration::from_secs(1));
        f.call(());
        assert_eq!(calls.get(), 2);

        // new window starts at the expiry call, not at the original deadline
        clock.advance(Duration::from_secs(9));
        f.call(());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_lru_eviction_at_capacity() {
        let calls = Cell::new(0);
        let f = timed_lru_cache(CacheOptions::new().maxsize(Some(2)), |(n,): (u8,)| {
            calls.set(calls.get() + 1);
            n
        });

        f.call((1,));
        f.call((2,));
        f.call((3,));
        assert_eq!(calls.get(), 3);

        f.call((1,));
        assert_eq!(calls.get(), 4, "1 was least recently used and evicted");
        assert_eq!(f.cache_info().currsize, 2);
    }

    #[test]
    fn test_recent_access_protects_from_eviction() {
        let calls = Cell::new(0);
        let f = timed_lru_cache(CacheOptions::new().maxsize(Some(2)), |(n,): (u8,)| {
            calls.set(calls.get() + 1);
            n
        });

        f.call((1,));
        f.call((2,));
        f.call((1,));
        f.call((3,));
        f.call((1,));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_typed_keys_are_distinct() {
        let f = timed_lru_cache(CacheOptions::new().typed(true), |(n,): (f64,)| n);
        let g = timed_lru_cache(CacheOptions::new().typed(true), |(n,): (i64,)| n);
        let shared: TimedLruCache<CacheKey, &str> =
            TimedLruCache::new(&CacheOptions::new().typed(true));

        shared.insert((3_i64,).cache_key(true), "int");
        shared.insert((3.0_f64,).cache_key(true), "float");
        assert_eq!(shared.info().currsize, 2);

        f.call((3.0,));
        g.call((3,));
        assert_eq!(f.cache_info().currsize, 1);
        assert_eq!(g.cache_info().currsize, 1);
    }

    #[test]
    fn test_untyped_keys_are_shared() {
        let shared: TimedLruCache<CacheKey, &str> = TimedLruCache::new(&CacheOptions::new());

        shared.insert((3_i64,).cache_key(false), "int");
        shared.insert((3.0_f64,).cache_key(false), "float");

        assert_eq!(shared.info().currsize, 1);
        assert_eq!(shared.get(&(3_i64,).cache_key(false)), Some("float"));
    }

    #[test]
    fn test_zero_maxsize_never_stores() {
        let calls = Cell::new(0);
        let f = timed_lru_cache(CacheOptions::new().maxsize(Some(0)), |(n,): (u8,)| {
            calls.set(calls.get() + 1);
            n
        });

        f.call((1,));
        f.call((1,));

        assert_eq!(calls.get(), 2);
        let info = f.cache_info();
        assert_eq!(info.misses, 2);
        assert_eq!(info.currsize, 0);
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let f = timed_lru_cache(CacheOptions::new().maxsize(None), |(n,): (u32,)| n);
        for n in 0..500 {
            f.call((n,));
        }
        assert_eq!(f.cache_info().currsize, 500);
        assert_eq!(f.cache_info().maxsize, None);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let calls = Cell::new(0);
        let f = timed_lru_cache(CacheOptions::new(), |(n,): (i32,)| {
            calls.set(calls.get() + 1);
            if n < 0 {
                Err(format!("negative: {n}"))
            } else {
                Ok(n)
            }
        });

        assert!(f.try_call((-1,)).is_err());
        assert!(f.try_call((-1,)).is_err());
        assert_eq!(calls.get(), 2);
        assert_eq!(f.cache_info().currsize, 0);

        assert_eq!(f.try_call((5,)), Ok(5));
        assert_eq!(f.try_call((5,)), Ok(5));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_failed_call_keeps_expiry_window() {
        let (clock, options) = manual();
        let calls = Cell::new(0);
        let f = timed_lru_cache(options.timeout(Duration::from_secs(10)), |(n,): (i32,)| {
            calls.set(calls.get() + 1);
            if n < 0 {
                Err("negative")
            } else {
                Ok(n)
            }
        });

        assert_eq!(f.try_call((1,)), Ok(1));
        clock.advance(Duration::from_secs(5));
        assert!(f.try_call((-1,)).is_err());

        // still the window opened at t=0, so t=10 flushes
        clock.advance(Duration::from_secs(5));
        assert_eq!(f.try_call((1,)), Ok(1));

        assert_eq!(calls.get(), 3);
        assert_eq!(
            f.cache_info(),
            CacheInfo {
                hits: 0,
                misses: 1,
                maxsize: Some(DEFAULT_MAXSIZE),
                currsize: 1,
            }
        );
    }

    #[test]
    fn test_cache_clear_resets_stats() {
        let f = timed_lru_cache(CacheOptions::new(), |(n,): (u32,)| n);
        f.call((1,));
        f.call((1,));
        f.cache_clear();

        assert_eq!(
            f.cache_info(),
            CacheInfo {
                hits: 0,
                misses: 0,
                maxsize: Some(DEFAULT_MAXSIZE),
                currsize: 0,
            }
        );
    }

    #[test]
    fn test_huge_timeout_never_expires() {
        let (clock, options) = manual();
        let f = timed_lru_cache(options.timeout(Duration::MAX), |(n,): (u32,)| n);
        f.call((1,));
        clock.advance(Duration::from_secs(86_400 * 365));
        f.call((1,));
        assert_eq!(f.cache_info().hits, 1);
    }

    #[test]
    fn test_shared_across_threads() {
        let f = Arc::new(timed_lru_cache(CacheOptions::new(), |(n,): (u64,)| n * n));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let f = Arc::clone(&f);
                std::thread::spawn(move || (0..50_u64).map(|n| f.call((n,))).sum::<u64>())
            })
            .collect();

        let expected: u64 = (0..50_u64).map(|n| n * n).sum();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
        assert_eq!(f.cache_info().currsize, 50);
    }
}
