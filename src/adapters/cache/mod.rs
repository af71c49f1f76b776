//! In-memory memoization for expensive lookups.
//!
//! A size-bounded LRU store whose contents are dropped wholesale once a
//! timeout elapses. Used to keep directory scans of the firmware tree cheap
//! across repeated calls.

pub mod clock;
pub mod key;
pub mod timed_lru;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use key::{CacheArg, CacheArgs, CacheKey, KeyPart};
pub use timed_lru::{
    timed_lru_cache, CacheInfo, CacheOptions, CachedFn, TimedLruCache, DEFAULT_MAXSIZE,
    DEFAULT_TIMEOUT_SECS,
};
