//! Cache Store Module
//!
//! Byte-budgeted cache combining one eviction strategy with lazy TTL expiration.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::entry::entry_size;
use crate::cache::{
    ByteView, CacheStats, EvictionPolicy, EvictionStrategy, RemovalObserver, DEFAULT_MAX_BYTES,
};

// == Occupancy ==
/// Byte and removal counters shared between a cache and its strategy's observer.
#[derive(Debug, Default)]
struct Occupancy {
    bytes: AtomicUsize,
    removals: AtomicU64,
}

impl Occupancy {
    fn bytes(&self) -> usize {
        self.bytes.load(Ordering::Relaxed)
    }

    fn removals(&self) -> u64 {
        self.removals.load(Ordering::Relaxed)
    }

    fn charge(&self, size: usize) {
        self.bytes.fetch_add(size, Ordering::Relaxed);
    }

    fn release(&self, size: usize) {
        let current = self.bytes.load(Ordering::Relaxed);
        assert!(
            current >= size,
            "cache byte accounting underflow: releasing {} of {} bytes",
            size,
            current
        );
        self.bytes.store(current - size, Ordering::Relaxed);
    }
}

/// Observer handed to the strategy; releases bytes for every removed entry.
struct OccupancyObserver(Arc<Occupancy>);

impl RemovalObserver for OccupancyObserver {
    fn on_removed(&mut self, key: &str, value: &ByteView) {
        self.0.release(entry_size(key, value));
        self.0.removals.fetch_add(1, Ordering::Relaxed);
    }
}

struct Inner {
    strategy: Box<dyn EvictionStrategy>,
    stats: CacheStats,
}

// == Cache ==
/// Thread-safe cache that keeps `key.len() + value.len()` summed over resident
/// entries at or below `max_bytes`.
///
/// All work happens under one mutex and is purely in-memory.
pub struct Cache {
    max_bytes: usize,
    inner: Mutex<Inner>,
    occupancy: Arc<Occupancy>,
}

impl Cache {
    // == Constructor ==
    /// Creates a cache around the given strategy, registering itself as the
    /// strategy's removal observer.
    pub fn new(max_bytes: usize, mut strategy: Box<dyn EvictionStrategy>) -> Self {
        let occupancy = Arc::new(Occupancy::default());
        strategy.set_removal_observer(Box::new(OccupancyObserver(Arc::clone(&occupancy))));

        Self {
            max_bytes,
            inner: Mutex::new(Inner {
                strategy,
                stats: CacheStats::new(),
            }),
            occupancy,
        }
    }

    /// Creates a cache with a freshly built strategy for `policy`.
    pub fn with_policy(max_bytes: usize, policy: EvictionPolicy) -> Self {
        Self::new(max_bytes, policy.build())
    }

    // == Add ==
    /// Inserts or replaces an entry, then evicts by policy until the cache is
    /// back within budget.
    ///
    /// An entry larger than the whole budget is evicted straight away, leaving
    /// the cache empty.
    pub fn add(&self, key: &str, value: ByteView, expire: Option<Instant>) {
        let mut inner = self.inner.lock();

        let size = entry_size(key, &value);
        let replaced = inner.strategy.add(key, value, expire);
        self.occupancy.charge(size);
        if let Some(old) = replaced {
            self.occupancy.release(entry_size(key, &old));
        }

        while self.occupancy.bytes() > self.max_bytes {
            let before = self.occupancy.removals();
            inner.strategy.remove_oldest();
            if self.occupancy.removals() == before {
                break;
            }
            inner.stats.record_eviction();
            debug!(
                bytes = self.occupancy.bytes(),
                max_bytes = self.max_bytes,
                "cache: evicted entry to stay within budget"
            );
        }
    }

    // == Get ==
    /// Looks up an unexpired value, recording a hit or miss.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        let value = inner.strategy.get(key);
        match value {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        value
    }

    /// Looks up an unexpired value without touching the hit and miss counters.
    ///
    /// For callers re-checking a key whose miss they already recorded.
    pub fn get_unrecorded(&self, key: &str) -> Option<ByteView> {
        self.inner.lock().strategy.get(key)
    }

    // == Stats ==
    /// Returns a snapshot of counters and occupancy.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.strategy.len(),
            bytes: self.occupancy.bytes(),
            max_bytes: self.max_bytes,
            ..inner.stats.clone()
        }
    }

    /// Bytes currently charged against the budget.
    pub fn bytes(&self) -> usize {
        self.occupancy.bytes()
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn len(&self) -> usize {
        self.inner.lock().strategy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Cache {
    /// An LRU cache with [`DEFAULT_MAX_BYTES`].
    fn default() -> Self {
        Self::with_policy(DEFAULT_MAX_BYTES, EvictionPolicy::Lru)
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("max_bytes", &self.max_bytes)
            .field("bytes", &self.occupancy.bytes())
            .finish_non_exhaustive()
    }
}
