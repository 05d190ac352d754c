//! Group Statistics Module
//!
//! Counters for how a group's lookups were served.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::cache::CacheStats;

// == Group Counters ==
/// Lock-free counters updated on the lookup path.
#[derive(Debug, Default)]
pub(crate) struct GroupCounters {
    gets: AtomicU64,
    cache_hits: AtomicU64,
    local_loads: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    loader_errors: AtomicU64,
}

impl GroupCounters {
    pub fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_load(&self) {
        self.local_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_load(&self) {
        self.peer_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_error(&self) {
        self.peer_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_loader_error(&self) {
        self.loader_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, cache: CacheStats) -> GroupStats {
        GroupStats {
            gets: self.gets.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            peer_loads: self.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.peer_errors.load(Ordering::Relaxed),
            loader_errors: self.loader_errors.load(Ordering::Relaxed),
            cache,
        }
    }
}

// == Group Stats ==
/// Snapshot of a group's counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    /// Calls to `Group::get`, including rejected ones
    pub gets: u64,
    /// Lookups answered from the local cache before entering the load path
    pub cache_hits: u64,
    /// Successful local loader invocations
    pub local_loads: u64,
    /// Successful fetches from a remote owner
    pub peer_loads: u64,
    /// Failed fetches from a remote owner
    pub peer_errors: u64,
    /// Failed local loader invocations
    pub loader_errors: u64,
    /// The group's cache
    pub cache: CacheStats,
}
