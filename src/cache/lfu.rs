//! LFU Strategy Module
//!
//! Implements Least Frequently Used ordering for cache eviction.
//!
//! Entries are grouped into buckets keyed by access frequency. Each bucket is
//! itself recency-ordered, so ties within a frequency break by LRU order. The
//! buckets sit in an ordered map, which keeps the minimum frequency at the
//! front without rescanning every bucket on eviction.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use tracing::debug;

use crate::cache::list::IndexList;
use crate::cache::{ByteView, CacheEntry, EvictionStrategy, RemovalObserver};

/// Frequency assigned to a freshly inserted key.
const INITIAL_FREQUENCY: u64 = 1;

// == Slot ==
/// Where a key currently lives: its frequency bucket and its slot in that bucket.
#[derive(Debug, Clone, Copy)]
struct Slot {
    freq: u64,
    idx: usize,
}

// == LFU Strategy ==
#[derive(Default)]
pub struct LfuStrategy {
    /// Frequency buckets, each ordered most recent first
    buckets: BTreeMap<u64, IndexList<CacheEntry>>,
    /// Key to bucket slot
    index: HashMap<String, Slot>,
    observer: Option<Box<dyn RemovalObserver>>,
}

impl LfuStrategy {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Frequency ==
    /// Returns the recorded access frequency for a key.
    pub fn frequency(&self, key: &str) -> Option<u64> {
        self.index.get(key).map(|slot| slot.freq)
    }

    /// Lowest frequency currently in use.
    pub fn min_frequency(&self) -> Option<u64> {
        self.buckets.keys().next().copied()
    }

    /// Unlinks an entry from its bucket, dropping the bucket if it empties.
    fn detach(&mut self, slot: Slot) -> Option<CacheEntry> {
        let bucket = self.buckets.get_mut(&slot.freq)?;
        let entry = bucket.remove(slot.idx);
        if bucket.is_empty() {
            self.buckets.remove(&slot.freq);
        }
        entry
    }

    /// Pushes an entry to the front of the bucket for `freq`.
    fn attach(&mut self, freq: u64, entry: CacheEntry) {
        let key = entry.key.clone();
        let idx = self.buckets.entry(freq).or_default().push_front(entry);
        self.index.insert(key, Slot { freq, idx });
    }

    /// Moves an entry to the next frequency bucket.
    fn promote(&mut self, slot: Slot) -> Option<&mut CacheEntry> {
        let entry = self.detach(slot)?;
        let freq = slot.freq + 1;
        let key = entry.key.clone();
        self.attach(freq, entry);

        let slot = *self.index.get(&key)?;
        self.buckets.get_mut(&slot.freq)?.get_mut(slot.idx)
    }

    fn remove_slot(&mut self, slot: Slot) {
        if let Some(entry) = self.detach(slot) {
            self.index.remove(&entry.key);
            if let Some(observer) = self.observer.as_mut() {
                observer.on_removed(&entry.key, &entry.value);
            }
        }
    }
}

impl EvictionStrategy for LfuStrategy {
    fn get(&mut self, key: &str) -> Option<ByteView> {
        let slot = *self.index.get(key)?;

        let expired = self
            .buckets
            .get(&slot.freq)
            .and_then(|bucket| bucket.get(slot.idx))
            .map_or(true, |entry| entry.is_expired());
        if expired {
            debug!(key, "lfu: dropping expired entry");
            self.remove_slot(slot);
            return None;
        }

        self.promote(slot).map(|entry| entry.value.clone())
    }

    fn add(&mut self, key: &str, value: ByteView, expire: Option<Instant>) -> Option<ByteView> {
        if let Some(&slot) = self.index.get(key) {
            return self.promote(slot).map(|entry| {
                entry.expire = expire;
                std::mem::replace(&mut entry.value, value)
            });
        }

        self.attach(
            INITIAL_FREQUENCY,
            CacheEntry::new(key.to_string(), value, expire),
        );
        None
    }

    fn remove_oldest(&mut self) {
        let victim = self.buckets.iter().next().and_then(|(&freq, bucket)| {
            bucket.back().map(|idx| Slot { freq, idx })
        });
        if let Some(slot) = victim {
            self.remove_slot(slot);
        }
    }

    fn set_removal_observer(&mut self, observer: Box<dyn RemovalObserver>) {
        self.observer = Some(observer);
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}
