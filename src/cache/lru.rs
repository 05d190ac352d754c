//! LRU Strategy Module
//!
//! Implements Least Recently Used ordering for cache eviction.

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use crate::cache::list::IndexList;
use crate::cache::{ByteView, CacheEntry, EvictionStrategy, RemovalObserver};

// == LRU Strategy ==
/// Recency-ordered entry storage.
///
/// Entries live in an [`IndexList`] where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Default)]
pub struct LruStrategy {
    /// Access order of entries
    order: IndexList<CacheEntry>,
    /// Key to list slot
    index: HashMap<String, usize>,
    observer: Option<Box<dyn RemovalObserver>>,
}

impl LruStrategy {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without touching it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order
            .back()
            .and_then(|idx| self.order.get(idx))
            .map(|entry| entry.key.as_str())
    }

    fn remove_slot(&mut self, idx: usize) {
        if let Some(entry) = self.order.remove(idx) {
            self.index.remove(&entry.key);
            if let Some(observer) = self.observer.as_mut() {
                observer.on_removed(&entry.key, &entry.value);
            }
        }
    }
}

impl EvictionStrategy for LruStrategy {
    fn get(&mut self, key: &str) -> Option<ByteView> {
        let idx = *self.index.get(key)?;

        let expired = self.order.get(idx).map_or(true, |entry| entry.is_expired());
        if expired {
            debug!(key, "lru: dropping expired entry");
            self.remove_slot(idx);
            return None;
        }

        self.order.move_to_front(idx);
        self.order.get(idx).map(|entry| entry.value.clone())
    }

    fn add(&mut self, key: &str, value: ByteView, expire: Option<Instant>) -> Option<ByteView> {
        if let Some(&idx) = self.index.get(key) {
            self.order.move_to_front(idx);
            return self.order.get_mut(idx).map(|entry| {
                entry.expire = expire;
                std::mem::replace(&mut entry.value, value)
            });
        }

        let idx = self
            .order
            .push_front(CacheEntry::new(key.to_string(), value, expire));
        self.index.insert(key.to_string(), idx);
        None
    }

    fn remove_oldest(&mut self) {
        if let Some(idx) = self.order.back() {
            self.remove_slot(idx);
        }
    }

    fn set_removal_observer(&mut self, observer: Box<dyn RemovalObserver>) {
        self.observer = Some(observer);
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::strategy::contract::Recorder;

    fn add(lru: &mut LruStrategy, key: &str) {
        lru.add(key, ByteView::from(key.to_string()), None);
    }

    #[test]
    fn test_lru_new() {
        let lru = LruStrategy::new();
        assert!(lru.is_empty());
        assert_eq!(lru.peek_oldest(), None);
    }

    #[test]
    fn test_lru_add_orders_by_insertion() {
        let mut lru = LruStrategy::new();
        add(&mut lru, "key1");
        add(&mut lru, "key2");
        add(&mut lru, "key3");

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_oldest(), Some("key1"));
    }

    #[test]
    fn test_lru_get_moves_to_front() {
        let mut lru = LruStrategy::new();
        add(&mut lru, "a");
        add(&mut lru, "b");
        add(&mut lru, "c");

        lru.get("a");

        assert_eq!(lru.peek_oldest(), Some("b"));
    }

    #[test]
    fn test_lru_add_existing_moves_to_front() {
        let mut lru = LruStrategy::new();
        add(&mut lru, "a");
        add(&mut lru, "b");

        lru.add("a", ByteView::from("new"), None);

        assert_eq!(lru.peek_oldest(), Some("b"));
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_lru_remove_oldest_order() {
        let recorder = Recorder::default();
        let mut lru = LruStrategy::new();
        lru.set_removal_observer(Box::new(recorder.clone()));

        add(&mut lru, "a");
        add(&mut lru, "b");
        add(&mut lru, "c");
        lru.get("a");
        lru.get("c");
        lru.get("b");

        // Order after touches: front=[b, c, a]=back
        lru.remove_oldest();
        lru.remove_oldest();
        lru.remove_oldest();

        assert_eq!(recorder.removed(), vec!["a", "c", "b"]);
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_removed_key_is_gone() {
        let mut lru = LruStrategy::new();
        add(&mut lru, "a");
        add(&mut lru, "b");

        lru.remove_oldest();

        assert_eq!(lru.get("a"), None);
        assert!(lru.get("b").is_some());
    }
}
