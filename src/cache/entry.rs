//! Cache Entry Module
//!
//! Defines a resident cache entry with lazy TTL support.

use std::time::{Duration, Instant};

use crate::cache::ByteView;

// == Cache Entry ==
/// A single resident entry: key, value and optional expiry instant.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The entry key
    pub key: String,
    /// The stored value
    pub value: ByteView,
    /// Expiration instant, None = no expiration
    pub expire: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    pub fn new(key: String, value: ByteView, expire: Option<Instant>) -> Self {
        Self { key, value, expire }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current instant reaches its expiry.
    /// Entries without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiry against a caller-supplied instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expire {
            Some(expire) => now >= expire,
            None => false,
        }
    }

    // == Size ==
    /// Bytes charged against the cache budget: key length plus value length.
    pub fn size(&self) -> usize {
        entry_size(&self.key, &self.value)
    }
}

/// Bytes charged for a key/value pair.
pub fn entry_size(key: &str, value: &ByteView) -> usize {
    key.len() + value.len()
}

/// Converts an optional TTL into an expiry instant measured from now.
pub fn expire_after(ttl: Option<Duration>) -> Option<Instant> {
    ttl.and_then(|ttl| Instant::now().checked_add(ttl))
}
