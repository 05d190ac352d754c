//! Consistent Hash Ring
//!
//! Maps keys to peers so that the same key always lands on the same peer for
//! a fixed membership, and a membership change moves as few keys as possible.
//!
//! Each peer is placed on the ring `replicas` times (virtual nodes hashed from
//! `"{i}{peer}"`). A key belongs to the first virtual node clockwise from the
//! key's own hash, wrapping around at the end of the ring.

use std::collections::HashMap;
use std::fmt;

use sha2::{Digest, Sha256};

/// Hash function placing keys and virtual nodes on the ring.
pub type HashFn = fn(&[u8]) -> u32;

/// Virtual nodes per peer unless configured otherwise
pub const DEFAULT_REPLICAS: usize = 50;

/// First four bytes of the SHA-256 digest, big-endian.
///
/// Stable across builds and platforms, so nodes running different binaries
/// still agree on key ownership.
pub fn sha256_hash(data: &[u8]) -> u32 {
    let digest = Sha256::digest(data);
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

// == Hash Ring ==
#[derive(Clone)]
pub struct HashRing {
    replicas: usize,
    hash: HashFn,
    /// Sorted virtual node hashes
    points: Vec<u32>,
    /// Virtual node hash to owning peer
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    pub fn new(replicas: usize) -> Self {
        Self::with_hash(replicas, sha256_hash)
    }

    pub fn with_hash(replicas: usize, hash: HashFn) -> Self {
        Self {
            replicas: replicas.max(1),
            hash,
            points: Vec::new(),
            owners: HashMap::new(),
        }
    }

    // == Add ==
    /// Places each peer on the ring.
    ///
    /// When two virtual nodes collide the lexicographically smaller peer owns
    /// the point, so the result does not depend on insertion order.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let point = (self.hash)(format!("{}{}", i, peer).as_bytes());
                self.owners
                    .entry(point)
                    .and_modify(|owner| {
                        if peer < owner.as_str() {
                            *owner = peer.to_string();
                        }
                    })
                    .or_insert_with(|| peer.to_string());
                self.points.push(point);
            }
        }
        self.points.sort_unstable();
        self.points.dedup();
    }

    // == Get ==
    /// Returns the peer owning `key`, or None if the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.points.partition_point(|&point| point < hash);
        let point = self.points[idx % self.points.len()];
        self.owners.get(&point).map(String::as_str)
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("points", &self.points.len())
            .finish_non_exhaustive()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS)
    }
}
