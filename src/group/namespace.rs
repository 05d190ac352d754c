//! Group Module
//!
//! A named cache namespace: local cache, source loader, optional peer
//! delegation and per-key request de-duplication.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{expire_after, ByteView, Cache, EvictionPolicy};
use crate::error::{CacheError, Result};
use crate::group::flight::SingleFlight;
use crate::group::stats::{GroupCounters, GroupStats};
use crate::group::{LoadError, Loader};
use crate::models::GetRequest;
use crate::peer::{PeerGetter, PeerPicker};

// == Group Options ==
/// Construction parameters for a [`Group`].
#[derive(Debug, Clone)]
pub struct GroupOptions {
    /// Unique namespace name
    pub name: String,
    /// Byte budget of the group's cache
    pub max_bytes: usize,
    /// Eviction policy of the group's cache
    pub policy: EvictionPolicy,
    /// Lifetime of locally loaded entries, None = never expire
    pub ttl: Option<Duration>,
}

impl GroupOptions {
    pub fn new(name: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            name: name.into(),
            max_bytes,
            policy: EvictionPolicy::default(),
            ttl: None,
        }
    }

    pub fn policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

// == Group ==
/// One cache namespace.
///
/// Lookups check the local cache first. Misses run through a single-flight
/// load: the key's remote owner is asked if one is picked, otherwise the
/// local loader is called and its result cached.
///
/// Values fetched from a remote owner are returned but not cached here, so
/// only the owner holds a copy.
pub struct Group {
    name: String,
    cache: Cache,
    loader: Arc<dyn Loader>,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flights: SingleFlight<Result<ByteView>>,
    ttl: Option<Duration>,
    counters: GroupCounters,
}

impl Group {
    // == Constructor ==
    pub(crate) fn new(options: GroupOptions, loader: Arc<dyn Loader>) -> Self {
        Self {
            cache: Cache::with_policy(options.max_bytes, options.policy),
            name: options.name,
            loader,
            peers: OnceLock::new(),
            flights: SingleFlight::new(),
            ttl: options.ttl,
            counters: GroupCounters::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Attaches the peer picker consulted by subsequent loads.
    ///
    /// A group accepts one picker for its lifetime; later calls are rejected.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers
            .set(picker)
            .map_err(|_| CacheError::PeersAlreadyRegistered(self.name.clone()))
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a cache miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        self.counters.record_get();
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }

        if let Some(value) = self.cache.get(key) {
            self.counters.record_cache_hit();
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    // == Stats ==
    pub fn stats(&self) -> GroupStats {
        self.counters.snapshot(self.cache.stats())
    }

    /// Load path, de-duplicated per key.
    async fn load(&self, key: &str) -> Result<ByteView> {
        self.flights
            .run(key, || async {
                // A flight that finished just before this one started may
                // already have filled the cache.
                if let Some(value) = self.cache.get_unrecorded(key) {
                    return Ok(value);
                }

                match self.peers.get().and_then(|picker| picker.pick_peer(key)) {
                    Some(peer) => self.get_from_peer(peer, key).await,
                    None => self.get_locally(key).await,
                }
            })
            .await
    }

    async fn get_from_peer(&self, peer: Arc<dyn PeerGetter>, key: &str) -> Result<ByteView> {
        let request = GetRequest::new(self.name.as_str(), key);
        match peer.get(&request).await {
            Ok(response) => {
                self.counters.record_peer_load();
                debug!(group = %self.name, key, "loaded from peer");
                Ok(ByteView::new(response.value))
            }
            Err(err) if err.is_not_found() => {
                debug!(group = %self.name, key, "key not found at peer");
                Err(err)
            }
            Err(err) => {
                self.counters.record_peer_error();
                warn!(group = %self.name, key, error = %err, "peer load failed");
                Err(err)
            }
        }
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.loader.load(key).await.map_err(|err| {
            self.counters.record_loader_error();
            match err {
                LoadError::NotFound(_) => CacheError::NotFound {
                    group: self.name.clone(),
                    key: key.to_string(),
                },
                LoadError::Source(cause) => {
                    warn!(group = %self.name, key, error = %cause, "loader failed");
                    CacheError::Source {
                        group: self.name.clone(),
                        key: key.to_string(),
                        cause: Arc::new(cause),
                    }
                }
            }
        })?;

        self.counters.record_local_load();
        let value = ByteView::from(bytes);
        self.cache.add(key, value.clone(), expire_after(self.ttl));
        debug!(group = %self.name, key, bytes = value.len(), "loaded locally");
        Ok(value)
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .field("ttl", &self.ttl)
            .field("has_peers", &self.peers.get().is_some())
            .finish_non_exhaustive()
    }
}
