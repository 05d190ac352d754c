//! HTTP Peer Pool
//!
//! Routes keys to HTTP peers over a consistent-hash ring and holds the state
//! the inbound handler needs to serve other nodes' delegated lookups.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::group::GroupRegistry;
use crate::peer::{HashRing, HttpGetter, PeerGetter, PeerPicker, TransportOptions, DEFAULT_REPLICAS};

/// Routing prefix served and requested by default
pub const DEFAULT_BASE_PATH: &str = "/cache/";

// == Routing Table ==
/// Ring plus one transport per peer, always replaced as a unit.
#[derive(Debug, Default)]
struct RoutingTable {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
/// Peer set of one node.
///
/// Acts as the [`PeerPicker`] for the node's groups and carries the registry
/// and routing prefix used by the inbound handler.
#[derive(Debug)]
pub struct HttpPool {
    self_url: String,
    base_path: String,
    replicas: usize,
    registry: Arc<GroupRegistry>,
    client: reqwest::Client,
    options: TransportOptions,
    table: RwLock<RoutingTable>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for the node reachable at `self_url`
    /// (e.g. `http://10.0.0.1:8001`) with default prefix and transport options.
    pub fn new(self_url: impl Into<String>, registry: Arc<GroupRegistry>) -> Self {
        Self::with_options(self_url, registry, DEFAULT_BASE_PATH, TransportOptions::default())
    }

    pub fn with_options(
        self_url: impl Into<String>,
        registry: Arc<GroupRegistry>,
        base_path: impl Into<String>,
        options: TransportOptions,
    ) -> Self {
        Self {
            self_url: self_url.into(),
            base_path: base_path.into(),
            replicas: DEFAULT_REPLICAS,
            registry,
            client: reqwest::Client::new(),
            options,
            table: RwLock::new(RoutingTable::default()),
        }
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn registry(&self) -> &Arc<GroupRegistry> {
        &self.registry
    }

    // == Set Peers ==
    /// Replaces the peer set.
    ///
    /// The new table is built before the lock is taken and swapped in whole,
    /// so concurrent lookups see either the old or the new membership.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers.into_iter().map(Into::into).collect();

        let mut ring = HashRing::new(self.replicas);
        ring.add(&peers);
        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(
                    format!("{}{}", peer, self.base_path),
                    self.client.clone(),
                    self.options.clone(),
                );
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.table.write() = RoutingTable { ring, getters };
        info!(node = %self.self_url, peers = ?peers, "peer set updated");
    }

    /// Current peer base URLs, sorted.
    pub fn peer_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.table.read().getters.keys().cloned().collect();
        urls.sort();
        urls
    }

    /// Transport for one configured peer.
    pub fn getter(&self, peer: &str) -> Option<Arc<HttpGetter>> {
        self.table.read().getters.get(peer).cloned()
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let table = self.table.read();
        let peer = table.ring.get(key)?;
        if peer == self.self_url {
            return None;
        }

        debug!(node = %self.self_url, key, peer, "picked remote peer");
        table
            .getters
            .get(peer)
            .map(|getter| Arc::clone(getter) as Arc<dyn PeerGetter>)
    }
}
