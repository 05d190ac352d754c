//! Peer Module
//!
//! Capabilities for delegating lookups to the node that owns a key, plus the
//! HTTP implementation of both sides.
//!
//! # Components
//! - [`PeerPicker`] - maps a key to the remote peer responsible for it
//! - [`PeerGetter`] - fetches a value from one remote peer
//! - [`HashRing`] - consistent-hash routing table
//! - [`HttpPool`] - picker over a set of HTTP peers, also serving inbound lookups
//! - [`HttpGetter`] - wire transport to one HTTP peer

pub mod getter;
pub mod pool;
pub mod ring;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GetRequest, GetResponse};

pub use getter::{HttpGetter, TransportOptions};
pub use pool::{HttpPool, DEFAULT_BASE_PATH};
pub use ring::{HashFn, HashRing, DEFAULT_REPLICAS};

// == Peer Getter ==
/// Fetches a value from a specific remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, request: &GetRequest) -> Result<GetResponse>;
}

// == Peer Picker ==
/// Deterministically maps a key to the remote peer that owns it.
pub trait PeerPicker: Send + Sync {
    /// Returns `None` when the key should be served locally, either because
    /// this node owns it or because no peers are configured.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}
