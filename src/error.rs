//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Errors stay typed inside
//! the crate and are mapped to HTTP status codes only at the peer boundary.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// == Error Kind ==
/// Coarse classification of a [`CacheError`].
///
/// Carried in error bodies as `snake_case` so a requesting node can rebuild
/// the kind of a failure raised on the owning peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The key does not exist at the source
    NotFound,
    /// The embedding application's loader failed
    Source,
    /// Talking to a remote peer failed
    PeerTransport,
    /// A wire payload could not be decoded
    Decode,
    /// Invalid argument or configuration
    Config,
}

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Cloneable so every caller waiting on a de-duplicated load receives the
/// same error.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Key absent at the source
    #[error("key '{key}' not found in group '{group}'")]
    NotFound { group: String, key: String },

    /// Opaque failure from a group's loader
    #[error("loading key '{key}' in group '{group}' failed: {cause}")]
    Source {
        group: String,
        key: String,
        cause: Arc<anyhow::Error>,
    },

    /// Connection failure or non-success status from a peer
    #[error("peer {peer} request failed: {reason}")]
    PeerTransport {
        peer: String,
        status: Option<u16>,
        reason: String,
    },

    /// Malformed wire payload
    #[error("peer {peer} sent an undecodable response: {reason}")]
    Decode { peer: String, reason: String },

    /// Empty key argument
    #[error("key is required")]
    EmptyKey,

    /// A group with this name is already registered
    #[error("group '{0}' is already registered")]
    DuplicateGroup(String),

    /// Peers were already attached to this group
    #[error("peers already registered for group '{0}'")]
    PeersAlreadyRegistered(String),

    /// Request path does not match `{prefix}{group}/{key}`
    #[error("malformed request path: {0}")]
    MalformedPath(String),

    /// No group registered under this name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    // == Kind ==
    /// Returns the coarse error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheError::NotFound { .. } => ErrorKind::NotFound,
            CacheError::Source { .. } => ErrorKind::Source,
            CacheError::PeerTransport { .. } => ErrorKind::PeerTransport,
            CacheError::Decode { .. } => ErrorKind::Decode,
            CacheError::EmptyKey
            | CacheError::DuplicateGroup(_)
            | CacheError::PeersAlreadyRegistered(_)
            | CacheError::MalformedPath(_)
            | CacheError::GroupNotFound(_)
            | CacheError::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// True when the data does not exist, as opposed to infrastructure failing.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

// == Error Body ==
/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: ErrorKind,
}

// == IntoResponse Implementation ==
/// Peer-facing status mapping: routing failures are 404, any failure of a
/// known group to produce a value is 500.
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::MalformedPath(_) | CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
