//! API Module
//!
//! HTTP surface a node exposes to its peers.
//!
//! # Endpoints
//! - `GET {base_path}{group}/{key}` - value for `key` in `group`, encoded as a
//!   `GetResponse` message (`application/octet-stream`)
//!
//! Malformed paths and unknown groups are 404, lookup failures 500, other
//! methods 405. Error bodies are JSON `{"error": "..."}`.

pub mod handlers;
pub mod routes;

pub use handlers::{parse_peer_path, serve_peer};
pub use routes::create_router;
