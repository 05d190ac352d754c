//! Peercache - a distributed read-through cache
//!
//! Each node keeps byte-bounded LRU/LFU caches per named group, loads missing
//! keys through an application-supplied loader, and routes every key to the
//! node that owns it over a consistent-hash ring.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peer;

pub use cache::{ByteView, Cache, EvictionPolicy};
pub use config::Config;
pub use error::{CacheError, ErrorBody, ErrorKind, Result};
pub use group::{Group, GroupOptions, GroupRegistry, LoadError, Loader, LoaderFn};
pub use peer::{HttpPool, PeerGetter, PeerPicker};
