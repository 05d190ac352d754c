//! Cache Module
//!
//! Byte-budgeted in-memory caching with pluggable eviction (LRU, LFU) and lazy
//! TTL expiration.

mod byteview;
mod entry;
mod lfu;
pub(crate) mod list;
mod lru;
mod stats;
mod store;
pub(crate) mod strategy;


// Re-export public types
pub use byteview::ByteView;
pub use entry::{entry_size, expire_after, CacheEntry};
pub use lfu::LfuStrategy;
pub use lru::LruStrategy;
pub use stats::CacheStats;
pub use store::Cache;
pub use strategy::{EvictionPolicy, EvictionStrategy, RemovalObserver};

// == Public Constants ==
/// Byte budget of a default-constructed cache
pub const DEFAULT_MAX_BYTES: usize = 1024;
