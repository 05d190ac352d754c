//! Group Module
//!
//! Named cache namespaces and the registry that owns them.
//!
//! # Components
//! - [`Group`] - local cache + loader + optional peer delegation
//! - [`GroupRegistry`] - create-once, read-many namespace registry
//! - [`Loader`] - source-loading capability supplied by the application
//! - [`SingleFlight`] - per-key request de-duplication

mod flight;
mod loader;
mod namespace;
mod registry;
mod stats;

pub use flight::SingleFlight;
pub use loader::{LoadError, Loader, LoaderFn};
pub use namespace::{Group, GroupOptions};
pub use registry::GroupRegistry;
pub use stats::GroupStats;
