//! Source Loader Module
//!
//! The capability a group uses to fetch a missing key from its backing source.

use async_trait::async_trait;
use thiserror::Error;

// == Load Error ==
/// Failure reported by a loader.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source has no value for the key
    #[error("key not found: {0}")]
    NotFound(String),

    /// Any other failure of the backing source
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

// == Loader ==
/// Fetches the raw bytes for a key from the backing source.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    async fn load(&self, key: &str) -> Result<Vec<u8>, LoadError>;
}

// == Loader Fn ==
/// Adapts a synchronous closure into a [`Loader`].
///
/// # Example
/// ```
/// use peercache::group::{LoadError, LoaderFn};
///
/// let loader = LoaderFn::new(|key: &str| match key {
///     "Tom" => Ok(b"630".to_vec()),
///     _ => Err(LoadError::NotFound(key.to_string())),
/// });
/// # let _ = loader;
/// ```
pub struct LoaderFn<F>(F);

impl<F> LoaderFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>, LoadError> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>, LoadError> + Send + Sync + 'static,
{
    async fn load(&self, key: &str) -> Result<Vec<u8>, LoadError> {
        (self.0)(key)
    }
}
