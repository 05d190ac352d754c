//! Byte View Module
//!
//! Immutable byte payload stored by the cache.

use std::fmt;

use bytes::Bytes;

// == Byte View ==
/// An immutable view over a cached byte payload.
///
/// Clones share the same underlying buffer, which can never be mutated once the
/// view is built. Callers that need an owned, mutable buffer use [`ByteView::to_vec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    // == Constructor ==
    /// Creates a view over the given bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Creates a view by copying a borrowed slice.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    // == Length ==
    /// Returns the payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // == Copy Out ==
    /// Returns a defensive copy of the payload.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Borrows the payload.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the shared buffer, used when handing the payload to the wire codec.
    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl From<&'static str> for ByteView {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ByteView {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}
