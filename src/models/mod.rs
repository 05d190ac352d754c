//! Wire models for peer-to-peer requests
//!
//! Message types exchanged between cache nodes and their binary codec.

pub mod wire;

// Re-export commonly used types
pub use wire::{decode_response, encode_response, GetRequest, GetResponse};
