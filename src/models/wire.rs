//! Binary wire messages
//!
//! Protocol Buffers messages shared by the peer client and server. The schema
//! is declared directly with `prost` derives:
//!
//! ```text
//! message GetRequest  { string group = 1; string key = 2; }
//! message GetResponse { bytes value = 1; }
//! ```

use bytes::Bytes;
use prost::Message;

/// A lookup for one key in one group.
#[derive(Clone, PartialEq, Eq, Message)]
pub struct GetRequest {
    #[prost(string, tag = "1")]
    pub group: String,
    #[prost(string, tag = "2")]
    pub key: String,
}

impl GetRequest {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }
}

/// The value held for the requested key.
#[derive(Clone, PartialEq, Eq, Message)]
pub struct GetResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub value: Bytes,
}

impl GetResponse {
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Serializes a response body.
pub fn encode_response(response: &GetResponse) -> Vec<u8> {
    response.encode_to_vec()
}

/// Parses a response body.
pub fn decode_response(body: &[u8]) -> Result<GetResponse, prost::DecodeError> {
    GetResponse::decode(body)
}
