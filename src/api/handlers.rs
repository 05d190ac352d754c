//! API Handlers
//!
//! Serves lookups delegated by other nodes:
//! `GET {base_path}{group}/{key}` answers with an encoded [`GetResponse`].

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::models::{encode_response, GetResponse};
use crate::peer::HttpPool;

/// Content type of every successful peer response
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Splits `{base_path}{group}/{key}` into decoded segments.
///
/// Splitting happens on the raw path, so an escaped `/` (`%2F`) stays part of
/// its segment. Both segments must be non-empty.
pub fn parse_peer_path(base_path: &str, path: &str) -> Result<(String, String)> {
    let malformed = || CacheError::MalformedPath(path.to_string());

    let rest = path.strip_prefix(base_path).ok_or_else(malformed)?;
    let (group, key) = rest.split_once('/').ok_or_else(malformed)?;
    if group.is_empty() || key.is_empty() {
        return Err(malformed());
    }

    let group = urlencoding::decode(group).map_err(|_| malformed())?;
    let key = urlencoding::decode(key).map_err(|_| malformed())?;
    Ok((group.into_owned(), key.into_owned()))
}

/// Handler for every path under the pool's base path.
///
/// Unknown groups and malformed paths are 404; any failure of a known group to
/// produce the value is 500.
pub async fn serve_peer(
    State(pool): State<Arc<HttpPool>>,
    method: Method,
    uri: Uri,
) -> Result<Response> {
    if method != Method::GET {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    }

    let (group_name, key) = parse_peer_path(pool.base_path(), uri.path())?;
    debug!(node = %pool.self_url(), group = %group_name, key = %key, "serving peer request");

    let group = pool
        .registry()
        .get_group(&group_name)
        .ok_or(CacheError::GroupNotFound(group_name))?;
    let view = group.get(&key).await?;

    let body = encode_response(&GetResponse::new(view.to_bytes()));
    Ok(([(header::CONTENT_TYPE, OCTET_STREAM)], body).into_response())
}
