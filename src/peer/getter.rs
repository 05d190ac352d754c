//! HTTP Peer Getter
//!
//! Client side of the peer protocol: `GET {base_url}{group}/{key}` returning an
//! encoded [`GetResponse`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{CacheError, ErrorBody, ErrorKind, Result};
use crate::models::{decode_response, GetRequest, GetResponse};
use crate::peer::PeerGetter;

/// Per-call timeout unless configured otherwise
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(3);

// == Transport Options ==
/// Timeout and retry behaviour for peer calls.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Upper bound for one request, connect to last body byte
    pub timeout: Duration,
    /// Retry once when the connection itself could not be established
    pub retry_on_connect: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PEER_TIMEOUT,
            retry_on_connect: true,
        }
    }
}

// == HTTP Getter ==
/// Fetches values from one remote peer.
///
/// Non-success statuses are never retried. Dropping the returned future
/// cancels the request.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base_url: String,
    client: reqwest::Client,
    options: TransportOptions,
}

impl HttpGetter {
    // == Constructor ==
    /// `base_url` is the peer address followed by the routing prefix,
    /// e.g. `http://10.0.0.2:8001/cache/`.
    pub fn new(base_url: impl Into<String>, client: reqwest::Client, options: TransportOptions) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            options,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &GetRequest) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(&request.group),
            urlencoding::encode(&request.key)
        )
    }

    async fn send(&self, url: &str) -> std::result::Result<reqwest::Response, reqwest::Error> {
        self.client
            .get(url)
            .timeout(self.options.timeout)
            .send()
            .await
    }

    fn transport_error(&self, status: Option<u16>, reason: impl Into<String>) -> CacheError {
        CacheError::PeerTransport {
            peer: self.base_url.clone(),
            status,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, request: &GetRequest) -> Result<GetResponse> {
        let url = self.url_for(request);
        debug!(%url, "fetching from peer");

        let response = retry_on_connect(self.options.retry_on_connect, || self.send(&url))
            .await
            .map_err(|err| self.transport_error(None, err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // A key missing at the owner arrives as a 500 whose body says `not_found`
            let body = response.bytes().await.unwrap_or_default();
            let kind = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .map(|body| body.kind);
            if kind == Some(ErrorKind::NotFound) {
                return Err(CacheError::NotFound {
                    group: request.group.clone(),
                    key: request.key.clone(),
                });
            }
            return Err(self.transport_error(
                Some(status.as_u16()),
                format!("server returned {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(None, format!("reading response body: {}", err)))?;

        decode_response(&body).map_err(|err| CacheError::Decode {
            peer: self.base_url.clone(),
            reason: err.to_string(),
        })
    }
}

/// Runs `attempt`, running it once more when enabled and the first attempt
/// could not connect.
async fn retry_on_connect<T, F, Fut>(enabled: bool, mut attempt: F) -> reqwest::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = reqwest::Result<T>>,
{
    match attempt().await {
        Err(err) if enabled && err.is_connect() => {
            warn!(error = %err, "peer connection failed, retrying once");
            attempt().await
        }
        result => result,
    }
}
