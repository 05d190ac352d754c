//! API Routes
//!
//! Builds the Axum router a node serves to its peers.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::serve_peer;
use crate::peer::HttpPool;

/// Creates the peer-facing router.
///
/// Every path is handed to [`serve_peer`], which matches the pool's base path
/// itself so the prefix stays a runtime setting. Requests are traced through
/// `tower-http`.
pub fn create_router(pool: Arc<HttpPool>) -> Router {
    Router::new()
        .fallback(serve_peer)
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}
