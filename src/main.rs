//! Peercache node
//!
//! Serves a demo `scores` group to its peers and delegates keys it does not
//! own.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peercache::api::create_router;
use peercache::{Config, GroupRegistry, HttpPool, LoadError, LoaderFn};

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Register the demo group and its loader
/// 4. Build the peer pool and attach it to the group
/// 5. Serve the peer router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting peercache node");

    let config = Config::from_env();
    config.validate()?;
    info!(
        self_url = %config.self_url,
        peers = ?config.peers,
        max_bytes = config.max_bytes,
        policy = %config.policy,
        ttl = ?config.ttl,
        "configuration loaded"
    );

    let registry = Arc::new(GroupRegistry::new());
    let db: HashMap<&'static str, &'static str> =
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);
    let scores = registry.create_group_with(
        config.group_options("scores"),
        Arc::new(LoaderFn::new(move |key: &str| {
            info!(key, "searching slow db");
            db.get(key)
                .map(|score| score.as_bytes().to_vec())
                .ok_or_else(|| LoadError::NotFound(key.to_string()))
        })),
    )?;

    let pool = Arc::new(HttpPool::with_options(
        config.self_url.clone(),
        Arc::clone(&registry),
        config.base_path.clone(),
        config.transport_options(),
    ));
    pool.set_peers(config.cluster_peers());
    scores.register_peers(pool.clone())?;

    let app = create_router(pool);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Node listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving peer requests")?;

    for name in registry.group_names() {
        if let Some(group) = registry.get_group(&name) {
            info!(group = %name, stats = ?group.stats(), "final group stats");
        }
    }
    info!("Node shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
