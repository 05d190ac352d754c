//! Integration Tests for the Peer Surface
//!
//! Drives the router in-process and runs real nodes on ephemeral ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use peercache::api::create_router;
use peercache::models::{decode_response, GetRequest};
use peercache::peer::{HttpGetter, PeerGetter, TransportOptions};
use peercache::{CacheError, ErrorKind, Group, GroupRegistry, HttpPool, LoadError, LoaderFn, PeerPicker};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

// == Helper Functions ==

fn scores_db() -> HashMap<&'static str, &'static str> {
    HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567"), ("a/b c", "escaped")])
}

fn player_score(key: &str) -> String {
    format!("{}-score", key)
}

/// Registers a `scores` group whose loader counts calls.
fn scores_registry() -> (Arc<GroupRegistry>, Arc<Group>, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let db = scores_db();
    let registry = Arc::new(GroupRegistry::new());
    let group = registry
        .create_group(
            "scores",
            2 << 10,
            LoaderFn::new(move |key: &str| {
                counter.fetch_add(1, Ordering::SeqCst);
                match db.get(key) {
                    Some(score) => Ok(score.as_bytes().to_vec()),
                    None if key.starts_with("player-") => Ok(player_score(key).into_bytes()),
                    None => Err(LoadError::NotFound(key.to_string())),
                }
            }),
        )
        .unwrap();
    (registry, group, loads)
}

fn create_test_app() -> Router {
    let (registry, _, _) = scores_registry();
    create_router(Arc::new(HttpPool::new("http://localhost:8001", registry)))
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> axum::body::Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

struct Node {
    url: String,
    pool: Arc<HttpPool>,
    group: Arc<Group>,
    loads: Arc<AtomicUsize>,
}

/// Starts a node serving `scores` on an ephemeral port, without peers yet.
async fn spawn_node() -> Node {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (registry, group, loads) = scores_registry();
    let pool = Arc::new(HttpPool::new(url.clone(), registry));

    let app = create_router(Arc::clone(&pool));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Node {
        url,
        pool,
        group,
        loads,
    }
}

/// Joins the nodes into one cluster.
fn connect(nodes: &[&Node]) {
    let urls: Vec<String> = nodes.iter().map(|node| node.url.clone()).collect();
    for node in nodes {
        node.pool.set_peers(urls.clone());
        node.group.register_peers(node.pool.clone()).unwrap();
    }
}

/// A key with the given prefix owned by some other node, from `node`'s point
/// of view.
fn remote_key(node: &Node, prefix: &str) -> String {
    (0..500)
        .map(|i| format!("{}{}", prefix, i))
        .find(|key| node.pool.pick_peer(key).is_some())
        .unwrap()
}

// == Router Tests ==

#[tokio::test]
async fn test_lookup_returns_encoded_value() {
    let response = get(create_test_app(), "/cache/scores/Tom").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/octet-stream"
    );
    let body = body_bytes(response).await;
    assert_eq!(decode_response(&body).unwrap().value.as_ref(), b"630");
}

#[tokio::test]
async fn test_lookup_escaped_key() {
    let response = get(create_test_app(), "/cache/scores/a%2Fb%20c").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert_eq!(decode_response(&body).unwrap().value.as_ref(), b"escaped");
}

#[tokio::test]
async fn test_unknown_group_is_not_found() {
    let response = get(create_test_app(), "/cache/bogus-group/Tom").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(json["error"].as_str().unwrap().contains("bogus-group"));
}

#[tokio::test]
async fn test_missing_key_is_server_error() {
    let response = get(create_test_app(), "/cache/scores/NoSuchKey").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["kind"], "not_found");
}

#[tokio::test]
async fn test_malformed_paths_are_not_found() {
    for uri in ["/invalid/path", "/cache/scores", "/cache/scores/", "/cache//Tom"] {
        let response = get(create_test_app(), uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn test_repeated_lookups_hit_cache() {
    let (registry, group, loads) = scores_registry();
    let app = create_router(Arc::new(HttpPool::new("http://localhost:8001", registry)));

    for _ in 0..3 {
        let response = get(app.clone(), "/cache/scores/Jack").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(group.stats().cache_hits, 2);
}

// == Cluster Tests ==

#[tokio::test]
async fn test_getter_against_running_node() {
    let node = spawn_node().await;
    let getter = HttpGetter::new(
        format!("{}/cache/", node.url),
        reqwest::Client::new(),
        TransportOptions::default(),
    );

    let response = getter.get(&GetRequest::new("scores", "a/b c")).await.unwrap();
    assert_eq!(response.value.as_ref(), b"escaped");

    let err = getter
        .get(&GetRequest::new("scores", "NoSuchKey"))
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::NotFound { ref key, .. } if key == "NoSuchKey"));
}

#[tokio::test]
async fn test_two_nodes_delegate_to_owner() {
    let a = spawn_node().await;
    let b = spawn_node().await;
    connect(&[&a, &b]);

    let key = remote_key(&a, "player-");
    assert!(b.pool.pick_peer(&key).is_none(), "nodes agree on the owner");

    let first = a.group.get(&key).await.unwrap();
    let second = a.group.get(&key).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_string(), player_score(&key));
    // The owner loads once and serves the second request from its cache
    assert_eq!(b.loads.load(Ordering::SeqCst), 1);
    assert_eq!(b.group.stats().cache_hits, 1);
    // The requester never loads and keeps no copy
    assert_eq!(a.loads.load(Ordering::SeqCst), 0);
    let stats = a.group.stats();
    assert_eq!(stats.peer_loads, 2);
    assert_eq!(stats.cache.entries, 0);
}

#[tokio::test]
async fn test_remote_miss_is_not_found() {
    let a = spawn_node().await;
    let b = spawn_node().await;
    connect(&[&a, &b]);

    let key = remote_key(&a, "missing-");

    let err = a.group.get(&key).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(a.loads.load(Ordering::SeqCst), 0);
    assert_eq!(b.loads.load(Ordering::SeqCst), 1);
    assert_eq!(a.group.stats().peer_errors, 0);
}

#[tokio::test]
async fn test_unreachable_owner_does_not_fall_back() {
    let a = spawn_node().await;
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_url = format!("http://{}", dead.local_addr().unwrap());
    drop(dead);

    a.pool.set_peers([a.url.clone(), dead_url]);
    a.group.register_peers(a.pool.clone()).unwrap();
    let key = remote_key(&a, "player-");

    let err = a.group.get(&key).await.unwrap_err();

    assert!(matches!(err, CacheError::PeerTransport { status: None, .. }));
    assert_eq!(a.loads.load(Ordering::SeqCst), 0);
    assert_eq!(a.group.stats().peer_errors, 1);
}
