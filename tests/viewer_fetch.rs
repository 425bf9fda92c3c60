//! Fetch-task contract for the viewer: outcomes arrive as events, and a
//! cancelled fetch reports nothing at all.

use anyhow::Result;
use async_trait::async_trait;
use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use reddit_relay::feed::{spawn_fetch, FeedSource, FetchEvent, ProxyFeed};
use reddit_relay::reddit::types::Post;

const LISTING_BODY: &str = r#"{"data":{"children":[{"data":{"id":"abc","title":"First","author":"alice","created_utc":1755000000.0,"url":"https://example.com/a","thumbnail":"self","selftext":"hi","score":2}},{"data":{"id":"def","title":"Second","author":"bob","created_utc":1755000100.0,"url":"https://example.com/b","thumbnail":"default","selftext":"","score":0}}]}}"#;

async fn spawn_stub(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A source that never completes, standing in for a slow upstream.
struct StalledSource;

#[async_trait]
impl FeedSource for StalledSource {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        std::future::pending::<()>().await;
        unreachable!()
    }
}

#[tokio::test]
async fn test_cancelled_fetch_reports_nothing() {
    let (events_tx, mut events_rx) = mpsc::channel(4);
    let handle = spawn_fetch(Arc::new(StalledSource), events_tx);

    handle.cancel();

    // Once the task exits without sending, the only sender drops and recv
    // yields None. An event here would mean the cancelled fetch leaked an
    // outcome; a timeout would mean it never stopped.
    match timeout(Duration::from_secs(1), events_rx.recv()).await {
        Ok(None) => {}
        Ok(Some(event)) => panic!("cancelled fetch delivered an event: {:?}", event),
        Err(_) => panic!("cancelled fetch task did not stop"),
    }
}

#[tokio::test]
async fn test_completed_fetch_delivers_posts() {
    let app = Router::new().route(
        "/api/reddit",
        get(|| async { ([(header::CONTENT_TYPE, "application/json")], LISTING_BODY) }),
    );
    let addr = spawn_stub(app).await;
    let source = Arc::new(ProxyFeed::new(&format!("http://{}/api/reddit", addr)));

    let (events_tx, mut events_rx) = mpsc::channel(4);
    spawn_fetch(source, events_tx);

    let event = timeout(Duration::from_secs(3), events_rx.recv())
        .await
        .expect("fetch did not complete")
        .expect("fetch task dropped without an event");
    match event {
        FetchEvent::Loaded(posts) => {
            assert_eq!(posts.len(), 2);
            assert_eq!(posts[0].title, "First");
            assert_eq!(posts[1].author, "bob");
        }
        FetchEvent::Failed(message) => panic!("fetch failed: {}", message),
    }
}

#[tokio::test]
async fn test_failed_fetch_reports_error_message() {
    let app = Router::new().route(
        "/api/reddit",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "relay down") }),
    );
    let addr = spawn_stub(app).await;
    let source = Arc::new(ProxyFeed::new(&format!("http://{}/api/reddit", addr)));

    let (events_tx, mut events_rx) = mpsc::channel(4);
    spawn_fetch(source, events_tx);

    let event = timeout(Duration::from_secs(3), events_rx.recv())
        .await
        .expect("fetch did not complete")
        .expect("fetch task dropped without an event");
    match event {
        FetchEvent::Failed(message) => {
            // The viewer surfaces "<status> <statusText>" like a browser would.
            assert_eq!(message, "503 Service Unavailable");
        }
        FetchEvent::Loaded(_) => panic!("error response produced posts"),
    }
}

#[tokio::test]
async fn test_listing_without_children_yields_empty_posts() {
    let app = Router::new().route(
        "/api/reddit",
        get(|| async { ([(header::CONTENT_TYPE, "application/json")], r#"{"data":{}}"#) }),
    );
    let addr = spawn_stub(app).await;
    let source = Arc::new(ProxyFeed::new(&format!("http://{}/api/reddit", addr)));

    let (events_tx, mut events_rx) = mpsc::channel(4);
    spawn_fetch(source, events_tx);

    let event = timeout(Duration::from_secs(3), events_rx.recv())
        .await
        .expect("fetch did not complete")
        .expect("fetch task dropped without an event");
    match event {
        FetchEvent::Loaded(posts) => assert!(posts.is_empty()),
        FetchEvent::Failed(message) => panic!("fetch failed: {}", message),
    }
}
