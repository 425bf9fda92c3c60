//! Feed source for the viewer: fetches the post list through the relay's own
//! endpoint, with cooperative cancellation for in-flight requests.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::{mpsc, watch};

use crate::reddit::types::{Listing, Post};

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_posts(&self) -> Result<Vec<Post>>;
}

/// Fetches the listing from the relay's `/api/reddit` endpoint.
pub struct ProxyFeed {
    client: Client,
    url: String,
}

impl ProxyFeed {
    pub fn new(url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl FeedSource for ProxyFeed {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("feed request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            );
        }

        let listing: Listing = resp
            .json()
            .await
            .context("failed to parse feed response")?;
        Ok(listing.data.children.into_iter().map(|c| c.data).collect())
    }
}

/// Outcome of one fetch, reported to the viewer loop.
#[derive(Debug)]
pub enum FetchEvent {
    Loaded(Vec<Post>),
    Failed(String),
}

/// Cancellation handle for an in-flight fetch.
pub struct FetchHandle {
    cancel_tx: watch::Sender<bool>,
}

impl FetchHandle {
    /// Signal the fetch task to stop. A cancelled fetch reports nothing.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }
}

/// Spawn a cancellable fetch. The task races the request against the cancel
/// signal; the cancelled arm drops the request and sends no event, so an
/// aborted fetch can never surface as an error in the viewer.
pub fn spawn_fetch(source: Arc<dyn FeedSource>, events_tx: mpsc::Sender<FetchEvent>) -> FetchHandle {
    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel_rx.changed() => {}
            outcome = source.fetch_posts() => {
                let event = match outcome {
                    Ok(posts) => FetchEvent::Loaded(posts),
                    Err(e) => FetchEvent::Failed(format!("{:#}", e)),
                };
                let _ = events_tx.send(event).await;
            }
        }
    });
    FetchHandle { cancel_tx }
}
