//! Upstream fetches against the Reddit listing and token endpoints.
//!
//! The public listing endpoint refuses bare server-to-server requests, so the
//! plain fetch impersonates a desktop browser (user agent, Accept, Referer).
//! The bearer leg used by the OAuth fallback hits the oauth.reddit.com mirror
//! and only carries the user agent plus the token.

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode};
use std::time::Duration;

use super::types::TokenResponse;

pub const DEFAULT_FEED_URL: &str = "https://www.reddit.com/r/reactjs.json";
pub const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const DEFAULT_BEARER_FEED_URL: &str = "https://oauth.reddit.com/r/reactjs.json";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";
const BROWSER_REFERER: &str = "https://www.reddit.com/";

/// A captured upstream exchange: whatever came back, body included.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
}

pub struct RedditClient {
    client: Client,
    feed_url: String,
    token_url: String,
    bearer_feed_url: String,
}

impl RedditClient {
    /// URLs are parameters so tests can point every leg at a local stub.
    pub fn new(feed_url: &str, token_url: &str, bearer_feed_url: &str, timeout_ms: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            feed_url: feed_url.to_string(),
            token_url: token_url.to_string(),
            bearer_feed_url: bearer_feed_url.to_string(),
        }
    }

    /// Plain listing fetch with the browser-impersonating header set.
    pub async fn fetch_feed(&self) -> Result<UpstreamResponse> {
        let resp = self
            .client
            .get(&self.feed_url)
            .header(header::ACCEPT, BROWSER_ACCEPT)
            .header(header::REFERER, BROWSER_REFERER)
            .send()
            .await
            .context("feed request failed")?;
        capture(resp).await
    }

    /// Listing fetch against the authenticated mirror.
    pub async fn fetch_feed_bearer(&self, token: &str) -> Result<UpstreamResponse> {
        let resp = self
            .client
            .get(&self.bearer_feed_url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .context("bearer feed request failed")?;
        capture(resp).await
    }

    /// Exchange an HTTP Basic app credential for a bearer token.
    pub async fn request_token(&self, basic_credential: &str) -> Result<String> {
        let resp = self
            .client
            .post(&self.token_url)
            .header(header::AUTHORIZATION, format!("Basic {}", basic_credential))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("token request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("token exchange failed ({}): {}", status, body);
        }

        let token: TokenResponse = resp
            .json()
            .await
            .context("failed to parse token response")?;
        if token.access_token.is_empty() {
            anyhow::bail!("token response carried no access_token");
        }
        Ok(token.access_token)
    }
}

async fn capture(resp: reqwest::Response) -> Result<UpstreamResponse> {
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    // Error bodies are forwarded best-effort; a failed read becomes "".
    let body = if status.is_success() {
        resp.text().await.context("upstream body read failed")?
    } else {
        resp.text().await.unwrap_or_default()
    };
    Ok(UpstreamResponse {
        status,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Integration test: hits the real Reddit endpoint.
    /// Run with: cargo test reddit_live -- --ignored --nocapture
    #[tokio::test]
    #[ignore]
    async fn reddit_live_fetch() {
        let client = RedditClient::new(
            DEFAULT_FEED_URL,
            DEFAULT_TOKEN_URL,
            DEFAULT_BEARER_FEED_URL,
            10_000,
        );
        match client.fetch_feed().await {
            Ok(upstream) => {
                println!(
                    "status={} content_type={}",
                    upstream.status, upstream.content_type
                );
                let head: String = upstream.body.chars().take(120).collect();
                println!("body starts: {}", head);
            }
            Err(e) => println!("fetch error: {:#}", e),
        }
    }
}
