//! The relay pipeline: fetch the upstream feed, recover from 403 via the
//! OAuth fallback, validate the payload, and shape the reply.

use reqwest::StatusCode;

use crate::reddit::client::{RedditClient, UpstreamResponse};
use crate::reddit::oauth::{attempt_fallback, Credentials, FallbackOutcome};

pub const CACHE_CONTROL_EDGE: &str = "s-maxage=60, stale-while-revalidate=300";
pub const NOT_JSON_BODY: &str = "Upstream did not return JSON";
const ERROR_BODY_LIMIT: usize = 200;
const FALLBACK_ERROR_MESSAGE: &str = "proxy error";

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// A transport-agnostic reply. The serving layer turns this into an HTTP
/// response and layers the CORS header on every branch.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub status: u16,
    pub content_type: &'static str,
    pub cache_control: Option<&'static str>,
    pub body: String,
}

impl ProxyReply {
    /// Upstream JSON forwarded byte-for-byte, with edge caching enabled.
    fn passthrough(body: String) -> Self {
        Self {
            status: 200,
            content_type: CONTENT_TYPE_JSON,
            cache_control: Some(CACHE_CONTROL_EDGE),
            body,
        }
    }

    /// Upstream refused: forward its status with a short plaintext summary.
    fn upstream_error(upstream: &UpstreamResponse) -> Self {
        let reason = upstream.status.canonical_reason().unwrap_or("");
        let body = format!(
            "Upstream error: {} {}\n{}",
            upstream.status.as_u16(),
            reason,
            truncate_chars(&upstream.body, ERROR_BODY_LIMIT)
        );
        Self {
            status: upstream.status.as_u16(),
            content_type: CONTENT_TYPE_TEXT,
            cache_control: None,
            body,
        }
    }

    /// Upstream answered 2xx but the body is not JSON.
    fn not_json() -> Self {
        Self {
            status: 502,
            content_type: CONTENT_TYPE_TEXT,
            cache_control: None,
            body: NOT_JSON_BODY.to_string(),
        }
    }

    /// Anything that escaped the pipeline: network failures, body-read
    /// failures, and other internal errors.
    fn internal(err: &anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        let message = if message.is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        Self {
            status: 500,
            content_type: CONTENT_TYPE_JSON,
            cache_control: None,
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }
}

pub struct RedditProxy {
    client: RedditClient,
    credentials: Option<Credentials>,
}

impl RedditProxy {
    pub fn new(client: RedditClient, credentials: Option<Credentials>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Handle one inbound request. Infallible by design: every failure mode
    /// maps onto a reply in the error taxonomy.
    pub async fn handle(&self) -> ProxyReply {
        match self.relay().await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "relay failed");
                ProxyReply::internal(&e)
            }
        }
    }

    async fn relay(&self) -> anyhow::Result<ProxyReply> {
        let mut upstream = self.client.fetch_feed().await?;

        if upstream.status == StatusCode::FORBIDDEN {
            match &self.credentials {
                Some(credentials) => {
                    match attempt_fallback(&self.client, credentials).await {
                        FallbackOutcome::Replaced(replacement) => upstream = replacement,
                        FallbackOutcome::NoImprovement => {}
                    }
                }
                None => {
                    tracing::debug!("upstream returned 403 and no oauth credentials are configured");
                }
            }
        }

        if !upstream.status.is_success() {
            tracing::warn!(
                status = upstream.status.as_u16(),
                "forwarding upstream error"
            );
            return Ok(ProxyReply::upstream_error(&upstream));
        }

        let payload: serde_json::Value = match serde_json::from_str(&upstream.body) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(
                    content_type = %upstream.content_type,
                    error = %e,
                    "upstream body is not JSON"
                );
                return Ok(ProxyReply::not_json());
            }
        };

        tracing::info!(
            status = upstream.status.as_u16(),
            content_type = %upstream.content_type,
            posts = listing_post_count(&payload),
            "relayed feed"
        );
        Ok(ProxyReply::passthrough(upstream.body))
    }
}

/// `data.children` length when the payload looks like a listing, else 0.
fn listing_post_count(payload: &serde_json::Value) -> usize {
    payload
        .pointer("/data/children")
        .and_then(|c| c.as_array())
        .map_or(0, |a| a.len())
}

/// First `max` characters of `s`, cut on a character boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
