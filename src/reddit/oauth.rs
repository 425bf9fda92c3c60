//! OAuth client-credentials fallback for 403 responses from the public feed.

use anyhow::Result;
use base64::Engine as _;

use super::client::{RedditClient, UpstreamResponse};

/// Reddit app credentials for the client-credentials grant.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// Both halves must be non-empty for the fallback to be usable.
    pub fn from_parts(client_id: Option<String>, client_secret: Option<String>) -> Option<Self> {
        match (client_id, client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some(Self {
                client_id: id,
                client_secret: secret,
            }),
            _ => None,
        }
    }

    /// HTTP Basic credential: base64 of the literal `id:secret`.
    pub fn basic(&self) -> String {
        base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.client_id, self.client_secret))
    }
}

/// What the fallback produced.
#[derive(Debug)]
pub enum FallbackOutcome {
    /// The authenticated retry completed; use its response instead, whatever
    /// its status.
    Replaced(UpstreamResponse),
    /// Nothing better than the response already held.
    NoImprovement,
}

/// Attempt the client-credentials fallback after a 403.
///
/// Never propagates an error: any failure in the token exchange or the
/// retried fetch is logged and reported as `NoImprovement`, so the caller
/// keeps the response it already has.
pub async fn attempt_fallback(client: &RedditClient, credentials: &Credentials) -> FallbackOutcome {
    match bearer_retry(client, credentials).await {
        Ok(replacement) => {
            tracing::info!(
                status = replacement.status.as_u16(),
                "oauth fallback produced a response"
            );
            FallbackOutcome::Replaced(replacement)
        }
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "oauth fallback failed, keeping original response");
            FallbackOutcome::NoImprovement
        }
    }
}

async fn bearer_retry(
    client: &RedditClient,
    credentials: &Credentials,
) -> Result<UpstreamResponse> {
    let token = client.request_token(&credentials.basic()).await?;
    client.fetch_feed_bearer(&token).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_credential_encoding() {
        let creds = Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        };
        // base64("id:secret")
        assert_eq!(creds.basic(), "aWQ6c2VjcmV0");
    }

    #[test]
    fn test_from_parts_requires_both_halves() {
        assert!(Credentials::from_parts(Some("id".into()), Some("secret".into())).is_some());
        assert!(Credentials::from_parts(Some("id".into()), None).is_none());
        assert!(Credentials::from_parts(None, Some("secret".into())).is_none());
        assert!(Credentials::from_parts(None, None).is_none());
        assert!(Credentials::from_parts(Some("".into()), Some("secret".into())).is_none());
        assert!(Credentials::from_parts(Some("id".into()), Some("".into())).is_none());
    }
}
