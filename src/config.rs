use crate::reddit::client::{DEFAULT_BEARER_FEED_URL, DEFAULT_FEED_URL, DEFAULT_TOKEN_URL};
use crate::reddit::oauth::Credentials;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const ENV_FILE: &str = ".env";
const CLIENT_ID_ENV: &str = "REDDIT_CLIENT_ID";
const CLIENT_SECRET_ENV: &str = "REDDIT_CLIENT_SECRET";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub reddit: RedditConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedditConfig {
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_bearer_feed_url")]
    pub bearer_feed_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_bearer_feed_url() -> String {
    DEFAULT_BEARER_FEED_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            token_url: default_token_url(),
            bearer_feed_url: default_bearer_feed_url(),
            request_timeout_ms: default_request_timeout_ms(),
            client_id: None,
            client_secret: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }

    /// OAuth app credentials, if configured anywhere. Environment variables
    /// override the config file, and both halves must be present; otherwise
    /// the 403 fallback stays disabled.
    pub fn oauth_credentials(&self) -> Option<Credentials> {
        let client_id = env_value(CLIENT_ID_ENV).or_else(|| self.reddit.client_id.clone());
        let client_secret =
            env_value(CLIENT_SECRET_ENV).or_else(|| self.reddit.client_secret.clone());
        Credentials::from_parts(client_id, client_secret)
    }
}

fn env_value(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(sanitize_value(&value)),
        _ => None,
    }
}

/// Strip carriage returns, BOM, and other invisible chars from a secret value.
fn sanitize_value(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:8787");
        assert_eq!(config.reddit.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.reddit.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.reddit.bearer_feed_url, DEFAULT_BEARER_FEED_URL);
        assert_eq!(config.reddit.request_timeout_ms, 10_000);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:8787");
        assert_eq!(config.reddit.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.reddit.request_timeout_ms, 10_000);
        assert!(config.reddit.client_id.is_none());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            listen = "0.0.0.0:9000"

            [reddit]
            feed_url = "http://127.0.0.1:1/feed"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:9000");
        assert_eq!(config.reddit.feed_url, "http://127.0.0.1:1/feed");
        assert_eq!(config.reddit.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn test_sanitize_value_strips_invisible_chars() {
        assert_eq!(sanitize_value("\u{feff}abc123\r"), "abc123");
        assert_eq!(sanitize_value("  secret  "), "secret");
    }
}
