use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use reddit_relay::config::Config;
use reddit_relay::feed::ProxyFeed;
use reddit_relay::proxy::RedditProxy;
use reddit_relay::reddit::client::RedditClient;
use reddit_relay::server;
use reddit_relay::tui;

const LOG_FILE: &str = "reddit-relay.log";
const USAGE: &str = "usage: reddit-relay [--serve] [--config <path>]";

struct CliArgs {
    serve_only: bool,
    config_path: PathBuf,
}

fn parse_args() -> Result<CliArgs> {
    let mut serve_only = false;
    let mut config_path = PathBuf::from("config.toml");
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--serve" => serve_only = true,
            "--config" => {
                config_path = args
                    .next()
                    .map(PathBuf::from)
                    .with_context(|| format!("--config requires a path\n{}", USAGE))?;
            }
            other => anyhow::bail!("unknown flag: {}\n{}", other, USAGE),
        }
    }
    Ok(CliArgs {
        serve_only,
        config_path,
    })
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "reddit_relay=info".into())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;

    // The viewer owns the terminal, so interactive runs log to a file instead
    // of stderr.
    if args.serve_only {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .init();
    } else {
        let log_file = std::fs::File::create(LOG_FILE)
            .with_context(|| format!("Failed to create log file: {}", LOG_FILE))?;
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(log_file)
            .init();
    }

    // Load saved credentials from .env (real env vars take precedence)
    Config::load_env_file();
    let config = Config::load(&args.config_path)?;

    let credentials = config.oauth_credentials();
    if credentials.is_some() {
        tracing::info!("oauth credentials configured, 403 fallback enabled");
    } else {
        tracing::info!("no oauth credentials, 403 responses will surface unchanged");
    }

    let client = RedditClient::new(
        &config.reddit.feed_url,
        &config.reddit.token_url,
        &config.reddit.bearer_feed_url,
        config.reddit.request_timeout_ms,
    );
    let proxy = Arc::new(RedditProxy::new(client, credentials));

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;
    let local_addr = listener
        .local_addr()
        .context("listener has no local address")?;
    tracing::info!(addr = %local_addr, feed = %config.reddit.feed_url, "relay listening");

    if args.serve_only {
        return server::serve(listener, proxy).await;
    }

    let server_proxy = proxy.clone();
    tokio::spawn(async move {
        if let Err(e) = server::serve(listener, server_proxy).await {
            tracing::error!(error = %format!("{:#}", e), "relay server exited");
        }
    });

    let source = Arc::new(ProxyFeed::new(&format!("http://{}/api/reddit", local_addr)));
    tui::run_viewer(source).await
}
