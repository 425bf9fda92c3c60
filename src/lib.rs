//! Reddit feed relay: a CORS-shielding proxy for a subreddit listing plus a
//! terminal viewer that renders the relayed posts as searchable cards.

pub mod config;
pub mod feed;
pub mod proxy;
pub mod reddit;
pub mod server;
pub mod tui;
