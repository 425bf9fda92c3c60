//! Wire types for the Reddit listing and token endpoints.
//!
//! Every field defaults when absent so partial upstream records still parse;
//! the listing shape is `{"data": {"children": [{"data": {...post...}}]}}`.

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct Listing {
    #[serde(default)]
    pub data: ListingData,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Child>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Child {
    #[serde(default)]
    pub data: Post,
}

/// One post from the subreddit listing.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Post {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// Creation time as fractional epoch seconds, the way Reddit reports it.
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub url: String,
    /// Either an http(s) URL or a sentinel like "self" / "default".
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub selftext_html: Option<String>,
    #[serde(default)]
    pub score: i64,
}

impl Post {
    /// Creation time floored to whole epoch seconds.
    pub fn created_secs(&self) -> i64 {
        self.created_utc as i64
    }
}

/// Reply from the OAuth token endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
}
