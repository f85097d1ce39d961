//! External calls made by `apiBlock`s and the summary stored from their response.

use crate::error::FetchError;
use async_trait::async_trait;
use itertools::Itertools;
use serde_json::Value as Json;

/// Performs the request behind an external-call block.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Json, FetchError>;
}

/// Fetcher backed by a shared `reqwest` client issuing plain GET requests.
#[cfg(feature = "http-fetch")]
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "http-fetch")]
impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http-fetch")]
#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Json, FetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Derives the text stored in the block's variable from a JSON response.
///
/// Lists become one line per entry, preferring an entry's `name`. An object
/// wrapping a single list (`{"clinics": [...]}`) is summarized as that list.
pub fn summarize(response: &Json) -> String {
    match response {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        Json::Array(items) => items.iter().map(summarize_entry).join("\n"),
        Json::Object(fields) => {
            let mut lists = fields.values().filter(|value| value.is_array());
            match (lists.next(), lists.next()) {
                (Some(list), None) => summarize(list),
                _ => summarize_entry(response),
            }
        }
    }
}

fn summarize_entry(entry: &Json) -> String {
    match entry {
        Json::Object(fields) => match fields.get("name") {
            Some(Json::String(name)) => name.clone(),
            _ => entry.to_string(),
        },
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}
