use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, RETRY_AFTER},
};
use serde_json::Value;

use crate::types::{Country, ResourceKind, ResultItem};

/// Number of items requested per (kind, country) search.
pub const SEARCH_LIMIT: u32 = 10;

/// Terminal, non-retryable reason a single fetch produced no items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    Status(u16),
    Transport(String),
    InvalidInput(&'static str),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Status(status) => write!(f, "upstream answered with status {}", status),
            FetchFailure::Transport(e) => write!(f, "request failed: {}", e),
            FetchFailure::InvalidInput(what) => write!(f, "invalid input: {}", what),
        }
    }
}

/// Result of one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// HTTP 200. The list may be empty when the expected path was missing.
    Items(Vec<ResultItem>),
    /// HTTP 429. `retry_after` carries the server hint when present.
    RateLimited { retry_after: Option<Duration> },
    Failed(FetchFailure),
}

/// Fetches one page of results for a resource kind in one market.
///
/// Implementations perform exactly one outbound request per call and keep no
/// cache between calls.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, kind: ResourceKind, country: &Country, token: &str) -> FetchOutcome;
}

/// [`ResourceFetcher`] backed by the Web API `/search` endpoint.
#[derive(Debug, Clone)]
pub struct SpotifySearch {
    client: Client,
    api_url: String,
    limit: u32,
}

impl SpotifySearch {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_url)
    }

    pub fn with_client(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            limit: SEARCH_LIMIT,
        }
    }

    fn search_url(&self) -> String {
        format!("{uri}/search", uri = self.api_url)
    }
}

#[async_trait]
impl ResourceFetcher for SpotifySearch {
    async fn fetch(&self, kind: ResourceKind, country: &Country, token: &str) -> FetchOutcome {
        if token.is_empty() {
            return FetchOutcome::Failed(FetchFailure::InvalidInput("empty access token"));
        }
        if country.as_str().is_empty() {
            return FetchOutcome::Failed(FetchFailure::InvalidInput("empty market code"));
        }

        let limit = self.limit.to_string();
        let response = self
            .client
            .get(self.search_url())
            .bearer_auth(token)
            .query(&[
                ("q", kind.query_term()),
                ("type", kind.as_str()),
                ("market", country.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(resp) => resp,
            Err(err) => {
                tracing::error!(%kind, %country, error = %err, "search request failed");
                return FetchOutcome::Failed(FetchFailure::Transport(err.to_string()));
            }
        };

        match response.status() {
            StatusCode::OK => match response.json::<Value>().await {
                Ok(body) => FetchOutcome::Items(extract_items(&body, kind)),
                Err(err) => {
                    tracing::warn!(%kind, %country, error = %err, "malformed search response, using empty result");
                    FetchOutcome::Items(Vec::new())
                }
            },
            StatusCode::TOO_MANY_REQUESTS => FetchOutcome::RateLimited {
                retry_after: retry_after(response.headers()),
            },
            status => {
                tracing::error!(%kind, %country, status = status.as_u16(), "failed to fetch search results");
                FetchOutcome::Failed(FetchFailure::Status(status.as_u16()))
            }
        }
    }
}

/// Pulls `<kind plural>.items` out of a search response.
///
/// Any missing or mistyped segment yields an empty list; item order is kept.
pub fn extract_items(body: &Value, kind: ResourceKind) -> Vec<ResultItem> {
    body.get(kind.items_key())
        .and_then(|container| container.get("items"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
