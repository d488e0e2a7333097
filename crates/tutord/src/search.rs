//! Live web search collaborator.
//!
//! Search is strictly best-effort: a timeout or error produces an empty
//! snippet and the pipeline continues without live information. Nothing in
//! here can fail a request.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str) -> anyhow::Result<String>;
}

/// DuckDuckGo Instant Answer API client. Keyless, so it works out of the box.
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: String,
}

impl DuckDuckGoSearch {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl SearchClient for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get("https://api.duckduckgo.com/")
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .send()
            .await?
            .error_for_status()?;

        let answer: InstantAnswer = response.json().await?;

        if !answer.abstract_text.trim().is_empty() {
            return Ok(answer.abstract_text);
        }
        if let Some(topic) = answer.related_topics.first() {
            if !topic.text.trim().is_empty() {
                return Ok(topic.text.clone());
            }
        }
        Ok(String::new())
    }
}

/// Search client that finds nothing. Used in tests and when search is
/// disabled.
pub struct NoopSearch;

#[async_trait]
impl SearchClient for NoopSearch {
    async fn search(&self, _query: &str) -> anyhow::Result<String> {
        Ok(String::new())
    }
}

/// Run one search with a hard deadline. Timeouts and errors both degrade to
/// an empty snippet.
pub async fn fetch_snippet(search: &dyn SearchClient, question: &str, timeout_secs: u64) -> String {
    match tokio::time::timeout(Duration::from_secs(timeout_secs), search.search(question)).await {
        Ok(Ok(snippet)) => {
            if !snippet.is_empty() {
                info!("[S]  Search returned {} chars", snippet.len());
            }
            snippet
        }
        Ok(Err(e)) => {
            warn!("[-]  Search failed: {}, continuing without", e);
            String::new()
        }
        Err(_) => {
            warn!("[-]  Search timed out after {}s, continuing without", timeout_secs);
            String::new()
        }
    }
}
