use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::Config;
use crate::models::SearchResult;

/// Stored as the greeting when the endpoint answers without a `message`.
pub const GREETING_FALLBACK: &str = "No message received";

/// Outbound calls made by the search panel.
#[async_trait]
pub trait TalkApi: Send + Sync {
    /// Run a search. Anything other than a 200 with a JSON list is an error.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Fetch the backend greeting, falling back to [`GREETING_FALLBACK`].
    async fn greeting(&self) -> Result<String>;
}

/// [`TalkApi`] over HTTP.
#[derive(Clone)]
pub struct HttpTalkApi {
    client: reqwest::Client,
    search_url: String,
    greeting_url: String,
}

impl HttpTalkApi {
    pub fn new(
        client: reqwest::Client,
        search_url: impl Into<String>,
        greeting_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            search_url: search_url.into(),
            greeting_url: greeting_url.into(),
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(client, config.search_url(), config.greeting_url())
    }
}

#[async_trait]
impl TalkApi for HttpTalkApi {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let resp = self
            .client
            .get(&self.search_url)
            .query(&[("query", query)])
            .send()
            .await
            .context("Failed to call search endpoint")?;

        if resp.status() != StatusCode::OK {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Search endpoint returned {status}: {body}");
        }

        resp.json::<Vec<SearchResult>>()
            .await
            .context("Failed to parse search response")
    }

    async fn greeting(&self) -> Result<String> {
        let resp = self
            .client
            .get(&self.greeting_url)
            .send()
            .await
            .context("Failed to call greeting endpoint")?;

        if resp.status() != StatusCode::OK {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Greeting endpoint returned {status}: {body}");
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse greeting response")?;

        Ok(greeting_message(&body))
    }
}

fn greeting_message(body: &serde_json::Value) -> String {
    body.get("message")
        .and_then(|m| m.as_str())
        .unwrap_or(GREETING_FALLBACK)
        .to_string()
}
