use std::collections::VecDeque;

use serde::{Deserialize, Deserializer, Serialize};

/// A talk returned by the search backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Panel state. Lives as long as the panel; never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UiState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub selected: Option<SearchResult>,
    pub loading: bool,
    /// User-facing message for the last failed search
    pub error: Option<String>,
    /// Underlying error text for the last failed request
    pub diagnostic: Option<String>,
    pub greeting: Option<String>,
    /// User-facing message for a failed greeting request
    pub greeting_error: Option<String>,
    /// Set on selection; the renderer clears it once it has scrolled
    pub scroll_top: bool,
    pub log: VecDeque<String>,
}

/// PUT /api/panel/query
#[derive(Debug, Clone, Deserialize)]
pub struct QueryUpdate {
    pub query: String,
}

/// POST /api/panel/search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    /// Falls back to the panel's current query when omitted
    pub query: Option<String>,
}

/// POST /api/panel/select
#[derive(Debug, Clone, Deserialize)]
pub struct SelectRequest {
    pub key: String,
}

/// Body of the hello endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Greeting {
    pub message: String,
}
