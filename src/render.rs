use serde::Serialize;

use crate::embed::embed_url_for;
use crate::models::{SearchResult, UiState};

/// What the page draws for the panel.
#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub query: String,
    pub loading: bool,
    pub error: Option<String>,
    pub greeting: Option<String>,
    pub greeting_error: Option<String>,
    pub rows: Vec<ResultRow>,
    pub viewer: Option<Viewer>,
    pub log: Vec<String>,
    pub scroll_top: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    pub key: String,
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub selected: bool,
}

/// Embedded player for the selected talk
#[derive(Debug, Clone, Serialize)]
pub struct Viewer {
    pub title: String,
    pub embed_url: String,
}

/// Stable key for a result: md5 of title and URL, independent of position.
pub fn row_key(result: &SearchResult) -> String {
    let mut combined = String::with_capacity(result.title.len() + result.url.len() + 1);
    combined.push_str(&result.title);
    combined.push('\n');
    combined.push_str(&result.url);
    format!("{:x}", md5::compute(combined.as_bytes()))
}

pub fn render(state: &UiState, subtitle: &str) -> PanelView {
    let rows = state
        .results
        .iter()
        .map(|r| ResultRow {
            key: row_key(r),
            title: r.title.clone(),
            url: r.url.clone(),
            tags: r.tags.clone(),
            selected: state.selected.as_ref() == Some(r),
        })
        .collect();

    let viewer = state.selected.as_ref().map(|s| Viewer {
        title: s.title.clone(),
        embed_url: embed_url_for(Some(&s.url), subtitle),
    });

    PanelView {
        query: state.query.clone(),
        loading: state.loading,
        error: state.error.clone(),
        greeting: state.greeting.clone(),
        greeting_error: state.greeting_error.clone(),
        rows,
        viewer,
        log: state.log.iter().cloned().collect(),
        scroll_top: state.scroll_top,
    }
}
