//! The search panel: owns [`UiState`] and drives the search/select cycle.
//!
//! Every search takes a sequence number. Only the response to the most
//! recently issued search is applied; older responses are dropped so a slow
//! request can never overwrite a newer one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use rand::seq::SliceRandom;

use crate::client::TalkApi;
use crate::config::PanelConfig;
use crate::keywords::pick_initial_keyword;
use crate::models::{SearchResult, UiState};
use crate::render::row_key;

/// Shown to the user when a search request fails.
pub const SEARCH_ERROR_MESSAGE: &str = "Failed to fetch search results. Please try again.";

/// Shown to the user when the greeting request fails.
pub const GREETING_ERROR_MESSAGE: &str = "Failed to load greeting.";

/// What happened to a completed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results replaced; carries the number of results
    Applied(usize),
    /// Request failed; results left as they were
    Failed,
    /// A newer search was issued meanwhile; response dropped
    Stale,
}

pub struct SearchPanel {
    api: Arc<dyn TalkApi>,
    config: PanelConfig,
    state: Mutex<UiState>,
    latest_seq: AtomicU64,
    mounted: AtomicBool,
}

impl SearchPanel {
    pub fn new(api: Arc<dyn TalkApi>, config: PanelConfig) -> Self {
        Self {
            api,
            config,
            state: Mutex::new(UiState::default()),
            latest_seq: AtomicU64::new(0),
            mounted: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> UiState {
        self.state.lock().clone()
    }

    /// Update the bound input value. Any string is accepted.
    pub fn set_query(&self, text: impl Into<String>) {
        self.state.lock().query = text.into();
    }

    /// Search for `query` and apply the response if it is still the latest.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock();
            state.query = query.to_string();
            state.loading = true;
            state.error = None;
            state.diagnostic = None;
            self.push_log(&mut state, format!("Searching for \"{query}\""));
        }
        tracing::info!("Search #{seq} started: {query:?}");

        let mut pending = PendingSearch {
            panel: self,
            seq,
            armed: true,
        };
        let response = self.api.search(query).await;
        pending.armed = false;

        let mut state = self.state.lock();
        if seq != self.latest_seq.load(Ordering::SeqCst) {
            tracing::debug!("Search #{seq} superseded, dropping response");
            self.push_log(
                &mut state,
                format!("Discarded stale results for \"{query}\""),
            );
            return SearchOutcome::Stale;
        }

        state.loading = false;
        match response {
            Ok(mut results) => {
                if self.config.shuffle_results {
                    results.shuffle(&mut rand::thread_rng());
                }
                let count = results.len();
                state.selected = results.first().cloned();
                state.results = results;

                tracing::info!("Search #{seq} returned {count} talks");
                let message = match &state.selected {
                    Some(first) => format!(
                        "Found {count} talks for \"{query}\", showing \"{}\"",
                        first.title
                    ),
                    None => format!("No talks found for \"{query}\""),
                };
                self.push_log(&mut state, message);
                SearchOutcome::Applied(count)
            }
            Err(e) => {
                let detail = format!("{e:#}");
                tracing::warn!("Search #{seq} failed: {detail}");
                state.error = Some(SEARCH_ERROR_MESSAGE.to_string());
                self.push_log(&mut state, format!("Search for \"{query}\" failed: {detail}"));
                state.diagnostic = Some(detail);
                SearchOutcome::Failed
            }
        }
    }

    /// Search with the panel's current query.
    pub async fn search_current(&self) -> SearchOutcome {
        let query = self.state.lock().query.clone();
        self.search(&query).await
    }

    /// Select `item` for the viewer and scroll back to the top.
    pub fn select_result(&self, item: SearchResult) {
        let mut state = self.state.lock();
        self.select_locked(&mut state, item);
    }

    /// Select the result whose row key is `key`, if present.
    pub fn select_by_key(&self, key: &str) -> Option<SearchResult> {
        let mut state = self.state.lock();
        let item = state
            .results
            .iter()
            .find(|r| row_key(r) == key)
            .cloned()?;
        self.select_locked(&mut state, item.clone());
        Some(item)
    }

    fn select_locked(&self, state: &mut UiState, item: SearchResult) {
        self.push_log(state, format!("Selected \"{}\"", item.title));
        state.selected = Some(item);
        state.scroll_top = true;
    }

    /// The renderer has scrolled to the top.
    pub fn acknowledge_scroll(&self) {
        self.state.lock().scroll_top = false;
    }

    /// First render: run the initial search with a random keyword.
    /// Returns `false` without doing anything if already mounted.
    pub async fn mount(&self) -> bool {
        if self.mounted.swap(true, Ordering::SeqCst) {
            return false;
        }
        let keyword = pick_initial_keyword(&mut rand::thread_rng());
        tracing::info!("Panel mounted, initial keyword {keyword:?}");
        self.search(keyword).await;
        true
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Fetch the backend greeting into `greeting`. A failure sets
    /// `greeting_error` and `diagnostic`, never the search error.
    pub async fn fetch_greeting(&self) {
        let response = self.api.greeting().await;
        let mut state = self.state.lock();
        match response {
            Ok(message) => {
                self.push_log(&mut state, format!("Greeting: {message}"));
                state.greeting = Some(message);
                state.greeting_error = None;
            }
            Err(e) => {
                let detail = format!("{e:#}");
                tracing::warn!("Greeting failed: {detail}");
                self.push_log(&mut state, format!("Greeting failed: {detail}"));
                state.greeting_error = Some(GREETING_ERROR_MESSAGE.to_string());
                state.diagnostic = Some(detail);
            }
        }
    }

    pub fn clear_log(&self) {
        self.state.lock().log.clear();
    }

    fn push_log(&self, state: &mut UiState, message: String) {
        if self.config.log_capacity == 0 {
            return;
        }
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        state.log.push_back(format!("{stamp} {message}"));
        while state.log.len() > self.config.log_capacity {
            state.log.pop_front();
        }
    }
}

/// Clears `loading` if a search is dropped before its response arrives
/// and no newer search has been issued.
struct PendingSearch<'a> {
    panel: &'a SearchPanel,
    seq: u64,
    armed: bool,
}

impl Drop for PendingSearch<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.panel.state.lock();
        if self.seq == self.panel.latest_seq.load(Ordering::SeqCst) {
            tracing::debug!("Search #{} cancelled", self.seq);
            state.loading = false;
            let message = format!("Search for \"{}\" cancelled", state.query);
            self.panel.push_log(&mut state, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GREETING_FALLBACK;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::oneshot;

    type Scripted = std::result::Result<Vec<SearchResult>, String>;

    /// Answers searches from a script. A query with a registered gate waits
    /// for the gate to be released before answering.
    #[derive(Default)]
    struct FakeApi {
        responses: Mutex<HashMap<String, Scripted>>,
        gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
        calls: Mutex<Vec<String>>,
        greeting: Mutex<Option<std::result::Result<String, String>>>,
    }

    impl FakeApi {
        fn respond(&self, query: &str, response: Scripted) {
            self.responses.lock().insert(query.to_string(), response);
        }

        fn gate(&self, query: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().insert(query.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl TalkApi for FakeApi {
        async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
            self.calls.lock().push(query.to_string());
            let gate = self.gates.lock().remove(query);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            let scripted = self.responses.lock().get(query).cloned();
            match scripted {
                Some(Ok(results)) => Ok(results),
                Some(Err(e)) => Err(anyhow::anyhow!(e)),
                None => Ok(Vec::new()),
            }
        }

        async fn greeting(&self) -> Result<String> {
            match self.greeting.lock().clone() {
                Some(Ok(m)) => Ok(m),
                Some(Err(e)) => Err(anyhow::anyhow!(e)),
                None => Ok(GREETING_FALLBACK.to_string()),
            }
        }
    }

    fn talk(title: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: format!("https://www.ted.com/talks/{}", title.replace(' ', "_")),
            tags: vec!["science".to_string()],
        }
    }

    fn ordered_config() -> PanelConfig {
        PanelConfig {
            shuffle_results: false,
            ..PanelConfig::default()
        }
    }

    fn panel_with(api: Arc<FakeApi>, config: PanelConfig) -> SearchPanel {
        SearchPanel::new(api, config)
    }

    #[tokio::test]
    async fn test_set_query_accepts_anything() {
        let panel = panel_with(Arc::new(FakeApi::default()), ordered_config());
        panel.set_query("");
        assert_eq!(panel.snapshot().query, "");
        panel.set_query("  ünïcode ?&= ");
        assert_eq!(panel.snapshot().query, "  ünïcode ?&= ");
    }

    #[tokio::test]
    async fn test_successful_search_selects_first() {
        let api = Arc::new(FakeApi::default());
        api.respond("ocean", Ok(vec![talk("deep sea"), talk("coral")]));
        let panel = panel_with(api, ordered_config());

        let outcome = panel.search("ocean").await;
        assert_eq!(outcome, SearchOutcome::Applied(2));

        let state = panel.snapshot();
        assert!(!state.loading);
        assert_eq!(state.results.len(), 2);
        assert_eq!(state.selected, Some(talk("deep sea")));
        assert!(state.error.is_none());
        assert_eq!(state.query, "ocean");
        assert!(state.log.back().unwrap().contains("Found 2 talks"));
    }

    #[tokio::test]
    async fn test_empty_results_select_none() {
        let api = Arc::new(FakeApi::default());
        api.respond("nothing", Ok(vec![]));
        let panel = panel_with(api, ordered_config());
        panel.select_result(talk("left over"));

        assert_eq!(panel.search("nothing").await, SearchOutcome::Applied(0));
        let state = panel.snapshot();
        assert!(state.results.is_empty());
        assert!(state.selected.is_none());
    }

    #[tokio::test]
    async fn test_shuffled_results_keep_the_same_talks() {
        let api = Arc::new(FakeApi::default());
        let talks: Vec<_> = (0..20).map(|i| talk(&format!("talk {i}"))).collect();
        api.respond("many", Ok(talks.clone()));
        let panel = panel_with(api, PanelConfig::default());

        panel.search("many").await;
        let state = panel.snapshot();
        assert_eq!(state.results.len(), talks.len());
        for t in &talks {
            assert!(state.results.contains(t));
        }
        assert_eq!(state.selected.as_ref(), state.results.first());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_results() {
        let api = Arc::new(FakeApi::default());
        api.respond("ocean", Ok(vec![talk("deep sea")]));
        api.respond("broken", Err("Search endpoint returned 500".to_string()));
        let panel = panel_with(api, ordered_config());

        panel.search("ocean").await;
        let before = panel.snapshot();

        assert_eq!(panel.search("broken").await, SearchOutcome::Failed);
        let after = panel.snapshot();
        assert!(!after.loading);
        assert_eq!(after.results, before.results);
        assert_eq!(after.selected, before.selected);
        assert_eq!(after.error.as_deref(), Some(SEARCH_ERROR_MESSAGE));
        assert!(after.diagnostic.unwrap().contains("500"));
        assert!(after.log.back().unwrap().contains("failed"));
    }

    #[tokio::test]
    async fn test_next_search_clears_error() {
        let api = Arc::new(FakeApi::default());
        api.respond("broken", Err("boom".to_string()));
        api.respond("ok", Ok(vec![talk("fine")]));
        let panel = panel_with(api, ordered_config());

        panel.search("broken").await;
        assert!(panel.snapshot().error.is_some());
        panel.search("ok").await;
        let state = panel.snapshot();
        assert!(state.error.is_none());
        assert!(state.diagnostic.is_none());
    }

    #[tokio::test]
    async fn test_loading_while_in_flight() {
        let api = Arc::new(FakeApi::default());
        let release = api.gate("slow");
        let panel = Arc::new(panel_with(api, ordered_config()));

        let task = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.search("slow").await })
        };
        while panel.snapshot().log.is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(panel.snapshot().loading);

        release.send(()).unwrap();
        assert_eq!(task.await.unwrap(), SearchOutcome::Applied(0));
        assert!(!panel.snapshot().loading);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let api = Arc::new(FakeApi::default());
        api.respond("old", Ok(vec![talk("old talk")]));
        api.respond("new", Ok(vec![talk("new talk")]));
        let release_old = api.gate("old");
        let panel = Arc::new(panel_with(api.clone(), ordered_config()));

        let old = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.search("old").await })
        };
        while api.calls.lock().is_empty() {
            tokio::task::yield_now().await;
        }

        assert_eq!(panel.search("new").await, SearchOutcome::Applied(1));
        release_old.send(()).unwrap();
        assert_eq!(old.await.unwrap(), SearchOutcome::Stale);

        let state = panel.snapshot();
        assert_eq!(state.results, vec![talk("new talk")]);
        assert_eq!(state.selected, Some(talk("new talk")));
        assert!(!state.loading);
        assert!(state.log.back().unwrap().contains("Discarded stale"));
    }

    #[tokio::test]
    async fn test_stale_response_does_not_clear_loading() {
        let api = Arc::new(FakeApi::default());
        let release_new = api.gate("new");
        let release_old = api.gate("old");
        let panel = Arc::new(panel_with(api.clone(), ordered_config()));

        let old = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.search("old").await })
        };
        while api.calls.lock().is_empty() {
            tokio::task::yield_now().await;
        }
        let new = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.search("new").await })
        };
        while api.calls.lock().len() < 2 {
            tokio::task::yield_now().await;
        }

        release_old.send(()).unwrap();
        assert_eq!(old.await.unwrap(), SearchOutcome::Stale);
        assert!(panel.snapshot().loading);

        release_new.send(()).unwrap();
        assert_eq!(new.await.unwrap(), SearchOutcome::Applied(0));
        assert!(!panel.snapshot().loading);
    }

    #[tokio::test]
    async fn test_select_result_keeps_results() {
        let api = Arc::new(FakeApi::default());
        api.respond("q", Ok(vec![talk("a"), talk("b"), talk("c")]));
        let panel = panel_with(api, ordered_config());
        panel.search("q").await;
        let before = panel.snapshot().results;

        panel.select_result(talk("b"));
        let state = panel.snapshot();
        assert_eq!(state.selected, Some(talk("b")));
        assert_eq!(state.results, before);
        assert!(state.scroll_top);

        panel.acknowledge_scroll();
        assert!(!panel.snapshot().scroll_top);
    }

    #[tokio::test]
    async fn test_select_by_key() {
        let api = Arc::new(FakeApi::default());
        api.respond("q", Ok(vec![talk("a"), talk("b")]));
        let panel = panel_with(api, ordered_config());
        panel.search("q").await;

        let picked = panel.select_by_key(&row_key(&talk("b")));
        assert_eq!(picked, Some(talk("b")));
        assert_eq!(panel.snapshot().selected, Some(talk("b")));

        assert!(panel.select_by_key("no-such-key").is_none());
        assert_eq!(panel.snapshot().selected, Some(talk("b")));
    }

    #[tokio::test]
    async fn test_select_by_key_logs_once() {
        let api = Arc::new(FakeApi::default());
        api.respond("q", Ok(vec![talk("a"), talk("b")]));
        let panel = panel_with(api, ordered_config());
        panel.search("q").await;
        panel.acknowledge_scroll();
        let before = panel.snapshot().log.len();

        panel.select_by_key(&row_key(&talk("a")));
        let state = panel.snapshot();
        assert_eq!(state.selected, Some(talk("a")));
        assert!(state.scroll_top);
        assert_eq!(state.log.len(), before + 1);
        assert!(state.log.back().unwrap().ends_with("Selected \"a\""));

        panel.select_by_key("no-such-key");
        assert_eq!(panel.snapshot().log.len(), before + 1);
    }

    #[tokio::test]
    async fn test_mount_searches_exactly_once() {
        let api = Arc::new(FakeApi::default());
        let panel = panel_with(api.clone(), ordered_config());

        assert!(!panel.is_mounted());
        assert!(panel.mount().await);
        assert!(!panel.mount().await);
        assert!(!panel.mount().await);

        let calls = api.calls.lock().clone();
        assert_eq!(calls.len(), 1);
        assert!(
            crate::keywords::TOPIC_KEYWORDS.contains(&calls[0].as_str())
                || calls[0] == crate::keywords::ALTERNATE_KEYWORD
        );
        assert_eq!(panel.snapshot().query, calls[0]);
    }

    #[tokio::test]
    async fn test_greeting_success_and_failure() {
        let api = Arc::new(FakeApi::default());
        *api.greeting.lock() = Some(Ok("Hello, World!".to_string()));
        let panel = panel_with(api.clone(), ordered_config());

        panel.fetch_greeting().await;
        assert_eq!(panel.snapshot().greeting.as_deref(), Some("Hello, World!"));

        *api.greeting.lock() = Some(Err("connection refused".to_string()));
        panel.fetch_greeting().await;
        let state = panel.snapshot();
        assert_eq!(state.greeting.as_deref(), Some("Hello, World!"));
        assert_eq!(state.greeting_error.as_deref(), Some(GREETING_ERROR_MESSAGE));
        assert!(state.error.is_none());
        assert_eq!(state.diagnostic.as_deref(), Some("connection refused"));

        let view = crate::render::render(&state, "en");
        assert_eq!(view.greeting_error.as_deref(), Some(GREETING_ERROR_MESSAGE));
        assert!(view.error.is_none());

        *api.greeting.lock() = Some(Ok("Hello again".to_string()));
        panel.fetch_greeting().await;
        let state = panel.snapshot();
        assert_eq!(state.greeting.as_deref(), Some("Hello again"));
        assert!(state.greeting_error.is_none());
    }

    #[tokio::test]
    async fn test_aborted_search_clears_loading() {
        let api = Arc::new(FakeApi::default());
        let _release = api.gate("slow");
        let panel = Arc::new(panel_with(api.clone(), ordered_config()));

        let task = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.search("slow").await })
        };
        while api.calls.lock().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(panel.snapshot().loading);

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        let state = panel.snapshot();
        assert!(!state.loading);
        assert!(state.log.back().unwrap().contains("cancelled"));
    }

    #[tokio::test]
    async fn test_aborted_stale_search_keeps_loading() {
        let api = Arc::new(FakeApi::default());
        let _release_old = api.gate("old");
        let release_new = api.gate("new");
        let panel = Arc::new(panel_with(api.clone(), ordered_config()));

        let old = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.search("old").await })
        };
        while api.calls.lock().is_empty() {
            tokio::task::yield_now().await;
        }
        let new = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.search("new").await })
        };
        while api.calls.lock().len() < 2 {
            tokio::task::yield_now().await;
        }

        old.abort();
        assert!(old.await.unwrap_err().is_cancelled());
        assert!(panel.snapshot().loading);

        release_new.send(()).unwrap();
        assert_eq!(new.await.unwrap(), SearchOutcome::Applied(0));
        assert!(!panel.snapshot().loading);
    }

    #[tokio::test]
    async fn test_log_is_bounded() {
        let api = Arc::new(FakeApi::default());
        let panel = panel_with(
            api,
            PanelConfig {
                shuffle_results: false,
                log_capacity: 3,
                ..PanelConfig::default()
            },
        );
        for i in 0..5 {
            panel.search(&format!("q{i}")).await;
        }
        let log = panel.snapshot().log;
        assert_eq!(log.len(), 3);
        assert!(log.back().unwrap().contains("q4"));

        panel.clear_log();
        assert!(panel.snapshot().log.is_empty());
    }
}
