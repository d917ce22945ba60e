use std::sync::Arc;

use crate::client::{HttpTalkApi, TalkApi};
use crate::config::Config;
use crate::panel::SearchPanel;
use crate::proxy::ProxyRule;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub panel: Arc<SearchPanel>,
    pub proxy: Arc<ProxyRule>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        let api = Arc::new(HttpTalkApi::from_config(http_client.clone(), &config));
        Ok(Self::with_api(config, http_client, api))
    }

    /// State with a caller-supplied [`TalkApi`] behind the panel.
    pub fn with_api(config: Config, http_client: reqwest::Client, api: Arc<dyn TalkApi>) -> Self {
        let panel = Arc::new(SearchPanel::new(api, config.panel.clone()));
        let proxy = Arc::new(ProxyRule::from_config(&config));
        Self {
            config,
            panel,
            proxy,
            http_client,
        }
    }
}
