use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Deployment mode, selects the backend origin
    pub mode: Mode,
    /// Backend search service configuration
    pub backend: BackendConfig,
    /// Search panel behaviour
    pub panel: PanelConfig,
    /// Connect timeout for outbound requests in seconds.
    /// No overall request timeout is applied.
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    /// Accepts `development`/`dev` and `production`/`prod`, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Mode::Development),
            "production" | "prod" => Some(Mode::Production),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Development => f.write_str("development"),
            Mode::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend origin used in development (e.g. "http://127.0.0.1:8000")
    pub dev_origin: String,
    /// Backend origin used in production
    pub prod_origin: String,
    /// Request paths starting with this prefix are forwarded to the backend
    pub proxy_prefix: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            dev_origin: "http://127.0.0.1:8000".to_string(),
            prod_origin: "http://backend:8000".to_string(),
            proxy_prefix: "/api/py/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Shuffle results client-side after every successful search
    pub shuffle_results: bool,
    /// Subtitle language appended to embed URLs
    pub subtitle: String,
    /// Maximum entries kept in the log panel
    pub log_capacity: usize,
    /// Mount the panel (initial search) at startup instead of on first page load
    pub auto_mount: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            shuffle_results: true,
            subtitle: "en".to_string(),
            log_capacity: 200,
            auto_mount: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            mode: Mode::Development,
            backend: BackendConfig::default(),
            panel: PanelConfig::default(),
            connect_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Unset or
    /// unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("TALK_SEARCH_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(mode) = lookup("TALK_SEARCH_MODE") {
            if let Some(m) = Mode::parse(&mode) {
                config.mode = m;
            }
        }
        if let Some(origin) = lookup("TALK_SEARCH_DEV_BACKEND") {
            config.backend.dev_origin = origin;
        }
        if let Some(origin) = lookup("TALK_SEARCH_PROD_BACKEND") {
            config.backend.prod_origin = origin;
        }
        if let Some(prefix) = lookup("TALK_SEARCH_PROXY_PREFIX") {
            if prefix.starts_with('/') {
                config.backend.proxy_prefix = prefix;
            }
        }
        if let Some(val) = lookup("TALK_SEARCH_SHUFFLE") {
            if let Ok(v) = val.parse() {
                config.panel.shuffle_results = v;
            }
        }
        if let Some(lang) = lookup("TALK_SEARCH_SUBTITLE") {
            config.panel.subtitle = lang;
        }
        if let Some(val) = lookup("TALK_SEARCH_LOG_CAPACITY") {
            if let Ok(v) = val.parse() {
                config.panel.log_capacity = v;
            }
        }
        if let Some(val) = lookup("TALK_SEARCH_AUTO_MOUNT") {
            if let Ok(v) = val.parse() {
                config.panel.auto_mount = v;
            }
        }
        if let Some(val) = lookup("TALK_SEARCH_CONNECT_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.connect_timeout_secs = v;
            }
        }

        config
    }

    /// Backend origin for the active mode, without a trailing slash.
    pub fn backend_origin(&self) -> &str {
        let origin = match self.mode {
            Mode::Development => &self.backend.dev_origin,
            Mode::Production => &self.backend.prod_origin,
        };
        origin.trim_end_matches('/')
    }

    pub fn search_url(&self) -> String {
        format!("{}/api/py/search", self.backend_origin())
    }

    pub fn greeting_url(&self) -> String {
        format!("{}/api/py/hello", self.backend_origin())
    }
}
