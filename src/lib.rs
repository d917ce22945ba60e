//! # talk-search
//!
//! A search panel for talks. The user types a keyword, the panel queries
//! the semantic search backend, and the results are listed next to an
//! embedded player for the selected talk.
//!
//! ## Architecture
//!
//! ```text
//!   browser page ──► /api/panel/* ──► SearchPanel ──► TalkApi ──► backend
//!        ▲                              │  (UiState)      GET /api/py/search
//!        │                              ▼                 GET /api/py/hello
//!        └──────────── PanelView ◄── render
//!
//!   any request ──► /api/py/* ──► ProxyRule ──► dev or prod backend origin
//! ```
//!
//! Searches are fenced by sequence number: only the most recently issued
//! search may change the results.
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration: bind address, mode, backend origins, panel options
//! - [`models`] - `SearchResult`, `UiState`, request bodies
//! - [`embed`] - Talk page URL to embeddable player URL
//! - [`keywords`] - Keywords for the initial search
//! - [`client`] - `TalkApi` trait and its reqwest implementation
//! - [`panel`] - `SearchPanel`: state, search/select/mount, log panel
//! - [`render`] - View model with stable row keys
//! - [`proxy`] - Backend rewrite rule and request forwarding
//! - [`api`] - Axum router and handlers
//! - [`state`] - Shared application state

pub mod api;
pub mod client;
pub mod config;
pub mod embed;
pub mod keywords;
pub mod models;
pub mod panel;
pub mod proxy;
pub mod render;
pub mod state;
