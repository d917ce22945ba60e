pub mod hello;
pub mod panel;
pub mod proxy;

use axum::response::Html;
use axum::routing::{any, delete, get, post, put};
use axum::Router;

use crate::state::AppState;

/// Full application router: page, panel API, hello endpoint and backend proxy.
pub fn router(state: AppState) -> Router {
    let proxy_route = state.proxy.route_pattern();

    Router::new()
        // Serve frontend
        .route("/", get(serve_index))
        // Panel API
        .route("/api/panel", get(panel::get_panel))
        .route("/api/panel/mount", post(panel::mount))
        .route("/api/panel/query", put(panel::update_query))
        .route("/api/panel/search", post(panel::search))
        .route("/api/panel/select", post(panel::select))
        .route("/api/panel/scrolled", post(panel::scrolled))
        .route("/api/panel/greeting", post(panel::greeting))
        .route("/api/panel/log", delete(panel::clear_log))
        .route("/api/hello", get(hello::hello))
        // Backend rewrite rule
        .route(&proxy_route, any(proxy::proxy))
        .with_state(state)
        .fallback(get(serve_index))
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
