use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::models::{QueryUpdate, SearchRequest, SelectRequest};
use crate::render::{render, PanelView};
use crate::state::AppState;

fn view(state: &AppState) -> PanelView {
    render(&state.panel.snapshot(), &state.panel.config().subtitle)
}

/// GET /api/panel - Current panel view
pub async fn get_panel(State(state): State<AppState>) -> Json<PanelView> {
    Json(view(&state))
}

/// POST /api/panel/mount - First render; runs the initial search once
pub async fn mount(State(state): State<AppState>) -> Json<PanelView> {
    if !state.panel.mount().await {
        tracing::debug!("Panel already mounted");
    }
    Json(view(&state))
}

/// PUT /api/panel/query - Update the input value
pub async fn update_query(
    State(state): State<AppState>,
    Json(req): Json<QueryUpdate>,
) -> Json<PanelView> {
    state.panel.set_query(req.query);
    Json(view(&state))
}

/// POST /api/panel/search - Search for the given query, or the current one
///
/// The search runs on its own task so a dropped connection does not abort it.
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<PanelView>, (StatusCode, String)> {
    let panel = state.panel.clone();
    let task = tokio::spawn(async move {
        match req.query {
            Some(query) => panel.search(&query).await,
            None => panel.search_current().await,
        }
    });
    task.await.map_err(|e| {
        tracing::error!("Search task failed: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Search task failed".to_string())
    })?;
    Ok(Json(view(&state)))
}

/// POST /api/panel/select - Select a result by its row key
pub async fn select(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<PanelView>, (StatusCode, String)> {
    if state.panel.select_by_key(&req.key).is_none() {
        return Err((StatusCode::NOT_FOUND, "Result not found".to_string()));
    }
    Ok(Json(view(&state)))
}

/// POST /api/panel/scrolled - The page has scrolled to the top
pub async fn scrolled(State(state): State<AppState>) -> Json<PanelView> {
    state.panel.acknowledge_scroll();
    Json(view(&state))
}

/// POST /api/panel/greeting - Fetch the backend greeting
pub async fn greeting(State(state): State<AppState>) -> Json<PanelView> {
    state.panel.fetch_greeting().await;
    Json(view(&state))
}

/// DELETE /api/panel/log - Clear the log panel
pub async fn clear_log(State(state): State<AppState>) -> StatusCode {
    state.panel.clear_log();
    StatusCode::NO_CONTENT
}
