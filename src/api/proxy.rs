use axum::extract::{Request, State};
use axum::response::Response;

use crate::state::AppState;

/// ANY /api/py/* - Forward to the backend for the active mode
pub async fn proxy(State(state): State<AppState>, req: Request) -> Response {
    crate::proxy::forward(&state.http_client, &state.proxy, req).await
}
