use axum::{extract::State, Json};

use crate::{dto::HealthResponse, state::AppState};

pub(super) fn router(router: axum::Router<AppState>) -> axum::Router<AppState> {
    router.route("/health", axum::routing::get(handler))
}

/// `GET /health` (§6). Liveness only; always `200`.
async fn handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.store.list_keys().len()))
}
