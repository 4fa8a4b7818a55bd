use axum::{
    extract::{Path, State},
    Json,
};
use scheduler_types::PoolKey;

use crate::{
    dto::{PoolStatusResponse, PoolsStatusResponse},
    error::ApiError,
    state::AppState,
};

pub(super) fn router(router: axum::Router<AppState>) -> axum::Router<AppState> {
    router
        .route("/pools/:name/:partition/status", axum::routing::get(one))
        .route("/pools/status", axum::routing::get(all))
}

/// `GET /pools/{name}/{partition}/status` (§6).
async fn one(
    State(state): State<AppState>,
    Path((name, partition)): Path<(String, String)>,
) -> Result<Json<PoolStatusResponse>, ApiError> {
    let key = PoolKey::new(partition.clone(), name.clone());
    let snapshot = state
        .store
        .snapshot(&key)
        .await
        .ok_or(ApiError::PoolNotFound { partition, name })?;
    Ok(Json(PoolStatusResponse::from_snapshot(&key, &snapshot)))
}

/// `GET /pools/status` (§6): every configured pool's status object.
async fn all(State(state): State<AppState>) -> Json<PoolsStatusResponse> {
    let mut pools = Vec::new();
    for key in state.store.list_keys() {
        if let Some(snapshot) = state.store.snapshot(&key).await {
            pools.push(PoolStatusResponse::from_snapshot(&key, &snapshot));
        }
    }
    pools.sort_by(|a, b| (a.partition.as_str(), a.name.as_str()).cmp(&(b.partition.as_str(), b.name.as_str())));
    Json(PoolsStatusResponse { pools })
}
