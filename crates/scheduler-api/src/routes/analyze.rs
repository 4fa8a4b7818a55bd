use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use scheduler_selector::analyze;
use scheduler_types::{MemberKey, PoolKey};

use crate::{
    dto::{AnalyzeResponse, IterationsQuery, SelectRequest},
    error::ApiError,
    routes::common::weighted_members,
    state::AppState,
};

pub(super) fn router(router: axum::Router<AppState>) -> axum::Router<AppState> {
    router.route("/pools/:name/:partition/analyze", axum::routing::post(handler))
}

/// `POST /pools/{name}/{partition}/analyze?iterations=N` (§6): the same
/// simulation as `/simulate`, summarized into theoretical-vs-empirical
/// statistics and a quality grade.
async fn handler(
    State(state): State<AppState>,
    Path((name, partition)): Path<(String, String)>,
    Query(query): Query<IterationsQuery>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let key = PoolKey::new(partition.clone(), name.clone());
    let snapshot = state
        .store
        .snapshot(&key)
        .await
        .ok_or(ApiError::PoolNotFound { partition, name })?;

    let candidates: HashSet<MemberKey> =
        req.members.iter().filter_map(|m| MemberKey::parse(m)).collect();
    let members = weighted_members(&snapshot, &candidates);
    let result = analyze(&members, query.iterations);

    Ok(Json(AnalyzeResponse::from(result)))
}
