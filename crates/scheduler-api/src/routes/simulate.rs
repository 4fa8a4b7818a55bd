use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use scheduler_selector::draw_counts;
use scheduler_types::{MemberKey, PoolKey};

use crate::{
    dto::{IterationsQuery, SelectRequest, SimulateResponse},
    error::ApiError,
    routes::common::weighted_members,
    state::AppState,
};

pub(super) fn router(router: axum::Router<AppState>) -> axum::Router<AppState> {
    router.route("/pools/:name/:partition/simulate", axum::routing::post(handler))
}

/// `POST /pools/{name}/{partition}/simulate?iterations=N` (§6): `N`
/// independent weighted draws over the pool's current frozen scores,
/// reported as raw selection counts.
async fn handler(
    State(state): State<AppState>,
    Path((name, partition)): Path<(String, String)>,
    Query(query): Query<IterationsQuery>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let key = PoolKey::new(partition.clone(), name.clone());
    let snapshot = state
        .store
        .snapshot(&key)
        .await
        .ok_or(ApiError::PoolNotFound { partition, name })?;

    let candidates: HashSet<MemberKey> =
        req.members.iter().filter_map(|m| MemberKey::parse(m)).collect();
    let members = weighted_members(&snapshot, &candidates);
    let counts = draw_counts(&members, query.iterations);

    let results = members
        .iter()
        .zip(counts.iter())
        .map(|(member, &count)| (member.key.clone(), count))
        .collect();

    Ok(Json(SimulateResponse { results, iterations: query.iterations }))
}
