use std::collections::HashSet;

use axum::{extract::State, Json};
use scheduler_selector::select;
use scheduler_types::{MemberKey, PoolKey};
use tracing::Instrument;

use crate::{dto::SelectRequest, state::AppState};

pub(super) fn router(router: axum::Router<AppState>) -> axum::Router<AppState> {
    router.route("/scheduler/select", axum::routing::post(handler))
}

/// `POST /scheduler/select` (§6). Never returns `5xx` for upstream data
/// issues: an unknown pool or a fully ineligible candidate set both
/// resolve to the text `"none"`, matching §7's propagation policy. A
/// malformed JSON body is rejected with `400` by axum's `Json` extractor
/// before this handler ever runs.
async fn handler(State(state): State<AppState>, Json(req): Json<SelectRequest>) -> String {
    let key = PoolKey::new(req.partition.clone(), req.pool_name.clone());
    let candidates: HashSet<MemberKey> =
        req.members.iter().filter_map(|m| MemberKey::parse(m)).collect();

    async move {
        let outcome = match state.store.snapshot(&key).await {
            Some(snapshot) => select(&snapshot, &candidates),
            None => scheduler_selector::SelectOutcome::None,
        };
        let text = outcome.as_wire_text();
        let result = match outcome {
            scheduler_selector::SelectOutcome::Selected(_) => "selected",
            scheduler_selector::SelectOutcome::None => "none",
            scheduler_selector::SelectOutcome::Fallback => "fallback",
        };
        state.metrics.record_select_outcome(&key.to_string(), result);
        text
    }
    .instrument(tracing::info_span!("scheduler_select", pool = %key))
    .await
}
