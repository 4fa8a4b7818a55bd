use axum::extract::State;
use prometheus::{Encoder, TextEncoder};

use crate::state::AppState;

pub(super) fn router(router: axum::Router<AppState>) -> axum::Router<AppState> {
    router.route("/metrics", axum::routing::get(handler))
}

/// `GET /metrics` (§6, ambient): Prometheus text exposition. Not part of
/// the LB-facing contract; purely operational.
async fn handler(State(state): State<AppState>) -> String {
    state.metrics.refresh_from_store(&state.store).await;

    let encoder = TextEncoder::new();
    let families = state.metrics.registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer).expect("prometheus text encoding never fails");
    String::from_utf8(buffer).expect("prometheus text exposition is always valid UTF-8")
}
