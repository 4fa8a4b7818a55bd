mod analyze;
mod common;
mod health;
mod metrics;
mod select;
mod simulate;
mod status;

use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full HTTP surface (§6): the six LB/operator-facing
/// endpoints plus the ambient `/metrics`.
pub fn router(state: AppState) -> axum::Router {
    let router = axum::Router::new();
    let router = select::router(router);
    let router = status::router(router);
    let router = health::router(router);
    let router = simulate::router(router);
    let router = analyze::router(router);
    let router = metrics::router(router);
    router.layer(TraceLayer::new_for_http()).with_state(state)
}
