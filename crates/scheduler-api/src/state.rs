use std::sync::Arc;

use reqwest::Client;
use scheduler_store::PoolStore;
use tokio_util::sync::CancellationToken;

use crate::observe::Metrics;

/// Shared handle threaded through every route handler (axum's `State`
/// extractor, §6). Cheap to clone: `PoolStore` and `reqwest::Client` are
/// themselves `Arc`-backed internally.
#[derive(Clone)]
pub struct AppState {
    pub store: PoolStore,
    pub http: Client,
    pub shutdown: CancellationToken,
    pub metrics: Arc<Metrics>,
}
