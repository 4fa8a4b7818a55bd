use serde::{Deserialize, Serialize};

use crate::{Algorithm, EngineKind, MetricsEndpointConfig};

/// Per-pool fallback policy (§3 "Fallback config").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default)]
    pub pool_fallback: bool,
    #[serde(default)]
    pub member_running_req_threshold: Option<f64>,
    #[serde(default)]
    pub member_waiting_queue_threshold: Option<f64>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            pool_fallback: false,
            member_running_req_threshold: None,
            member_waiting_queue_threshold: None,
        }
    }
}

/// The mutable, hot-reloadable configuration of a pool (§9 design note:
/// "immutable on reload = pool identity; mutable = weights, algorithm
/// choice, thresholds, fallback flags, intervals, metrics URL template").
///
/// `PoolKey` (partition, name) is deliberately not a field here: it is the
/// map key `scheduler-store` uses, never something a reload can change out
/// from under a live pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub engine_kind: EngineKind,
    pub metrics_endpoint: MetricsEndpointConfig,
    pub algorithm: Algorithm,
    pub fallback: FallbackConfig,
}
