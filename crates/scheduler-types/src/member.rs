use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// §3 status flag. Any status other than `Ready` forces `score == 0`
/// (invariant 1, §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Ready,
    Unreachable,
    ParseError,
}

impl MemberStatus {
    pub fn is_ready(self) -> bool {
        matches!(self, MemberStatus::Ready)
    }
}

/// A single inference endpoint within a pool.
///
/// Owned by its pool: `scheduler-store` only ever hands out clones of this
/// for reads, never a live reference into the locked map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolMember {
    pub ip: String,
    pub port: u16,
    /// Raw metric snapshot keyed by semantic name (`waiting_queue`,
    /// `cache_usage`, `running_req`), not by the engine's raw Prometheus
    /// metric name.
    #[serde(default)]
    pub metrics: HashMap<String, f64>,
    /// `0.0` meaning "do not pick"; always in `[0, 1]`.
    #[serde(default)]
    pub score: f64,
    pub last_metrics_update: Option<DateTime<Utc>>,
    pub last_score_update: Option<DateTime<Utc>>,
    pub status: MemberStatus,
}

impl PoolMember {
    /// A freshly-discovered member: ready, no metrics yet, zero score
    /// (§4.1 reconciliation contract).
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
            metrics: HashMap::new(),
            score: 0.0,
            last_metrics_update: None,
            last_score_update: None,
            status: MemberStatus::Ready,
        }
    }

    pub fn raw_metric(&self, semantic_key: &str) -> Option<f64> {
        self.metrics.get(semantic_key).copied()
    }
}
