use std::collections::HashMap;

use chrono::{DateTime, Utc};
use scheduler_store::PoolSnapshot;
use scheduler_types::{MemberStatus, PoolKey};
use serde::Serialize;

/// `GET /pools/{name}/{partition}/status` response body (§6).
#[derive(Debug, Serialize)]
pub struct PoolStatusResponse {
    pub name: String,
    pub partition: String,
    pub engine_type: String,
    pub members: Vec<MemberStatusDto>,
}

#[derive(Debug, Serialize)]
pub struct MemberStatusDto {
    pub ip: String,
    pub port: u16,
    pub score: f64,
    pub metrics: HashMap<String, f64>,
    pub status: MemberStatus,
    pub last_update: Option<DateTime<Utc>>,
}

/// `GET /pools/status`: the same per-pool object, for every configured
/// pool.
#[derive(Debug, Serialize)]
pub struct PoolsStatusResponse {
    pub pools: Vec<PoolStatusResponse>,
}

impl PoolStatusResponse {
    pub fn from_snapshot(key: &PoolKey, snapshot: &PoolSnapshot) -> Self {
        let mut members: Vec<MemberStatusDto> = snapshot
            .members
            .values()
            .map(|member| MemberStatusDto {
                ip: member.ip.clone(),
                port: member.port,
                score: member.score,
                metrics: member.metrics.clone(),
                status: member.status,
                last_update: member.last_metrics_update,
            })
            .collect();
        members.sort_by(|a, b| (a.ip.as_str(), a.port).cmp(&(b.ip.as_str(), b.port)));

        Self {
            name: key.name.clone(),
            partition: key.partition.clone(),
            engine_type: snapshot.config.engine_kind.to_string(),
            members,
        }
    }
}
