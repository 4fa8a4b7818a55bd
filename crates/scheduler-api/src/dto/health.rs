use serde::Serialize;

/// `GET /health` (§6). Always `200`; liveness, not readiness — a sidecar
/// with zero configured pools is still "healthy".
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
}

impl HealthResponse {
    pub fn healthy(pool_count: usize) -> Self {
        Self { status: "healthy", message: format!("{pool_count} pool(s) configured") }
    }
}
