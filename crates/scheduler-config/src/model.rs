//! The as-parsed YAML shape (§6 "Configuration file"). Fields here are
//! intentionally close to the wire: durations are still plain numbers,
//! secrets are still environment-variable names, weights still need a
//! `mode_name` indirection resolved — `loader` turns this into the
//! validated, resolved `RuntimeConfig`.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    pub global: RawGlobal,
    pub f5: RawF5,
    pub scheduler: RawScheduler,
    #[serde(default)]
    pub modes: Vec<RawMode>,
    #[serde(default)]
    pub pools: Vec<RawPool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGlobal {
    /// Config poll period, in seconds.
    pub interval: u64,
    pub api_host: String,
    pub api_port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawF5 {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password_env: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawScheduler {
    /// Seconds.
    pub pool_fetch_interval: u64,
    /// Milliseconds.
    pub metrics_fetch_interval: u64,
}

/// A named, reusable weight bag a pool can reference by `mode_name`
/// instead of inlining its weights (§3 "Mode").
#[derive(Debug, Clone, Deserialize)]
pub struct RawMode {
    pub name: String,
    pub w_a: f64,
    pub w_b: f64,
    #[serde(default)]
    pub w_g: Option<f64>,
    #[serde(default)]
    pub transition_point: Option<f64>,
    #[serde(default)]
    pub steepness: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFallback {
    #[serde(default)]
    pub pool_fallback: bool,
    #[serde(default)]
    pub member_running_req_threshold: Option<f64>,
    #[serde(default)]
    pub member_waiting_queue_threshold: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMetrics {
    /// `"http"` or `"https"`.
    pub schema: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub path: String,
    /// Human-readable duration, e.g. `"2s"`, `"500ms"`.
    pub timeout: String,
    #[serde(rename = "APIkey", default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub metric_user: Option<String>,
    #[serde(default)]
    pub metric_pwd_env: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPool {
    pub name: String,
    pub partition: String,
    pub engine_type: String,
    /// One of the sixteen closed-set algorithm names (§4.3.2), e.g.
    /// `"s1"`, `"s2_dynamic_waiting"`.
    pub algorithm: String,
    #[serde(default)]
    pub fallback: RawFallback,
    pub metrics: RawMetrics,
    /// References a `RawMode` by name. When absent, `w_a`/`w_b`/etc must
    /// be given inline via the flattened fields below.
    #[serde(default)]
    pub mode_name: Option<String>,
    #[serde(flatten, default)]
    pub inline_params: HashMap<String, f64>,
}

impl Default for RawFallback {
    fn default() -> Self {
        Self {
            pool_fallback: false,
            member_running_req_threshold: None,
            member_waiting_queue_threshold: None,
        }
    }
}
