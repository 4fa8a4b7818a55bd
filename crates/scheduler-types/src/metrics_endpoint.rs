use std::time::Duration;

use serde::{Deserialize, Serialize};

/// URL scheme for a member's metrics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Resolved (not raw-env-name) basic-auth credentials for scraping metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuthCredentials {
    pub user: String,
    pub password: String,
}

/// Per-pool template for building each member's metrics URL and request.
///
/// Secrets (`bearer_token`, `basic_auth.password`) are already resolved from
/// their environment variables by the time a `MetricsEndpointConfig` exists
/// here; `scheduler-config` owns reading `password_env`/`metric_pwd_env`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsEndpointConfig {
    pub scheme: Scheme,
    #[serde(default)]
    pub port_override: Option<u16>,
    pub path: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default)]
    pub basic_auth: Option<BasicAuthCredentials>,
}

impl MetricsEndpointConfig {
    /// Build the request URL for a given member, honoring the port
    /// override (§3 "metrics-endpoint template").
    pub fn url_for(&self, ip: &str, member_port: u16) -> String {
        let port = self.port_override.unwrap_or(member_port);
        let path = self.path.strip_prefix('/').unwrap_or(&self.path);
        format!("{}://{}:{}/{}", self.scheme.as_str(), ip, port, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(port_override: Option<u16>) -> MetricsEndpointConfig {
        MetricsEndpointConfig {
            scheme: Scheme::Http,
            port_override,
            path: "metrics".to_string(),
            timeout: Duration::from_secs(2),
            bearer_token: None,
            basic_auth: None,
        }
    }

    #[test]
    fn url_uses_member_port_by_default() {
        let cfg = endpoint(None);
        assert_eq!(cfg.url_for("10.0.0.1", 8000), "http://10.0.0.1:8000/metrics");
    }

    #[test]
    fn url_prefers_port_override() {
        let cfg = endpoint(Some(9400));
        assert_eq!(cfg.url_for("10.0.0.1", 8000), "http://10.0.0.1:9400/metrics");
    }

    #[test]
    fn leading_slash_in_path_is_not_duplicated() {
        let mut cfg = endpoint(None);
        cfg.path = "/metrics".to_string();
        assert_eq!(cfg.url_for("host", 1), "http://host:1/metrics");
    }
}
