//! Parse, resolve, and validate the YAML configuration file into a
//! `RuntimeConfig` (§3, §6). Secrets are resolved here so nothing
//! downstream ever touches `std::env` again.

use std::{collections::HashMap, path::Path, time::Duration};

use scheduler_types::{
    Algorithm, AlgorithmName, AlgorithmParams, EngineKind, FallbackConfig, MetricsEndpointConfig,
    PoolConfig, PoolKey, Scheme,
};
use std::str::FromStr;

use crate::{
    error::ConfigError,
    model::{RawConfig, RawMode, RawPool},
};

/// Fully parsed, validated, in-memory configuration (§3 "RuntimeConfig").
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub api_host: String,
    pub api_port: u16,
    pub log_level: String,
    /// Config poll period.
    pub reload_interval: Duration,
    pub f5: F5Config,
    pub pool_fetch_interval: Duration,
    pub metrics_fetch_interval: Duration,
    pub pools: HashMap<PoolKey, PoolConfig>,
}

#[derive(Debug, Clone)]
pub struct F5Config {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Read and parse `path`, resolving secrets and validating every pool.
/// Returns the first validation error encountered; callers (the loader's
/// caller at startup, or the hot-reload watcher) decide whether that's
/// fatal or merely logged.
pub async fn load_from_file(path: &Path) -> Result<RuntimeConfig, ConfigError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_and_validate(&text)
}

pub fn parse_and_validate(text: &str) -> Result<RuntimeConfig, ConfigError> {
    let raw: RawConfig = serde_yaml::from_str(text)?;

    let password = resolve_secret(&raw.f5.password_env, "f5.password_env")?;

    let modes: HashMap<&str, &RawMode> = raw.modes.iter().map(|m| (m.name.as_str(), m)).collect();

    let mut pools = HashMap::new();
    for pool in &raw.pools {
        let key = PoolKey::new(pool.partition.clone(), pool.name.clone());
        if pools.contains_key(&key) {
            return Err(ConfigError::DuplicatePool {
                partition: pool.partition.clone(),
                name: pool.name.clone(),
            });
        }
        let config = resolve_pool(pool, &modes)?;
        pools.insert(key, config);
    }

    Ok(RuntimeConfig {
        api_host: raw.global.api_host,
        api_port: raw.global.api_port,
        log_level: raw.global.log_level,
        reload_interval: Duration::from_secs(raw.global.interval),
        f5: F5Config { host: raw.f5.host, port: raw.f5.port, username: raw.f5.username, password },
        pool_fetch_interval: Duration::from_secs(raw.scheduler.pool_fetch_interval),
        metrics_fetch_interval: Duration::from_millis(raw.scheduler.metrics_fetch_interval),
        pools,
    })
}

fn resolve_secret(env_var: &str, purpose: &str) -> Result<String, ConfigError> {
    std::env::var(env_var).map_err(|_| ConfigError::MissingSecret {
        env_var: env_var.to_string(),
        purpose: purpose.to_string(),
    })
}

fn resolve_pool(
    pool: &RawPool,
    modes: &HashMap<&str, &RawMode>,
) -> Result<PoolConfig, ConfigError> {
    let engine_kind = match pool.engine_type.to_uppercase().as_str() {
        "VLLM" => EngineKind::Vllm,
        "SGLANG" => EngineKind::Sglang,
        other => {
            return Err(ConfigError::UnknownEngine {
                partition: pool.partition.clone(),
                name: pool.name.clone(),
                engine_type: other.to_string(),
            })
        }
    };

    let algorithm_name = AlgorithmName::from_str(&pool.algorithm).map_err(|_| {
        ConfigError::UnknownAlgorithm {
            partition: pool.partition.clone(),
            name: pool.name.clone(),
            algorithm: pool.algorithm.clone(),
        }
    })?;

    let params = resolve_params(pool, modes)?;
    validate_algorithm_params(pool, algorithm_name, &params)?;

    let metrics_endpoint = resolve_metrics_endpoint(pool)?;

    Ok(PoolConfig {
        engine_kind,
        metrics_endpoint,
        algorithm: Algorithm::new(algorithm_name, params),
        fallback: FallbackConfig {
            pool_fallback: pool.fallback.pool_fallback,
            member_running_req_threshold: pool.fallback.member_running_req_threshold,
            member_waiting_queue_threshold: pool.fallback.member_waiting_queue_threshold,
        },
    })
}

/// `mode_name`, when present, supplies the weight bag; otherwise the
/// pool's own flattened `w_a`/`w_b`/`w_g`/`transition_point`/`steepness`
/// fields are used directly. This is the natural reading of §3's "Mode"
/// indirection: a mode is just a named, reusable `AlgorithmParams`.
fn resolve_params(
    pool: &RawPool,
    modes: &HashMap<&str, &RawMode>,
) -> Result<AlgorithmParams, ConfigError> {
    if let Some(mode_name) = &pool.mode_name {
        let mode = modes.get(mode_name.as_str()).ok_or_else(|| ConfigError::UndefinedMode {
            partition: pool.partition.clone(),
            name: pool.name.clone(),
            mode_name: mode_name.clone(),
        })?;
        return Ok(AlgorithmParams {
            w_a: mode.w_a,
            w_b: mode.w_b,
            w_g: mode.w_g,
            transition_point: mode.transition_point,
            steepness: mode.steepness,
        });
    }

    let inline = &pool.inline_params;
    Ok(AlgorithmParams {
        w_a: inline.get("w_a").copied().unwrap_or(0.5),
        w_b: inline.get("w_b").copied().unwrap_or(0.5),
        w_g: inline.get("w_g").copied(),
        transition_point: inline.get("transition_point").copied(),
        steepness: inline.get("steepness").copied(),
    })
}

fn validate_algorithm_params(
    pool: &RawPool,
    name: AlgorithmName,
    params: &AlgorithmParams,
) -> Result<(), ConfigError> {
    if name.is_three_metric() && params.w_g.is_none() {
        return Err(ConfigError::MissingAlgorithmParameter {
            partition: pool.partition.clone(),
            name: pool.name.clone(),
            algorithm: pool.algorithm.clone(),
            parameter: "w_g",
        });
    }
    if name.requires_dynamic_waiting_params() {
        if params.transition_point.is_none() {
            return Err(ConfigError::MissingAlgorithmParameter {
                partition: pool.partition.clone(),
                name: pool.name.clone(),
                algorithm: pool.algorithm.clone(),
                parameter: "transition_point",
            });
        }
        if params.steepness.is_none() {
            return Err(ConfigError::MissingAlgorithmParameter {
                partition: pool.partition.clone(),
                name: pool.name.clone(),
                algorithm: pool.algorithm.clone(),
                parameter: "steepness",
            });
        }
    }
    Ok(())
}

fn resolve_metrics_endpoint(pool: &RawPool) -> Result<MetricsEndpointConfig, ConfigError> {
    let scheme = match pool.metrics.schema.to_lowercase().as_str() {
        "http" => Scheme::Http,
        "https" => Scheme::Https,
        other => {
            return Err(ConfigError::UnknownScheme {
                partition: pool.partition.clone(),
                name: pool.name.clone(),
                schema: other.to_string(),
            })
        }
    };

    let timeout = humantime::parse_duration(&pool.metrics.timeout).map_err(|source| {
        ConfigError::Duration {
            field: format!("pools[{}/{}].metrics.timeout", pool.partition, pool.name),
            value: pool.metrics.timeout.clone(),
            source,
        }
    })?;

    let basic_auth = match (&pool.metrics.metric_user, &pool.metrics.metric_pwd_env) {
        (Some(user), Some(env_var)) => {
            let password = resolve_secret(env_var, "metrics.metric_pwd_env")?;
            Some(scheduler_types::BasicAuthCredentials { user: user.clone(), password })
        }
        (None, None) => None,
        _ => None,
    };

    Ok(MetricsEndpointConfig {
        scheme,
        port_override: pool.metrics.port,
        path: pool.metrics.path.clone(),
        timeout,
        bearer_token: pool.metrics.api_key.clone(),
        basic_auth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
global:
  interval: 30
  api_host: "0.0.0.0"
  api_port: 8080
  log_level: info
f5:
  host: f5.internal
  port: 443
  username: admin
  password_env: F5_TEST_PASSWORD
scheduler:
  pool_fetch_interval: 15
  metrics_fetch_interval: 500
modes:
  - name: balanced
    w_a: 0.5
    w_b: 0.5
pools:
  - name: chat-7b
    partition: prod
    engine_type: VLLM
    algorithm: s1
    mode_name: balanced
    metrics:
      schema: http
      path: /metrics
      timeout: 2s
"#;

    #[test]
    fn parses_a_minimal_valid_config() {
        std::env::set_var("F5_TEST_PASSWORD", "hunter2");
        let cfg = parse_and_validate(BASE).unwrap();
        assert_eq!(cfg.api_port, 8080);
        assert_eq!(cfg.f5.password, "hunter2");
        assert_eq!(cfg.pool_fetch_interval, Duration::from_secs(15));
        assert_eq!(cfg.metrics_fetch_interval, Duration::from_millis(500));
        let key = PoolKey::new("prod", "chat-7b");
        let pool = &cfg.pools[&key];
        assert_eq!(pool.algorithm.params.w_a, 0.5);
    }

    #[test]
    fn missing_secret_is_a_config_error() {
        std::env::remove_var("F5_TEST_PASSWORD_MISSING");
        let text = BASE.replace("F5_TEST_PASSWORD", "F5_TEST_PASSWORD_MISSING");
        let err = parse_and_validate(&text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret { .. }));
    }

    #[test]
    fn undefined_mode_name_is_a_config_error() {
        std::env::set_var("F5_TEST_PASSWORD", "hunter2");
        let text = BASE.replace("mode_name: balanced", "mode_name: nonexistent");
        let err = parse_and_validate(&text).unwrap_err();
        assert!(matches!(err, ConfigError::UndefinedMode { .. }));
    }

    #[test]
    fn s2_dynamic_waiting_requires_transition_point_and_steepness() {
        std::env::set_var("F5_TEST_PASSWORD", "hunter2");
        let text = BASE
            .replace("algorithm: s1", "algorithm: s2_dynamic_waiting")
            .replace(
                "mode_name: balanced",
                "w_a: 0.4\n    w_b: 0.3\n    w_g: 0.3",
            );
        let err = parse_and_validate(&text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingAlgorithmParameter { parameter: "transition_point", .. }
        ));
    }

    #[test]
    fn three_metric_algorithm_without_w_g_is_a_config_error() {
        std::env::set_var("F5_TEST_PASSWORD", "hunter2");
        let text = BASE
            .replace("algorithm: s1", "algorithm: s2")
            .replace("mode_name: balanced", "w_a: 0.5\n    w_b: 0.5");
        let err = parse_and_validate(&text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingAlgorithmParameter { parameter: "w_g", .. }));
    }

    #[test]
    fn duplicate_pool_keys_are_rejected() {
        std::env::set_var("F5_TEST_PASSWORD", "hunter2");
        let mut doc: serde_yaml::Value = serde_yaml::from_str(BASE).unwrap();
        let pools = doc.get_mut("pools").unwrap().as_sequence_mut().unwrap();
        let dup = pools[0].clone();
        pools.push(dup);
        let text = serde_yaml::to_string(&doc).unwrap();
        let err = parse_and_validate(&text).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePool { .. }));
    }
}
