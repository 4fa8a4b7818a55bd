//! Hot-reload (§4.4 "Config hot-reload", §9): poll the config file at
//! `global.interval`, re-parse, diff against the live `PoolStore`, and
//! apply in place. A parse/validation failure is logged and the previous
//! configuration stays in effect (§7).

use std::path::PathBuf;

use scheduler_store::PoolStore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::loader::{load_from_file, RuntimeConfig};

/// Poll `path` forever, applying each successfully parsed config to
/// `store` via `apply_full_config`. Runs until `shutdown` is cancelled.
///
/// `initial` is the already-loaded startup config (so the caller doesn't
/// pay for a redundant read-and-parse on the very first tick).
pub async fn run(
    store: PoolStore,
    path: PathBuf,
    initial: RuntimeConfig,
    poll_interval: std::time::Duration,
    shutdown: CancellationToken,
) {
    apply(&store, initial).await;

    let mut ticker = tokio::time::interval(poll_interval);
    ticker.tick().await; // first tick fires immediately; skip it, we just applied `initial`.

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("config watcher shutting down");
                return;
            }
            _ = ticker.tick() => {
                match load_from_file(&path).await {
                    Ok(config) => apply(&store, config).await,
                    Err(err) => {
                        warn!(error = %err, path = %path.display(), "config reload failed, keeping previous configuration");
                    }
                }
            }
        }
    }
}

async fn apply(store: &PoolStore, config: RuntimeConfig) {
    let desired = config.pools;
    let count = desired.len();
    store.apply_full_config(desired).await;
    info!(pools = count, "applied configuration");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::AsyncWriteExt;

    use super::*;

    const CONFIG: &str = r#"
global:
  interval: 1
  api_host: "0.0.0.0"
  api_port: 8080
  log_level: info
f5:
  host: f5.internal
  port: 443
  username: admin
  password_env: WATCHER_TEST_PASSWORD
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

    #[tokio::test(start_paused = true)]
    async fn watcher_picks_up_edits_without_dropping_the_pool() {
        std::env::set_var("WATCHER_TEST_PASSWORD", "hunter2");
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), CONFIG).unwrap();

        let store = PoolStore::new();
        let initial = crate::loader::parse_and_validate(CONFIG).unwrap();
        let shutdown = CancellationToken::new();

        let path = file.path().to_path_buf();
        let store_clone = store.clone();
        let shutdown_clone = shutdown.clone();
        let handle = tokio::spawn(async move {
            run(store_clone, path, initial, Duration::from_secs(1), shutdown_clone).await;
        });

        tokio::time::advance(Duration::from_millis(10)).await;
        let key = scheduler_types::PoolKey::new("prod", "chat-7b");
        assert!(store.contains(&key));

        let updated = CONFIG.replace("w_a: 0.5\n    w_b: 0.5", "w_a: 0.1\n    w_b: 0.9");
        let mut async_file = tokio::fs::File::create(file.path()).await.unwrap();
        async_file.write_all(updated.as_bytes()).await.unwrap();
        async_file.flush().await.unwrap();
        drop(async_file);

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;

        let snap = store.snapshot(&key).await.unwrap();
        assert_eq!(snap.config.algorithm.params.w_a, 0.1);

        shutdown.cancel();
        tokio::time::advance(Duration::from_secs(2)).await;
        let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
    }
}
