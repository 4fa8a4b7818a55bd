//! Process runtime (§2 "service runtime"): owns startup order (load
//! config → build store → spawn background tasks → serve HTTP → await
//! shutdown) and the `CancellationToken` every background task observes.

use std::{collections::HashMap, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use reqwest::Client;
use scheduler_config::{F5Config, RuntimeConfig};
use scheduler_ltm::{F5Credentials, LtmClient, LtmHttpClient};
use scheduler_store::PoolStore;
use scheduler_types::PoolKey;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{observe::Metrics, state::AppState};

/// How often the supervisor checks the Pool Store for pools that have
/// appeared or disappeared since it last looked, and (re)spawns or stops
/// their fetcher/collector tasks accordingly. Decoupled from the config
/// watcher itself: the watcher's only job is updating the Pool Store; the
/// supervisor's job is keeping background tasks in sync with whatever the
/// store currently contains, regardless of who changed it.
const SUPERVISOR_TICK: Duration = Duration::from_secs(2);

pub async fn run(config_path: PathBuf, config: RuntimeConfig) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let store = PoolStore::new();

    for (key, pool_config) in &config.pools {
        store.add_or_update_pool(key.clone(), pool_config.clone()).await;
    }

    let ltm_client: Arc<dyn LtmClient> = Arc::new(LtmHttpClient::new(credentials(&config.f5)));
    let http = Client::new();

    let supervisor = tokio::spawn(run_pool_task_supervisor(
        store.clone(),
        ltm_client.clone(),
        http.clone(),
        config.pool_fetch_interval,
        config.metrics_fetch_interval,
        shutdown.clone(),
    ));

    let watcher = tokio::spawn(scheduler_config::run_config_watcher(
        store.clone(),
        config_path,
        config.clone(),
        config.reload_interval,
        shutdown.clone(),
    ));

    let metrics = Arc::new(Metrics::new());
    let state = AppState { store, http, shutdown: shutdown.clone(), metrics };
    let app = crate::routes::router(state);

    let addr: SocketAddr = format!("{}:{}", config.api_host, config.api_port).parse()?;
    info!(%addr, "starting HTTP server");

    let server_shutdown = shutdown.clone();
    let server = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await });

    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("ctrl-c received, shutting down");
        shutdown_signal.cancel();
    });

    if let Err(err) = server.await {
        warn!(error = %err, "HTTP server exited with an error");
    }

    shutdown.cancel();
    let _ = tokio::join!(supervisor, watcher);
    info!("revoking LTM token (best-effort)");
    ltm_client.logout().await;
    Ok(())
}

fn credentials(f5: &F5Config) -> F5Credentials {
    F5Credentials {
        host: f5.host.clone(),
        port: f5.port,
        username: f5.username.clone(),
        password: f5.password.clone(),
    }
}

/// Keep one Membership Fetcher task and one Metrics Collector task alive
/// per pool currently in the store, spawning new ones as pools appear
/// (config hot-reload adding a pool) and cancelling old ones as pools
/// disappear.
async fn run_pool_task_supervisor(
    store: PoolStore,
    ltm_client: Arc<dyn LtmClient>,
    http: Client,
    pool_fetch_interval: Duration,
    metrics_fetch_interval: Duration,
    shutdown: CancellationToken,
) {
    let mut tracked: HashMap<PoolKey, CancellationToken> = HashMap::new();
    let mut ticker = tokio::time::interval(SUPERVISOR_TICK);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                for token in tracked.values() {
                    token.cancel();
                }
                return;
            }
            _ = ticker.tick() => {}
        }

        let current: std::collections::HashSet<PoolKey> = store.list_keys().into_iter().collect();

        for key in &current {
            if !tracked.contains_key(key) {
                let pool_token = shutdown.child_token();
                tracked.insert(key.clone(), pool_token.clone());
                spawn_pool_tasks(
                    store.clone(),
                    ltm_client.clone(),
                    http.clone(),
                    key.clone(),
                    pool_fetch_interval,
                    metrics_fetch_interval,
                    pool_token,
                );
                info!(pool = %key, "spawned fetcher and collector tasks");
            }
        }

        tracked.retain(|key, token| {
            if current.contains(key) {
                true
            } else {
                token.cancel();
                info!(pool = %key, "cancelled fetcher and collector tasks for removed pool");
                false
            }
        });
    }
}

fn spawn_pool_tasks(
    store: PoolStore,
    ltm_client: Arc<dyn LtmClient>,
    http: Client,
    key: PoolKey,
    pool_fetch_interval: Duration,
    metrics_fetch_interval: Duration,
    shutdown: CancellationToken,
) {
    tokio::spawn(scheduler_ltm::run_membership_fetcher(
        store.clone(),
        ltm_client,
        key.clone(),
        pool_fetch_interval,
        shutdown.clone(),
    ));
    tokio::spawn(scheduler_metrics::run_metrics_collector(
        store,
        http,
        key,
        metrics_fetch_interval,
        shutdown,
    ));
}
