use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use futures::stream::{self, StreamExt};
use reqwest::Client;
use scheduler_store::PoolStore;
use scheduler_types::{MemberKey, MemberStatus, MetricsEndpointConfig, PoolKey};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info_span, warn, Instrument};

use crate::{error::MetricsError, parser};

/// Members scraped concurrently in one tick, capped at this constant
/// regardless of pool size (§5 "bounded parallelism ... default equal to
/// member count capped at a small constant, e.g. 64").
const MAX_CONCURRENT_SCRAPES: usize = 64;

/// One pool's Metrics Collector loop (§4.2). Scrapes every known member
/// concurrently each tick; a slow tick causes the *next* tick to be
/// skipped rather than queued (§4.2 "Concurrency").
pub async fn run(
    store: PoolStore,
    http: Client,
    key: PoolKey,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let in_flight: Arc<Mutex<HashSet<MemberKey>>> = Arc::new(Mutex::new(HashSet::new()));

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.cancelled() => {
                tracing::info!(pool = %key, "shutdown requested, stopping metrics collector");
                return;
            }
        }

        if !store.contains(&key) {
            tracing::info!(pool = %key, "pool no longer configured, stopping metrics collector");
            return;
        }

        let Some(guard) = store.try_begin_metrics_tick(&key) else {
            tracing::debug!(pool = %key, "previous metrics tick still in flight, skipping tick");
            continue;
        };

        tick(&store, &http, &key, &in_flight)
            .instrument(info_span!("metrics_tick", pool = %key))
            .await;
        drop(guard);
    }
}

async fn tick(
    store: &PoolStore,
    http: &Client,
    key: &PoolKey,
    in_flight: &Arc<Mutex<HashSet<MemberKey>>>,
) {
    let Some(snapshot) = store.snapshot(key).await else {
        return;
    };
    let endpoint = snapshot.config.metrics_endpoint.clone();
    let engine = snapshot.config.engine_kind;
    let member_keys: Vec<MemberKey> = snapshot.members.keys().cloned().collect();
    let concurrency = MAX_CONCURRENT_SCRAPES.min(member_keys.len().max(1));

    stream::iter(member_keys)
        .for_each_concurrent(concurrency, |member_key| {
            let store = store.clone();
            let http = http.clone();
            let endpoint = endpoint.clone();
            let in_flight = in_flight.clone();
            let key = key.clone();
            async move {
                {
                    let mut guard = in_flight.lock().await;
                    if !guard.insert(member_key.clone()) {
                        tracing::debug!(pool = %key, member = %member_key, "scrape already in flight for member, skipping");
                        return;
                    }
                }

                let result = scrape_member(&http, &endpoint, &member_key, engine).await;
                match result {
                    Ok(metrics) => {
                        if let Err(err) = store.record_metrics_success(&key, &member_key, metrics).await {
                            warn!(%err, pool = %key, member = %member_key, "member disappeared before metrics could be recorded");
                        }
                    }
                    Err(err) => {
                        let status = match &err {
                            MetricsError::Parse(_) => MemberStatus::ParseError,
                            MetricsError::Fetch(_) | MetricsError::Status(_) => MemberStatus::Unreachable,
                        };
                        warn!(%err, pool = %key, member = %member_key, "metrics scrape failed");
                        if let Err(err) = store.record_metrics_failure(&key, &member_key, status).await {
                            warn!(%err, pool = %key, member = %member_key, "member disappeared before failure could be recorded");
                        }
                    }
                }

                in_flight.lock().await.remove(&member_key);
            }
        })
        .await;
}

async fn scrape_member(
    http: &Client,
    endpoint: &MetricsEndpointConfig,
    member: &MemberKey,
    engine: scheduler_types::EngineKind,
) -> Result<HashMap<String, f64>, MetricsError> {
    let url = endpoint.url_for(&member.ip, member.port);
    let mut request = http.get(&url).timeout(endpoint.timeout);

    if let Some(token) = &endpoint.bearer_token {
        request = request.bearer_auth(token);
    } else if let Some(basic) = &endpoint.basic_auth {
        request = request.basic_auth(&basic.user, Some(&basic.password));
    }

    let response = request
        .send()
        .await
        .map_err(|e| MetricsError::Fetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(MetricsError::Status(response.status().as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| MetricsError::Fetch(e.to_string()))?;

    let raw = parser::parse_exposition(&body)?;
    Ok(parser::extract_semantic_metrics(engine, &raw))
}
