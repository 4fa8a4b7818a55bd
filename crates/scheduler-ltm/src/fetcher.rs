use std::{sync::Arc, time::Duration};

use scheduler_store::PoolStore;
use scheduler_types::PoolKey;
use tokio_util::sync::CancellationToken;
use tracing::{info_span, warn, Instrument};

use crate::client::LtmClient;

/// One pool's Membership Fetcher loop (§4.1). Runs until the pool is
/// removed from the store (config hot-reload dropping it) or shutdown is
/// requested.
///
/// Fetches across pools run as independent tasks (one per pool, spawned by
/// the runtime); within one pool, `PoolStore::try_begin_fetch` guarantees a
/// second tick never overlaps an in-flight one (§4.1 "Concurrency").
pub async fn run(
    store: PoolStore,
    client: Arc<dyn LtmClient>,
    key: PoolKey,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.cancelled() => {
                info_span!("membership_fetcher", pool = %key).in_scope(|| {
                    tracing::info!("shutdown requested, stopping fetcher");
                });
                return;
            }
        }

        if !store.contains(&key) {
            tracing::info!(pool = %key, "pool no longer configured, stopping fetcher");
            return;
        }

        let Some(guard) = store.try_begin_fetch(&key) else {
            tracing::debug!(pool = %key, "previous fetch still in flight, skipping tick");
            continue;
        };

        tick(&store, client.as_ref(), &key)
            .instrument(info_span!("membership_fetch", pool = %key))
            .await;
        drop(guard);
    }
}

async fn tick(store: &PoolStore, client: &dyn LtmClient, key: &PoolKey) {
    match client.list_members(&key.partition, &key.name).await {
        Ok(discovered) => match store.reconcile_members(key, discovered).await {
            Ok(outcome) => {
                if !outcome.added.is_empty() || !outcome.removed.is_empty() {
                    tracing::info!(
                        added = outcome.added.len(),
                        removed = outcome.removed.len(),
                        retained = outcome.retained,
                        "membership reconciled"
                    );
                }
            }
            Err(err) => warn!(%err, "reconcile failed after pool disappeared mid-fetch"),
        },
        // §4.1 failure semantics: previous membership is left untouched.
        Err(err) => warn!(%err, "membership fetch failed, retaining previous membership"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use scheduler_types::{
        Algorithm, AlgorithmName, AlgorithmParams, EngineKind, FallbackConfig, MemberKey,
        MetricsEndpointConfig, PoolConfig, Scheme,
    };

    use super::*;
    use crate::client::MockLtmClient;

    fn pool_config() -> PoolConfig {
        PoolConfig {
            engine_kind: EngineKind::Vllm,
            metrics_endpoint: MetricsEndpointConfig {
                scheme: Scheme::Http,
                port_override: None,
                path: "metrics".to_string(),
                timeout: Duration::from_secs(1),
                bearer_token: None,
                basic_auth: None,
            },
            algorithm: Algorithm::new(AlgorithmName::S1, AlgorithmParams::default()),
            fallback: FallbackConfig::default(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fetcher_reconciles_on_each_tick_until_shutdown() {
        let store = PoolStore::new();
        let key = PoolKey::new("prod", "chat");
        store.add_or_update_pool(key.clone(), pool_config()).await;

        let mut members = HashSet::new();
        members.insert(MemberKey::new("10.0.0.1", 8000));

        let mut mock = MockLtmClient::new();
        mock.expect_list_members()
            .returning(move |_, _| Ok(members.clone()));
        let client: Arc<dyn LtmClient> = Arc::new(mock);

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run(
            store.clone(),
            client.clone(),
            key.clone(),
            Duration::from_millis(10),
            shutdown.clone(),
        ));

        tokio::time::advance(Duration::from_millis(35)).await;
        shutdown.cancel();
        handle.await.unwrap();

        let snap = store.snapshot(&key).await.unwrap();
        assert_eq!(snap.members.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fetcher_stops_once_pool_is_removed_from_store() {
        let store = PoolStore::new();
        let key = PoolKey::new("prod", "chat");
        store.add_or_update_pool(key.clone(), pool_config()).await;

        let mut mock = MockLtmClient::new();
        mock.expect_list_members().returning(|_, _| Ok(HashSet::new()));
        let client: Arc<dyn LtmClient> = Arc::new(mock);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run(
            store.clone(),
            client,
            key.clone(),
            Duration::from_millis(10),
            shutdown,
        ));

        store.remove_pool(&key);
        tokio::time::advance(Duration::from_millis(50)).await;
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }
}
