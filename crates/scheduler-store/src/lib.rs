//! The Pool Store (§4.4): the shared in-memory state tying the Membership
//! Fetcher, Metrics Collector, Score Engine, and Selector together under
//! concurrent reads, writes, and configuration hot-reload.

mod entry;
mod error;
mod snapshot;
mod store;

pub use error::StoreError;
pub use snapshot::PoolSnapshot;
pub use store::{FetchGuard, MetricsTickGuard, PoolStore, ReconcileOutcome};

#[cfg(test)]
mod tests {
    use std::{
        collections::{HashMap, HashSet},
        time::Duration,
    };

    use scheduler_types::{
        Algorithm, AlgorithmName, AlgorithmParams, EngineKind, FallbackConfig, MemberKey,
        MemberStatus, MetricsEndpointConfig, PoolConfig, PoolKey, Scheme,
    };

    use super::*;

    fn pool_config() -> PoolConfig {
        PoolConfig {
            engine_kind: EngineKind::Vllm,
            metrics_endpoint: MetricsEndpointConfig {
                scheme: Scheme::Http,
                port_override: None,
                path: "metrics".to_string(),
                timeout: Duration::from_secs(2),
                bearer_token: None,
                basic_auth: None,
            },
            algorithm: Algorithm::new(
                AlgorithmName::S1,
                AlgorithmParams { w_a: 0.5, w_b: 0.5, ..Default::default() },
            ),
            fallback: FallbackConfig::default(),
        }
    }

    #[tokio::test]
    async fn reconcile_adds_and_removes_members() {
        let store = PoolStore::new();
        let key = PoolKey::new("p", "n");
        store.add_or_update_pool(key.clone(), pool_config()).await;

        let discovered: HashSet<MemberKey> =
            [MemberKey::new("10.0.0.1", 8000), MemberKey::new("10.0.0.2", 8000)]
                .into_iter()
                .collect();
        let outcome = store.reconcile_members(&key, discovered.clone()).await.unwrap();
        assert_eq!(outcome.added.len(), 2);

        let snap = store.snapshot(&key).await.unwrap();
        assert_eq!(snap.members.len(), 2);

        // Second reconciliation drops one member, keeps the other.
        let discovered2: HashSet<MemberKey> = [MemberKey::new("10.0.0.1", 8000)].into_iter().collect();
        let outcome2 = store.reconcile_members(&key, discovered2).await.unwrap();
        assert_eq!(outcome2.removed, vec![MemberKey::new("10.0.0.2", 8000)]);

        let snap2 = store.snapshot(&key).await.unwrap();
        assert_eq!(snap2.members.len(), 1);
    }

    #[tokio::test]
    async fn reconcile_preserves_metrics_for_retained_members() {
        let store = PoolStore::new();
        let key = PoolKey::new("p", "n");
        store.add_or_update_pool(key.clone(), pool_config()).await;
        let member_key = MemberKey::new("10.0.0.1", 8000);
        store
            .reconcile_members(&key, [member_key.clone()].into_iter().collect())
            .await
            .unwrap();

        let mut metrics = std::collections::HashMap::new();
        metrics.insert("waiting_queue".to_string(), 4.0);
        metrics.insert("cache_usage".to_string(), 0.2);
        store.record_metrics_success(&key, &member_key, metrics).await.unwrap();

        // Reconcile again with the same member set.
        store
            .reconcile_members(&key, [member_key.clone()].into_iter().collect())
            .await
            .unwrap();

        let snap = store.snapshot(&key).await.unwrap();
        let member = &snap.members[&member_key];
        assert_eq!(member.raw_metric("waiting_queue"), Some(4.0));
        assert!(member.last_metrics_update.is_some());
    }

    #[tokio::test]
    async fn failed_fetch_leaves_membership_unchanged() {
        let store = PoolStore::new();
        let key = PoolKey::new("p", "n");
        store.add_or_update_pool(key.clone(), pool_config()).await;
        store
            .reconcile_members(&key, [MemberKey::new("a", 1)].into_iter().collect())
            .await
            .unwrap();

        // A failed fetch never calls reconcile_members at all; the store
        // simply isn't touched, so the previous member set survives.
        let snap = store.snapshot(&key).await.unwrap();
        assert_eq!(snap.members.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_member_forces_score_to_zero() {
        let store = PoolStore::new();
        let key = PoolKey::new("p", "n");
        store.add_or_update_pool(key.clone(), pool_config()).await;
        let member_key = MemberKey::new("a", 1);
        store
            .reconcile_members(&key, [member_key.clone(), MemberKey::new("b", 1)].into_iter().collect())
            .await
            .unwrap();

        let mut metrics = std::collections::HashMap::new();
        metrics.insert("waiting_queue".to_string(), 1.0);
        metrics.insert("cache_usage".to_string(), 0.1);
        store.record_metrics_success(&key, &member_key, metrics.clone()).await.unwrap();
        store
            .record_metrics_success(&key, &MemberKey::new("b", 1), metrics)
            .await
            .unwrap();

        store
            .record_metrics_failure(&key, &member_key, MemberStatus::Unreachable)
            .await
            .unwrap();

        let snap = store.snapshot(&key).await.unwrap();
        assert_eq!(snap.members[&member_key].score, 0.0);
        assert_eq!(snap.members[&member_key].status, MemberStatus::Unreachable);
    }

    #[tokio::test]
    async fn hot_reload_updates_weights_without_evicting_members() {
        let store = PoolStore::new();
        let key = PoolKey::new("p", "n");
        store.add_or_update_pool(key.clone(), pool_config()).await;
        let member_key = MemberKey::new("a", 1);
        store
            .reconcile_members(&key, [member_key.clone()].into_iter().collect())
            .await
            .unwrap();

        let mut new_config = pool_config();
        new_config.algorithm = Algorithm::new(
            AlgorithmName::S1,
            AlgorithmParams { w_a: 0.1, w_b: 0.9, ..Default::default() },
        );
        store.add_or_update_pool(key.clone(), new_config).await;

        let snap = store.snapshot(&key).await.unwrap();
        assert_eq!(snap.config.algorithm.params.w_a, 0.1);
        assert_eq!(snap.members.len(), 1, "membership must survive a config reload");
    }

    #[tokio::test]
    async fn apply_full_config_removes_pools_dropped_from_configuration() {
        let store = PoolStore::new();
        let keep = PoolKey::new("p", "keep");
        let drop_me = PoolKey::new("p", "drop");
        store.add_or_update_pool(keep.clone(), pool_config()).await;
        store.add_or_update_pool(drop_me.clone(), pool_config()).await;

        let mut desired = HashMap::new();
        desired.insert(keep.clone(), pool_config());
        store.apply_full_config(desired).await;

        assert!(store.contains(&keep));
        assert!(!store.contains(&drop_me));
    }

    #[tokio::test]
    async fn second_fetch_guard_is_rejected_while_first_is_held() {
        let store = PoolStore::new();
        let key = PoolKey::new("p", "n");
        store.add_or_update_pool(key.clone(), pool_config()).await;

        let guard = store.try_begin_fetch(&key);
        assert!(guard.is_some());
        assert!(store.try_begin_fetch(&key).is_none());
        drop(guard);
        assert!(store.try_begin_fetch(&key).is_some());
    }

    #[tokio::test]
    async fn unknown_pool_operations_return_not_found() {
        let store = PoolStore::new();
        let key = PoolKey::new("p", "missing");
        let err = store.reconcile_members(&key, HashSet::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::PoolNotFound(k) if k == key));
    }
}
