use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::Utc;
use dashmap::DashMap;
use scheduler_score::{compute_scores, MemberMetrics};
use scheduler_types::{MemberKey, MemberStatus, PoolConfig, PoolKey, PoolMember};
use tracing::{debug, info, warn};

use crate::{entry::PoolEntry, error::StoreError, snapshot::PoolSnapshot};

/// Outcome of one membership reconciliation, for callers that want to log
/// or emit metrics about churn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub added: Vec<MemberKey>,
    pub removed: Vec<MemberKey>,
    pub retained: usize,
}

/// The Pool Store (§4.4): the single shared source of truth for pools,
/// members, metrics, scores, and per-pool config.
///
/// `(partition, name) -> Pool` lives in a `DashMap` so cross-pool
/// operations (adding/removing whole pools) never take a single
/// process-wide lock; each pool's own data lives behind its own
/// `tokio::sync::RwLock` inside `PoolEntry` (§4.4 "the top-level registry
/// uses its own coordination").
#[derive(Default, Clone)]
pub struct PoolStore {
    pools: Arc<DashMap<PoolKey, Arc<PoolEntry>>>,
}

impl PoolStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool if absent, or update its mutable config fields in
    /// place if present (§4.4 "add_or_update_pool", §9 "mutable vs
    /// immutable split"). Never touches membership or metrics.
    pub async fn add_or_update_pool(&self, key: PoolKey, config: PoolConfig) {
        if let Some(entry) = self.pools.get(&key) {
            let mut inner = entry.inner.write().await;
            inner.config = config;
            debug!(pool = %key, "updated pool config in place");
        } else {
            self.pools.insert(key.clone(), Arc::new(PoolEntry::new(config)));
            info!(pool = %key, "registered new pool");
        }
    }

    /// Remove a pool entirely (config hot-reload dropping it). In-flight
    /// ticks referencing the old `Arc<PoolEntry>` finish naturally; new
    /// ticks find no entry and stop scheduling themselves.
    pub fn remove_pool(&self, key: &PoolKey) -> bool {
        let removed = self.pools.remove(key).is_some();
        if removed {
            info!(pool = %key, "removed pool (dropped from configuration)");
        }
        removed
    }

    pub fn contains(&self, key: &PoolKey) -> bool {
        self.pools.contains_key(key)
    }

    pub fn list_keys(&self) -> Vec<PoolKey> {
        self.pools.iter().map(|e| e.key().clone()).collect()
    }

    /// §4.1 reconciliation contract: add new, drop missing, retain both
    /// (preserving metrics/score). Atomic at the per-pool level — readers
    /// see either the pre- or post-reconciliation set, never torn
    /// (§3 invariant), because the whole diff happens under one write-lock
    /// critical section.
    pub async fn reconcile_members(
        &self,
        key: &PoolKey,
        discovered: HashSet<MemberKey>,
    ) -> Result<ReconcileOutcome, StoreError> {
        let entry = self.pools.get(key).map(|e| e.clone()).ok_or_else(|| StoreError::PoolNotFound(key.clone()))?;
        let mut inner = entry.inner.write().await;

        let mut outcome = ReconcileOutcome::default();
        inner.members.retain(|member_key, _| {
            let keep = discovered.contains(member_key);
            if !keep {
                outcome.removed.push(member_key.clone());
            }
            keep
        });
        outcome.retained = inner.members.len();

        for member_key in &discovered {
            if !inner.members.contains_key(member_key) {
                inner.members.insert(
                    member_key.clone(),
                    PoolMember::new(member_key.ip.clone(), member_key.port),
                );
                outcome.added.push(member_key.clone());
            }
        }

        rescore_locked(&mut inner);
        Ok(outcome)
    }

    /// §4.2 success path: replace the member's raw snapshot, mark it
    /// `READY`, stamp `last_metrics_update`, then rescore the whole pool.
    pub async fn record_metrics_success(
        &self,
        key: &PoolKey,
        member_key: &MemberKey,
        metrics: HashMap<String, f64>,
    ) -> Result<(), StoreError> {
        let entry = self.pools.get(key).map(|e| e.clone()).ok_or_else(|| StoreError::PoolNotFound(key.clone()))?;
        let mut inner = entry.inner.write().await;
        if let Some(member) = inner.members.get_mut(member_key) {
            member.metrics = metrics;
            member.last_metrics_update = Some(Utc::now());
            member.status = MemberStatus::Ready;
        } else {
            warn!(pool = %key, member = %member_key, "metrics arrived for a member no longer in the pool");
        }
        rescore_locked(&mut inner);
        Ok(())
    }

    /// §4.2 failure path: keep the last good snapshot, flip status so the
    /// next rescore forces `score = 0` (invariant 1, §8).
    pub async fn record_metrics_failure(
        &self,
        key: &PoolKey,
        member_key: &MemberKey,
        status: MemberStatus,
    ) -> Result<(), StoreError> {
        debug_assert!(!status.is_ready());
        let entry = self.pools.get(key).map(|e| e.clone()).ok_or_else(|| StoreError::PoolNotFound(key.clone()))?;
        let mut inner = entry.inner.write().await;
        if let Some(member) = inner.members.get_mut(member_key) {
            member.status = status;
        }
        rescore_locked(&mut inner);
        Ok(())
    }

    /// An owned, consistent read of one pool (§4.4 "reads never block each
    /// other"): the write lock is only ever held for the duration of the
    /// clone.
    pub async fn snapshot(&self, key: &PoolKey) -> Option<PoolSnapshot> {
        let entry = self.pools.get(key)?.clone();
        let inner = entry.inner.read().await;
        Some(PoolSnapshot {
            config: inner.config.clone(),
            members: inner.members.clone(),
        })
    }

    pub async fn all_snapshots(&self) -> Vec<(PoolKey, PoolSnapshot)> {
        let keys = self.list_keys();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(snap) = self.snapshot(&key).await {
                out.push((key, snap));
            }
        }
        out
    }

    /// Claim the per-pool membership-fetch in-flight slot; `None` if a
    /// fetch is already running or the pool is unknown.
    pub fn try_begin_fetch(&self, key: &PoolKey) -> Option<FetchGuard> {
        let entry = self.pools.get(key)?.clone();
        if entry.try_begin_fetch() {
            Some(FetchGuard { entry })
        } else {
            None
        }
    }

    /// Claim the per-pool metrics-tick in-flight slot; `None` if a tick is
    /// already running or the pool is unknown.
    pub fn try_begin_metrics_tick(&self, key: &PoolKey) -> Option<MetricsTickGuard> {
        let entry = self.pools.get(key)?.clone();
        if entry.try_begin_metrics_tick() {
            Some(MetricsTickGuard { entry })
        } else {
            None
        }
    }

    /// Diff the desired configuration against live pools and apply in
    /// place: add new pools, drop vanished ones, update mutable fields of
    /// retained ones — without rebuilding membership or metrics state
    /// (§4.4 "Config hot-reload", §9).
    pub async fn apply_full_config(&self, desired: HashMap<PoolKey, PoolConfig>) {
        let live: HashSet<PoolKey> = self.list_keys().into_iter().collect();
        let desired_keys: HashSet<PoolKey> = desired.keys().cloned().collect();

        for stale in live.difference(&desired_keys) {
            self.remove_pool(stale);
        }
        for (key, config) in desired {
            self.add_or_update_pool(key, config).await;
        }
    }
}

/// Recompute every member's score under the pool's current algorithm.
/// Called with the write lock already held — scoring is pure/non-suspending
/// (§4.3.2), so this never yields mid-critical-section.
fn rescore_locked(inner: &mut crate::entry::PoolInner) {
    let keys: Vec<MemberKey> = inner.members.keys().cloned().collect();
    let inputs: Vec<MemberMetrics> = keys
        .iter()
        .map(|k| {
            let member = &inner.members[k];
            MemberMetrics {
                ready: member.status.is_ready(),
                waiting_queue: member.raw_metric("waiting_queue"),
                cache_usage: member.raw_metric("cache_usage"),
                running_req: member.raw_metric("running_req"),
            }
        })
        .collect();

    let scores = compute_scores(&inner.config.algorithm, &inputs);
    let now = Utc::now();
    for (key, score) in keys.into_iter().zip(scores) {
        if let Some(member) = inner.members.get_mut(&key) {
            member.score = score;
            member.last_score_update = Some(now);
        }
    }
}

/// RAII guard releasing a pool's fetch in-flight slot on drop, so a
/// panicking or cancelled fetch task never wedges the slot permanently.
pub struct FetchGuard {
    entry: Arc<PoolEntry>,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.entry.end_fetch();
    }
}

/// Same as `FetchGuard` for the metrics-collection in-flight slot.
pub struct MetricsTickGuard {
    entry: Arc<PoolEntry>,
}

impl Drop for MetricsTickGuard {
    fn drop(&mut self) {
        self.entry.end_metrics_tick();
    }
}
