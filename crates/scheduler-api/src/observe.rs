//! Prometheus registration (§6 "ambient `/metrics`", AMBIENT STACK
//! "Metrics"). Counters are pushed from the route handlers that observe
//! the event; gauges reflecting current Pool Store state are rebuilt from
//! a fresh snapshot on every scrape rather than pushed, since the Pool
//! Store is already the single source of truth for "current" values and
//! keeping a second copy in sync would just be another way to drift.

use prometheus::{
    register_gauge_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_gauge_vec_with_registry, GaugeVec, IntCounterVec, IntGaugeVec, Registry,
};
use scheduler_store::PoolStore;

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,
    /// Labeled by `result` (`selected`/`none`/`fallback`).
    select_outcomes: IntCounterVec,
    member_count: IntGaugeVec,
    member_score: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let select_outcomes = register_int_counter_vec_with_registry!(
            "scheduler_select_outcomes_total",
            "Outcomes returned by /scheduler/select, by result",
            &["pool", "result"],
            registry
        )
        .expect("select_outcomes metric registration");
        let member_count = register_int_gauge_vec_with_registry!(
            "scheduler_pool_member_count",
            "Current number of members known to a pool",
            &["pool"],
            registry
        )
        .expect("member_count metric registration");
        let member_score = register_gauge_vec_with_registry!(
            "scheduler_member_score",
            "Current score of a pool member",
            &["pool", "member"],
            registry
        )
        .expect("member_score metric registration");

        Self { registry, select_outcomes, member_count, member_score }
    }

    pub fn record_select_outcome(&self, pool: &str, result: &str) {
        self.select_outcomes.with_label_values(&[pool, result]).inc();
    }

    /// Repopulate the gauges from a fresh `PoolStore` read. Called once
    /// per `/metrics` scrape.
    pub async fn refresh_from_store(&self, store: &PoolStore) {
        self.member_count.reset();
        self.member_score.reset();
        for key in store.list_keys() {
            let pool = key.to_string();
            if let Some(snapshot) = store.snapshot(&key).await {
                self.member_count.with_label_values(&[&pool]).set(snapshot.members.len() as i64);
                for member in snapshot.members.values() {
                    let member_label = format!("{}:{}", member.ip, member.port);
                    self.member_score.with_label_values(&[&pool, &member_label]).set(member.score);
                }
            }
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
