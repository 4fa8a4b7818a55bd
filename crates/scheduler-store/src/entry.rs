use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use scheduler_types::{MemberKey, PoolConfig, PoolMember};
use tokio::sync::RwLock;

/// A pool's mutable state: its hot-reloadable config plus its member set.
///
/// Membership reconciliation, metrics updates, and scoring updates are all
/// writes to this one struct, serialized by `PoolEntry::inner`'s write
/// lock (§4.4 "writes within one pool are serialized").
pub(crate) struct PoolInner {
    pub config: PoolConfig,
    pub members: HashMap<MemberKey, PoolMember>,
}

/// Owns one pool's locking domain (§4.4 "each pool has its own locking
/// domain"). `fetch_in_flight`/`metrics_in_flight` are plain atomics, not
/// part of `inner`, so a tick's "is a fetch already running" check never
/// has to take the member-data lock (§4.1/§4.2 "a second tick while the
/// first is in-flight is skipped").
pub(crate) struct PoolEntry {
    pub inner: RwLock<PoolInner>,
    fetch_in_flight: AtomicBool,
    metrics_in_flight: AtomicBool,
}

impl PoolEntry {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            inner: RwLock::new(PoolInner {
                config,
                members: HashMap::new(),
            }),
            fetch_in_flight: AtomicBool::new(false),
            metrics_in_flight: AtomicBool::new(false),
        }
    }

    /// Try to claim the membership-fetch in-flight slot. Returns `false`
    /// (and claims nothing) if a fetch is already running for this pool.
    pub fn try_begin_fetch(&self) -> bool {
        self.fetch_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn end_fetch(&self) {
        self.fetch_in_flight.store(false, Ordering::Release);
    }

    /// Try to claim the metrics-scrape in-flight slot for this pool.
    pub fn try_begin_metrics_tick(&self) -> bool {
        self.metrics_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn end_metrics_tick(&self) {
        self.metrics_in_flight.store(false, Ordering::Release);
    }
}
