use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

#[derive(Clone, Default)]
pub struct MetricsRegistry {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    orders_scheduled: AtomicU64,
    orders_rejected: AtomicU64,
    status_transitions: AtomicU64,
    machines_registered: AtomicU64,
    queue_depth_peak: AtomicU64,
}

impl MetricsRegistry {
    pub fn inc_orders_scheduled(&self, delta: u64) {
        self.inner.orders_scheduled.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_orders_rejected(&self, delta: u64) {
        self.inner.orders_rejected.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_status_transitions(&self, delta: u64) {
        self.inner
            .status_transitions
            .fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_machines_registered(&self, delta: u64) {
        self.inner
            .machines_registered
            .fetch_add(delta, Ordering::Relaxed);
    }

    /// Track the longest outstanding queue seen on any single machine.
    pub fn record_queue_depth(&self, depth: u64) {
        self.inner.queue_depth_peak.fetch_max(depth, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            orders_scheduled: self.inner.orders_scheduled.load(Ordering::Relaxed),
            orders_rejected: self.inner.orders_rejected.load(Ordering::Relaxed),
            status_transitions: self.inner.status_transitions.load(Ordering::Relaxed),
            machines_registered: self.inner.machines_registered.load(Ordering::Relaxed),
            queue_depth_peak: self.inner.queue_depth_peak.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub orders_scheduled: u64,
    pub orders_rejected: u64,
    pub status_transitions: u64,
    pub machines_registered: u64,
    pub queue_depth_peak: u64,
}

impl MetricsSnapshot {
    pub fn to_json_line(&self, label: &str) -> String {
        #[derive(Serialize)]
        struct Line<'a> {
            label: &'a str,
            #[serde(flatten)]
            snapshot: &'a MetricsSnapshot,
        }

        serde_json::to_string(&Line {
            label,
            snapshot: self,
        })
        .unwrap_or_else(|_| String::from("{}"))
    }
}
