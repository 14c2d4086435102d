//! Maintenance policy: which records are outdated, and how often to check.

use std::sync::Arc;
use std::time::Duration;

use litestore_core::Predicate;

/// Eviction policy for a [`VolatileStore`](crate::VolatileStore).
///
/// Pairs an *outdate* predicate with an optional minimum re-check interval:
///
/// - no interval: the eviction pass runs before **every** store operation;
/// - interval `T`: the pass runs at most once per deadline, bounding the
///   staleness window to `T` while amortizing the scan cost.
///
/// Without a policy the store performs no maintenance at all.
pub struct MaintenancePolicy<V> {
    outdated: Arc<dyn Predicate<V>>,
    interval: Option<Duration>,
}

impl<V> MaintenancePolicy<V> {
    /// Evict matching records before every operation.
    pub fn new(outdated: impl Predicate<V> + 'static) -> Self {
        Self {
            outdated: Arc::new(outdated),
            interval: None,
        }
    }

    /// Evict matching records at most once per `interval`.
    pub fn with_interval(outdated: impl Predicate<V> + 'static, interval: Duration) -> Self {
        Self {
            outdated: Arc::new(outdated),
            interval: Some(interval),
        }
    }

    /// The outdate predicate.
    pub(crate) fn outdated(&self) -> &dyn Predicate<V> {
        self.outdated.as_ref()
    }

    /// The minimum re-check interval, if any.
    pub(crate) fn interval(&self) -> Option<Duration> {
        self.interval
    }
}

impl<V> Clone for MaintenancePolicy<V> {
    fn clone(&self) -> Self {
        Self {
            outdated: Arc::clone(&self.outdated),
            interval: self.interval,
        }
    }
}

impl<V> std::fmt::Debug for MaintenancePolicy<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenancePolicy")
            .field("interval", &self.interval)
            .finish()
    }
}
