//! VolatileStore: in-memory record store with lazy maintenance
//!
//! This module implements the volatile backend using:
//! - `Vec<V>` for the insertion-ordered record sequence
//! - `parking_lot::Mutex` for thread-safe access, one lock per instance
//! - an optional [`MaintenancePolicy`] driving lazy, interval-gated eviction
//!
//! # Design Notes
//!
//! - **Maintain, then act**: every public operation runs the maintenance
//!   step and its own read/mutation under the same lock acquisition, as one
//!   atomic unit. Readers never observe records mid-eviction.
//! - **Lock in the constructor**: the mutex is built in `new`, never lazily
//!   injected on first use, so there is no race in lock creation itself.
//! - **No partial mutation**: an eviction or exclude pass evaluates its
//!   predicate over the whole sequence before moving anything, so a failing
//!   predicate aborts the operation with the sequence untouched.

use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use litestore_core::{Predicate, Result};

use crate::policy::MaintenancePolicy;

/// Ordered, unbounded in-memory record store.
///
/// Records are kept in insertion order. With a [`MaintenancePolicy`]
/// configured, outdated records are evicted lazily: each public operation
/// first runs a maintenance step gated by the policy's interval.
///
/// All operations are thread-safe and serialized through one per-instance
/// lock; the sequence of `add`/`filter`/`exclude` observed by any thread is
/// consistent with a total order of calls.
///
/// # Example
///
/// ```
/// use litestore_storage::VolatileStore;
///
/// let store = VolatileStore::new();
/// store.add([1, 2, 3, 4]).unwrap();
///
/// let even = store.filter(|n: &i32| n % 2 == 0).unwrap();
/// assert_eq!(even, vec![2, 4]);
///
/// let removed = store.exclude(|n: &i32| *n > 2).unwrap();
/// assert_eq!(removed, vec![3, 4]);
/// assert_eq!(store.records().unwrap(), vec![1, 2]);
/// ```
pub struct VolatileStore<V> {
    inner: Mutex<Inner<V>>,
    policy: Option<MaintenancePolicy<V>>,
}

struct Inner<V> {
    /// Insertion-ordered record sequence.
    records: Vec<V>,
    /// Next maintenance deadline; `None` until the first gated pass runs.
    deadline: Option<Instant>,
}

impl<V> VolatileStore<V> {
    /// Create a store with no maintenance policy.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a store that evicts records matching the policy's outdate
    /// predicate, at most once per policy interval.
    pub fn with_policy(policy: MaintenancePolicy<V>) -> Self {
        Self::build(Some(policy))
    }

    fn build(policy: Option<MaintenancePolicy<V>>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: Vec::new(),
                deadline: None,
            }),
            policy,
        }
    }

    /// Run the maintenance step for one public operation.
    ///
    /// Caller holds the instance lock. No policy: no-op. Policy without an
    /// interval: eviction pass on every call. Policy with an interval: the
    /// pass runs when the deadline is unset or has elapsed, then the
    /// deadline advances to `now + interval`.
    fn maintain(&self, inner: &mut Inner<V>) -> Result<()> {
        let Some(policy) = &self.policy else {
            return Ok(());
        };

        match policy.interval() {
            None => {
                let evicted = Self::remove_matching(&mut inner.records, policy.outdated())?;
                if !evicted.is_empty() {
                    debug!(evicted = evicted.len(), "maintenance evicted records");
                }
            }
            Some(interval) => {
                let now = Instant::now();
                let due = inner.deadline.map_or(true, |deadline| now >= deadline);
                if due {
                    let evicted = Self::remove_matching(&mut inner.records, policy.outdated())?;
                    if !evicted.is_empty() {
                        debug!(evicted = evicted.len(), "maintenance evicted records");
                    }
                    inner.deadline = Some(now + interval);
                }
            }
        }
        Ok(())
    }

    /// Remove and return all records matching `predicate`, preserving order
    /// on both sides of the partition.
    ///
    /// Evaluates the predicate over the entire sequence before moving
    /// anything: a predicate failure leaves `records` unmodified.
    fn remove_matching(records: &mut Vec<V>, predicate: &dyn Predicate<V>) -> Result<Vec<V>> {
        let mut matched = Vec::with_capacity(records.len());
        for record in records.iter() {
            matched.push(predicate.eval(record)?);
        }

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(records.len());
        for (record, hit) in records.drain(..).zip(matched) {
            if hit {
                removed.push(record);
            } else {
                kept.push(record);
            }
        }
        *records = kept;
        Ok(removed)
    }

    /// Append records to the end of the sequence, preserving call order.
    pub fn add(&self, records: impl IntoIterator<Item = V>) -> Result<()> {
        let mut inner = self.inner.lock();
        self.maintain(&mut inner)?;
        inner.records.extend(records);
        Ok(())
    }

    /// Atomically remove and return all records matching `predicate`,
    /// in insertion order, leaving the rest untouched.
    pub fn exclude(&self, predicate: impl Predicate<V>) -> Result<Vec<V>> {
        let mut inner = self.inner.lock();
        self.maintain(&mut inner)?;
        Self::remove_matching(&mut inner.records, &predicate)
    }

    /// Atomically empty the store and return everything that was present.
    pub fn drain(&self) -> Result<Vec<V>> {
        let mut inner = self.inner.lock();
        self.maintain(&mut inner)?;
        Ok(std::mem::take(&mut inner.records))
    }

    /// Number of records currently stored.
    pub fn len(&self) -> Result<usize> {
        let mut inner = self.inner.lock();
        self.maintain(&mut inner)?;
        Ok(inner.records.len())
    }

    /// True when the store holds no records.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<V: Clone> VolatileStore<V> {
    /// Snapshot copy of the full sequence, in insertion order.
    pub fn records(&self) -> Result<Vec<V>> {
        let mut inner = self.inner.lock();
        self.maintain(&mut inner)?;
        Ok(inner.records.clone())
    }

    /// Subsequence of records for which `predicate` holds, order preserved.
    /// Read-only: the store is unchanged apart from the maintenance step.
    pub fn filter(&self, predicate: impl Predicate<V>) -> Result<Vec<V>> {
        let mut inner = self.inner.lock();
        self.maintain(&mut inner)?;

        let mut selected = Vec::new();
        for record in &inner.records {
            if predicate.eval(record)? {
                selected.push(record.clone());
            }
        }
        Ok(selected)
    }

    /// Lazy, restartable iteration over a snapshot of the current records.
    ///
    /// The snapshot is taken at call time and does not observe later
    /// mutations.
    pub fn iter(&self) -> Result<SnapshotIter<V>> {
        Ok(SnapshotIter {
            snapshot: self.records()?,
            pos: 0,
        })
    }
}

impl<V> Default for VolatileStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for VolatileStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolatileStore")
            .field("len", &self.inner.lock().records.len())
            .field("policy", &self.policy.as_ref().map(|p| p.interval()))
            .finish()
    }
}

/// Iterator over a point-in-time snapshot of a [`VolatileStore`].
///
/// Cloning yields a fresh pass over the same snapshot; [`SnapshotIter::restart`]
/// rewinds in place.
#[derive(Clone)]
pub struct SnapshotIter<V> {
    snapshot: Vec<V>,
    pos: usize,
}

impl<V> SnapshotIter<V> {
    /// Rewind to the beginning of the snapshot.
    pub fn restart(&mut self) {
        self.pos = 0;
    }
}

impl<V: Clone> Iterator for SnapshotIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        let item = self.snapshot.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.snapshot.len() - self.pos;
        (rest, Some(rest))
    }
}
