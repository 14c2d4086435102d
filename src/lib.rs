//! litestore - generic, thread-safe record store
//!
//! litestore keeps opaque records behind a small add/filter/exclude API,
//! available in two interchangeable forms:
//!
//! - [`VolatileStore`]: an in-memory, insertion-ordered sequence with lazy,
//!   interval-gated eviction of outdated records
//! - [`DurableStore`]: a single-table SQLite-backed store that evaluates
//!   predicates *inside* the engine's row scan via a registered callback
//!
//! # Quick Start
//!
//! ```
//! use litestore::{DurableStore, MaintenancePolicy, VolatileStore};
//!
//! // Volatile: records older than the policy allows are evicted lazily.
//! let cache = VolatileStore::with_policy(MaintenancePolicy::new(|n: &i64| *n < 0));
//! cache.add([-3, 5, 8]).unwrap();
//! assert_eq!(cache.records().unwrap(), vec![5, 8]);
//!
//! // Durable: same contract, backed by an embedded SQL engine.
//! let store: DurableStore<i64> = DurableStore::in_memory().unwrap();
//! store.add([1, 2, 3]).unwrap();
//! assert_eq!(store.exclude(|n: &i64| *n > 1).unwrap(), vec![2, 3]);
//! ```
//!
//! # Architecture
//!
//! Both backends serialize every operation through one per-instance lock,
//! running "maintain, then act" (volatile) or "bind, query, clear"
//! (durable) as a single atomic unit. The durable backend additionally
//! keeps one engine connection per calling thread; connections never cross
//! thread boundaries.

pub use litestore_core::{
    BincodeCodec, Error, FalliblePredicate, JsonCodec, Predicate, PredicateSet, RecordCodec,
    Result,
};
pub use litestore_durability::{ConnectionRegistry, DurableConfig, DurableStore, StoreLocation};
pub use litestore_storage::{MaintenancePolicy, SnapshotIter, VolatileStore};
