//! Volatile storage backend for litestore
//!
//! This crate implements the in-memory record store:
//! - VolatileStore: insertion-ordered sequence guarded by one mutex per instance
//! - MaintenancePolicy: lazy, interval-gated eviction of outdated records
//! - SnapshotIter: restartable iteration over a point-in-time snapshot
//!
//! Every public operation runs "maintain, then act" as a single atomic unit
//! under the instance lock, so readers never observe records mid-eviction.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod policy;
pub mod volatile;

pub use policy::MaintenancePolicy;
pub use volatile::{SnapshotIter, VolatileStore};
