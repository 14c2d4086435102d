//! Durable storage backend for litestore
//!
//! This crate implements the SQLite-backed record store:
//! - DurableStore: single-table persistent store with predicate push-down
//! - ConnectionRegistry: one engine connection per (store, thread)
//! - DurableConfig / StoreLocation: construction surface
//!
//! Predicates are evaluated *inside* the engine's row scan: each
//! `filter`/`exclude` call registers a scalar function on the calling
//! thread's connection, bound to a request-scoped context, and the query
//! asks the engine to keep only rows for which that function returns true.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
mod pushdown;
pub mod registry;
pub mod store;

pub use config::{DurableConfig, StoreLocation};
pub use registry::ConnectionRegistry;
pub use store::DurableStore;

use litestore_core::Error;

/// Map an engine failure into the store error taxonomy.
pub(crate) fn engine_err(err: rusqlite::Error) -> Error {
    Error::engine(err)
}
