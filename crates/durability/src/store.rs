//! DurableStore: single-table persistent record store with push-down
//!
//! ## Design Notes
//!
//! - **Table layout**: `records(id INTEGER PRIMARY KEY AUTOINCREMENT,
//!   value BLOB NOT NULL)`. Ids are monotonic, so ascending-id reads return
//!   insertion order. The table is created if absent and never dropped.
//! - **Push-down**: `filter`/`exclude` register a scalar function on the
//!   calling thread's connection, bound to a request-scoped
//!   [`PushdownContext`], and let the engine's row scan call back into the
//!   codec + predicate conjunction. Filtering happens inside the scan, not
//!   after bulk-loading.
//! - **One lock, all threads**: the bind → query → (delete) → unbind
//!   sequence runs under the per-instance operation lock. Connections are
//!   per-thread, but the binding discipline is per-instance: without the
//!   lock one call's predicates could overlap another call's query.
//! - **No partial mutation**: `add` encodes every value before the
//!   transaction opens; `exclude` deletes inside the same transaction that
//!   scanned, committing only a complete result.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use litestore_core::{BincodeCodec, PredicateSet, RecordCodec, Result};

use crate::config::DurableConfig;
use crate::engine_err;
use crate::pushdown::PushdownContext;
use crate::registry::ConnectionRegistry;

/// Name under which the push-down callback is registered per call.
const MATCH_FN: &str = "litestore_match";

/// Persistent record store backed by an embedded SQL engine.
///
/// Values are encoded through the store's codec on every write and decoded
/// on every read. Operations on one instance are linearizable: `add`,
/// `filter` and `exclude` are fully serialized across all threads by the
/// instance lock, while each thread talks to the engine through its own
/// connection.
///
/// # Example
///
/// ```
/// use litestore_durability::DurableStore;
/// use litestore_core::PredicateSet;
///
/// let store: DurableStore<u64> = DurableStore::in_memory().unwrap();
/// store.add([1, 2, 3]).unwrap();
///
/// let ones = store.filter(|n: &u64| *n == 1).unwrap();
/// assert_eq!(ones, vec![1]);
///
/// let everything = store.exclude(PredicateSet::all()).unwrap();
/// assert_eq!(everything, vec![1, 2, 3]);
/// assert!(store.is_empty().unwrap());
/// ```
pub struct DurableStore<V> {
    registry: ConnectionRegistry,
    codec: Arc<dyn RecordCodec<V>>,
    /// Serializes bind → query → (delete) → unbind across all threads.
    op_lock: Mutex<()>,
}

impl<V> DurableStore<V>
where
    V: Serialize + DeserializeOwned + 'static,
{
    /// In-memory store with the default binary codec.
    pub fn in_memory() -> Result<Self> {
        Self::with_config(DurableConfig::memory())
    }

    /// File-backed store at `path` with the default binary codec.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(DurableConfig::at(path))
    }

    /// Store with the default binary codec and an explicit configuration.
    pub fn with_config(config: DurableConfig) -> Result<Self> {
        Self::with_codec(config, BincodeCodec::new())
    }
}

impl<V: 'static> DurableStore<V> {
    /// Store with a caller-supplied codec.
    ///
    /// The codec is fixed for the lifetime of the store; mixing codecs over
    /// one database file surfaces as [`Error::Decoding`](litestore_core::Error::Decoding)
    /// on read.
    pub fn with_codec(config: DurableConfig, codec: impl RecordCodec<V> + 'static) -> Result<Self> {
        Ok(Self {
            registry: ConnectionRegistry::open(config)?,
            codec: Arc::new(codec),
            op_lock: Mutex::new(()),
        })
    }

    /// Encode and insert values in a single transaction, preserving call
    /// order. Empty input is a no-op; an encoding failure aborts before the
    /// transaction opens, leaving the store unchanged.
    pub fn add(&self, values: impl IntoIterator<Item = V>) -> Result<()> {
        let mut rows = Vec::new();
        for value in values {
            rows.push(self.codec.encode(&value)?);
        }
        if rows.is_empty() {
            return Ok(());
        }

        let _guard = self.op_lock.lock();
        self.registry.with_connection(|conn| {
            let tx = conn.transaction().map_err(engine_err)?;
            {
                let mut stmt = tx
                    .prepare_cached("INSERT INTO records (value) VALUES (?1)")
                    .map_err(engine_err)?;
                for row in &rows {
                    stmt.execute(params![row]).map_err(engine_err)?;
                }
            }
            tx.commit().map_err(engine_err)?;
            debug!(inserted = rows.len(), "committed insert batch");
            Ok(())
        })
    }

    /// Records for which **all** supplied predicates hold, in insertion
    /// order. The empty predicate set matches everything.
    pub fn filter(&self, predicates: impl Into<PredicateSet<V>>) -> Result<Vec<V>> {
        let predicates = predicates.into();
        let _guard = self.op_lock.lock();
        self.registry.with_connection(|conn| {
            let ctx = PushdownContext::new(predicates, Arc::clone(&self.codec));
            bind_match_function(conn, &ctx)?;
            let scanned = scan_matching(conn, self.codec.as_ref(), &ctx);
            unbind_match_function(conn);
            Ok(scanned?.into_iter().map(|(_, value)| value).collect())
        })
    }

    /// Snapshot of the full table, in insertion order.
    pub fn records(&self) -> Result<Vec<V>> {
        self.filter(PredicateSet::all())
    }

    /// Compute the same matching set as [`filter`](Self::filter), delete
    /// exactly those rows, and return the removed records.
    ///
    /// The scan and the deletion share one transaction: a decode or
    /// predicate failure rolls back with nothing committed.
    pub fn exclude(&self, predicates: impl Into<PredicateSet<V>>) -> Result<Vec<V>> {
        let predicates = predicates.into();
        let _guard = self.op_lock.lock();
        self.registry.with_connection(|conn| {
            let ctx = PushdownContext::new(predicates, Arc::clone(&self.codec));
            bind_match_function(conn, &ctx)?;
            let outcome = exclude_matching(conn, self.codec.as_ref(), &ctx);
            unbind_match_function(conn);
            outcome
        })
    }

    /// Remove and return everything in the table.
    pub fn drain(&self) -> Result<Vec<V>> {
        self.exclude(PredicateSet::all())
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<u64> {
        let _guard = self.op_lock.lock();
        self.registry.with_connection(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
                .map_err(engine_err)?;
            Ok(count as u64)
        })
    }

    /// True when the table holds no records.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<V> std::fmt::Debug for DurableStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore")
            .field("registry", &self.registry)
            .finish()
    }
}

/// Register the push-down callback for one call, bound to `ctx`.
fn bind_match_function<V: 'static>(
    conn: &Connection,
    ctx: &Arc<PushdownContext<V>>,
) -> Result<()> {
    let bound = Arc::clone(ctx);
    conn.create_scalar_function(MATCH_FN, 1, FunctionFlags::SQLITE_UTF8, move |fctx| {
        let raw = fctx
            .get_raw(0)
            .as_blob()
            .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
        match bound.matches(raw) {
            Ok(hit) => Ok(hit),
            Err(_aborted) => Err(rusqlite::Error::UserFunctionError(
                "push-down evaluation aborted".into(),
            )),
        }
    })
    .map_err(engine_err)
}

/// Unregister the push-down callback after a call.
fn unbind_match_function(conn: &Connection) {
    if let Err(err) = conn.remove_function(MATCH_FN, 1) {
        warn!(%err, "failed to unregister push-down callback");
    }
}

/// Scan the table through the push-down callback, returning matching
/// `(id, record)` pairs in ascending id order.
fn scan_matching<V>(
    conn: &Connection,
    codec: &dyn RecordCodec<V>,
    ctx: &PushdownContext<V>,
) -> Result<Vec<(i64, V)>> {
    let mut stmt = conn
        .prepare_cached("SELECT id, value FROM records WHERE litestore_match(value) ORDER BY id")
        .map_err(engine_err)?;
    let mut rows = stmt.query([]).map_err(|e| ctx.failure_or_engine(e))?;

    let mut matched = Vec::new();
    loop {
        match rows.next() {
            Ok(Some(row)) => {
                let id: i64 = row.get(0).map_err(engine_err)?;
                let raw: Vec<u8> = row.get(1).map_err(engine_err)?;
                matched.push((id, codec.decode(&raw)?));
            }
            Ok(None) => break,
            Err(err) => return Err(ctx.failure_or_engine(err)),
        }
    }
    Ok(matched)
}

/// Scan and delete in one transaction; the deleted rows are exactly the
/// scanned ids, independent of predicate determinism.
fn exclude_matching<V>(
    conn: &mut Connection,
    codec: &dyn RecordCodec<V>,
    ctx: &PushdownContext<V>,
) -> Result<Vec<V>> {
    let tx = conn.transaction().map_err(engine_err)?;
    let matched = scan_matching(&tx, codec, ctx)?;
    if !matched.is_empty() {
        let mut stmt = tx
            .prepare_cached("DELETE FROM records WHERE id = ?1")
            .map_err(engine_err)?;
        for (id, _) in &matched {
            stmt.execute(params![id]).map_err(engine_err)?;
        }
    }
    tx.commit().map_err(engine_err)?;
    debug!(removed = matched.len(), "committed exclude");
    Ok(matched.into_iter().map(|(_, value)| value).collect())
}
