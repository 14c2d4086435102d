//! Connection affinity: one engine connection per (store, thread).
//!
//! SQLite connection handles must not be shared across threads, so the
//! registry caches one connection per calling thread in thread-local
//! storage, keyed by a process-unique store id. A connection is created
//! lazily on a thread's first operation and lives for the thread's
//! lifetime; it never crosses a thread boundary.
//!
//! Every new connection applies the configured busy timeout and runs the
//! idempotent table creation, so any thread's first touch of any store
//! finds the table present.
//!
//! In-memory stores open a uniquely named shared-cache database
//! (`file:<name>?mode=memory&cache=shared`) so all per-thread connections
//! observe the same data; the registry pins one anchor connection to keep
//! that database alive while the store exists.
//!
//! Known limitation: idle connections are not evicted. A thread that
//! touched a store keeps its connection until the thread exits; dropping
//! the registry reclaims only the dropping thread's entry.

use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use litestore_core::Result;

use crate::config::{DurableConfig, StoreLocation};
use crate::engine_err;

/// Idempotent layout for the single backing table.
const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value BLOB NOT NULL
)";

thread_local! {
    /// This thread's connections, one per live store id.
    static CONNECTIONS: RefCell<HashMap<u64, Connection>> = RefCell::new(HashMap::new());
}

/// Process-wide store id allocator; ids are never reused, so a stale
/// thread-local entry can never be mistaken for a newer store's connection.
static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// What a connection actually opens.
#[derive(Debug)]
enum Target {
    /// Named shared-cache in-memory database.
    SharedMemory(String),
    /// Database file on disk.
    File(PathBuf),
}

/// Lazily creates and caches one connection per calling thread.
pub struct ConnectionRegistry {
    store_id: u64,
    busy_timeout: Duration,
    target: Target,
    /// Keeps an in-memory database alive across per-thread connections.
    /// Held, never used for queries.
    _anchor: Option<Mutex<Connection>>,
}

impl ConnectionRegistry {
    /// Validate the configuration and open the registry.
    ///
    /// The first connection is created eagerly on the calling thread: it
    /// surfaces bad locations immediately and guarantees the table exists.
    pub fn open(config: DurableConfig) -> Result<Self> {
        config.validate()?;

        let store_id = NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed);
        let target = match config.location {
            StoreLocation::Memory => {
                Target::SharedMemory(format!("litestore-{}-{}", std::process::id(), store_id))
            }
            StoreLocation::Path(path) => Target::File(path),
        };

        let mut registry = Self {
            store_id,
            busy_timeout: config.busy_timeout,
            target,
            _anchor: None,
        };

        let probe = registry.connect()?;
        if matches!(registry.target, Target::SharedMemory(_)) {
            registry._anchor = Some(Mutex::new(probe));
        }
        Ok(registry)
    }

    /// Run `op` with this thread's connection, creating it on first use.
    pub fn with_connection<T>(&self, op: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        CONNECTIONS.with(|cell| {
            let mut connections = cell.borrow_mut();
            let conn = match connections.entry(self.store_id) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    debug!(
                        store_id = self.store_id,
                        thread = ?thread::current().id(),
                        "opening engine connection"
                    );
                    entry.insert(self.connect()?)
                }
            };
            op(conn)
        })
    }

    fn connect(&self) -> Result<Connection> {
        let conn = match &self.target {
            Target::SharedMemory(name) => Connection::open_with_flags(
                format!("file:{name}?mode=memory&cache=shared"),
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    | OpenFlags::SQLITE_OPEN_SHARED_CACHE,
            )
            .map_err(engine_err)?,
            Target::File(path) => Connection::open(path).map_err(engine_err)?,
        };

        conn.busy_timeout(self.busy_timeout).map_err(engine_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(engine_err)?;
        Ok(conn)
    }
}

impl Drop for ConnectionRegistry {
    fn drop(&mut self) {
        // Reclaim this thread's cached connection; other threads keep theirs
        // until thread exit (see module docs). `try_with` because thread
        // teardown may already have destroyed the map.
        let _ = CONNECTIONS.try_with(|cell| {
            if let Ok(mut connections) = cell.try_borrow_mut() {
                connections.remove(&self.store_id);
            }
        });
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("store_id", &self.store_id)
            .field("target", &self.target)
            .finish()
    }
}
