//! Construction surface for the durable store.

use std::path::PathBuf;
use std::time::Duration;

use litestore_core::{Error, Result};

/// Default busy timeout applied to every new connection.
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the backing database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Process-private in-memory database. One database per store instance,
    /// shared by all of that instance's per-thread connections.
    Memory,
    /// Database file on disk, created if absent.
    Path(PathBuf),
}

/// Configuration for a [`DurableStore`](crate::DurableStore).
///
/// Validated when the store opens; an invalid configuration surfaces as
/// [`Error::Configuration`] with no state change.
#[derive(Debug, Clone)]
pub struct DurableConfig {
    /// Storage location (in-memory or a database file).
    pub location: StoreLocation,
    /// Busy timeout applied to every connection.
    pub busy_timeout: Duration,
}

impl DurableConfig {
    /// In-memory store with default settings.
    pub fn memory() -> Self {
        Self {
            location: StoreLocation::Memory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// File-backed store at `path` with default settings.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::Path(path.into()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Override the busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let StoreLocation::Path(path) = &self.location {
            if path.as_os_str().is_empty() {
                return Err(Error::configuration("database path must not be empty"));
            }
            if path.is_dir() {
                return Err(Error::configuration(format!(
                    "database path {} is a directory",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_defaults() {
        let config = DurableConfig::memory();
        assert_eq!(config.location, StoreLocation::Memory);
        assert_eq!(config.busy_timeout, DEFAULT_BUSY_TIMEOUT);
    }

    #[test]
    fn test_busy_timeout_override() {
        let config = DurableConfig::memory().busy_timeout(Duration::from_millis(100));
        assert_eq!(config.busy_timeout, Duration::from_millis(100));
    }

    #[test]
    fn test_empty_path_rejected() {
        let config = DurableConfig::at("");
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_directory_path_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = DurableConfig::at(dir.path());
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_file_path_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let config = DurableConfig::at(dir.path().join("records.db"));
        assert!(config.validate().is_ok());
    }
}
