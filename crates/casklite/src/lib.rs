//! # casklite
//!
//! A lightweight embedded key-value store on the log-structured
//! (Bitcask) design: writes append to segment files, reads resolve
//! through an in-memory key → offset index, and compaction reclaims
//! the space dead records leave behind.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use casklite::Store;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open("./my_store")?;
//!
//!     store.set("user:1:name", "Alice")?;
//!     store.set("user:1:email", "alice@example.com")?;
//!
//!     println!("Name: {}", store.get("user:1:name")?);
//!
//!     // Reclaim space held by overwritten values
//!     store.compact()?;
//!     Ok(())
//! }
//! ```
//!
//! Data survives restarts: reopening a directory recovers every
//! segment and rebuilds the index by replaying them.
//!
//! ## What casklite is not
//!
//! No network surface, no transactions, no range scans, no deletion.
//! Keys and values are flat strings and must not contain the `,` field
//! delimiter or newlines; such writes are rejected up front.

use std::path::Path;
use std::sync::Arc;

pub mod logging;

// Re-export core types
pub use casklite_core::{Error, Result};

// Storage engine components
pub use casklite_storage::{
    CompactionStats, StorageConfig, StorageEngine, StorageStats, DEFAULT_MAX_SEGMENT_SIZE,
};

/// Current version of casklite
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The main store handle.
///
/// Thread-safe and clone-able: clones share the same underlying
/// engine, so a `Store` can be handed to multiple threads directly.
///
/// # Examples
///
/// ```rust,no_run
/// use casklite::Store;
///
/// let store = Store::open("./my_data")?;
/// store.set("key", "value")?;
///
/// // Data persists across restarts
/// drop(store);
/// let store = Store::open("./my_data")?;
/// assert_eq!(store.get("key")?, "value");
/// # Ok::<(), casklite::Error>(())
/// ```
#[derive(Clone)]
pub struct Store {
    engine: Arc<StorageEngine>,
}

impl Store {
    /// Opens a store at the specified directory, creating it if
    /// needed, with the default 1 MiB segment size threshold.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let engine = StorageEngine::open(path)?;
        Ok(Store {
            engine: Arc::new(engine),
        })
    }

    /// Opens a store with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where segment files are stored
    /// * `config` - Storage configuration options
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: StorageConfig) -> Result<Self> {
        let engine = StorageEngine::open_with_config(path, config)?;
        Ok(Store {
            engine: Arc::new(engine),
        })
    }

    /// Inserts or updates a key-value pair.
    ///
    /// Fails with [`Error::InvalidEntry`] if the key or value contains
    /// the field delimiter or a newline, and with an I/O error if the
    /// append cannot be completed.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.engine.set(key, value)
    }

    /// Retrieves the most recent value for a key.
    ///
    /// Fails with [`Error::KeyNotFound`] if the key has never been
    /// written.
    pub fn get(&self, key: &str) -> Result<String> {
        self.engine.get(key)
    }

    /// Merges sealed segments, keeping only the latest value per key,
    /// and deletes the replaced files.
    pub fn compact(&self) -> Result<CompactionStats> {
        self.engine.compact()
    }

    /// Number of segment files backing the store.
    pub fn segment_count(&self) -> Result<usize> {
        self.engine.segment_count()
    }

    /// Storage statistics (segment counts, disk usage).
    pub fn stats(&self) -> Result<StorageStats> {
        self.engine.stats()
    }

    /// The directory this store operates on.
    pub fn dir(&self) -> &Path {
        self.engine.dir()
    }
}
