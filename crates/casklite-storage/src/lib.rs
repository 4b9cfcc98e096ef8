//! # casklite storage engine
//!
//! Log-structured (Bitcask-style) storage engine for casklite.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of casklite.**
//!
//! Users should depend on the main `casklite` crate instead, which
//! provides the stable public API. This crate's API may change without
//! notice between minor versions.
//!
//! ---
//!
//! Values are never overwritten in place: every write appends to the
//! active segment file, and point lookups resolve through an in-memory
//! index of key → byte offset instead of scanning the log.
//!
//! ## Architecture
//!
//! ```text
//! Writes → active segment (append)        seg-…0.log  seg-…1.log  …
//!              ↓ rollover at threshold         ↑ sealed, read-only
//! Reads  → index (key → segment, offset) → random read
//! Compaction → merge sealed segments, last write wins per key
//! ```

use casklite_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tracing::info;

pub mod compaction;
pub mod entry;
pub mod index;
pub mod manager;
pub mod segment;

pub use compaction::{Compaction, CompactionStats};
pub use entry::{Entry, FIELD_DELIMITER};
pub use index::Index;
pub use manager::{Append, SegmentManager};
pub use segment::{discover_segments, Segment, SegmentInfo, SEGMENT_PREFIX, SEGMENT_SUFFIX};

/// Default active-segment size threshold (1 MiB)
pub const DEFAULT_MAX_SEGMENT_SIZE: u64 = 1024 * 1024;

/// Storage engine configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Size threshold in bytes at which the active segment is sealed
    /// and a new one is started. A soft bound: one oversized entry is
    /// still accepted into an otherwise empty segment.
    pub max_segment_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_segment_size: DEFAULT_MAX_SEGMENT_SIZE,
        }
    }
}

/// The storage engine: a segment manager plus the index over it.
///
/// ## Concurrency
///
/// One mutex serializes everything that touches the segment set or a
/// file cursor (appends, random reads, rollover, compaction); the
/// index has its own `RwLock`. Every operation takes the manager lock
/// before the index lock, so a thread that saw a pre-compaction index
/// can never reach the file layer mid-swap. All calls are synchronous
/// and blocking; there is no background compaction.
pub struct StorageEngine {
    dir: PathBuf,
    config: StorageConfig,
    manager: Mutex<SegmentManager>,
    index: RwLock<Index>,
}

impl StorageEngine {
    /// Open or create an engine at the given directory with defaults.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, StorageConfig::default())
    }

    /// Open or create an engine with custom configuration.
    ///
    /// Recovers any persisted segments and rebuilds the index by
    /// replaying them; fails rather than starting partially recovered
    /// if the directory cannot be scanned or a segment is unreadable.
    pub fn open_with_config(path: impl AsRef<Path>, config: StorageConfig) -> Result<Self> {
        let dir = path.as_ref().to_path_buf();
        let mut manager = SegmentManager::open(&dir, config.max_segment_size)?;
        let index = Index::rebuild(&mut manager)?;

        info!(
            dir = %dir.display(),
            segments = manager.segment_count(),
            "opened storage engine"
        );

        Ok(Self {
            dir,
            config,
            manager: Mutex::new(manager),
            index: RwLock::new(index),
        })
    }

    /// Retrieve the most recent value for a key.
    ///
    /// Scans the index newest segment first; the first map holding the
    /// key wins. Fails with [`Error::KeyNotFound`] if no segment has
    /// it.
    pub fn get(&self, key: &str) -> Result<String> {
        let mut manager = self.manager.lock().map_err(|_| Error::LockPoisoned)?;

        let located = {
            let index = self.index.read().map_err(|_| Error::LockPoisoned)?;
            index.locate(key)
        };
        let (segment_index, offset) = located.ok_or(Error::KeyNotFound)?;

        let entry = manager.read_at(segment_index, offset)?;
        Ok(entry.value)
    }

    /// Insert or update a key-value pair.
    ///
    /// Appends to the active segment (rolling over at the size
    /// threshold) and records the new offset in the index; when the
    /// append opened a fresh segment, a fresh index slot is started
    /// first.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = Entry::new(key, value)?;

        let mut manager = self.manager.lock().map_err(|_| Error::LockPoisoned)?;
        let outcome = manager.append(&entry)?;

        let mut index = self.index.write().map_err(|_| Error::LockPoisoned)?;
        if outcome.new_segment {
            index.start_segment();
        }
        index.record(entry.key, outcome.offset)
    }

    /// Merge all sealed segments, keeping only the most recent value
    /// per key, then rebuild the index from the new set.
    ///
    /// The replaced segment files are deleted only after the rebuild
    /// succeeds, so a failure partway leaves a directory that still
    /// recovers to the same values.
    pub fn compact(&self) -> Result<CompactionStats> {
        let mut manager = self.manager.lock().map_err(|_| Error::LockPoisoned)?;

        let outcome = manager.compact()?;
        let rebuilt = Index::rebuild(&mut manager)?;
        {
            let mut index = self.index.write().map_err(|_| Error::LockPoisoned)?;
            *index = rebuilt;
        }
        manager.remove_files(&outcome.removed)?;

        Ok(outcome.stats)
    }

    /// Number of segment files in the set.
    pub fn segment_count(&self) -> Result<usize> {
        let manager = self.manager.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(manager.segment_count())
    }

    /// Storage statistics.
    pub fn stats(&self) -> Result<StorageStats> {
        let manager = self.manager.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(StorageStats {
            segment_count: manager.segment_count(),
            sealed_segment_count: manager.sealed_count(),
            total_disk_size: manager.total_size()?,
        })
    }

    /// The storage directory this engine operates on.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Storage statistics
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    /// Total number of segments
    pub segment_count: usize,
    /// Segments no longer receiving writes
    pub sealed_segment_count: usize,
    /// Total disk size of all segment files
    pub total_disk_size: u64,
}
