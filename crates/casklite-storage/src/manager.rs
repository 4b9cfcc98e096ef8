// Segment manager - owns the segment set for one storage directory
//
// All segment-spanning operations live here: recovery of the set on
// startup, rollover when the active segment fills up, random-offset
// reads, sequential replay, and compaction. Callers serialize access
// through the engine's lock; a seek-then-read pair on a shared handle
// is not atomic on its own.

use casklite_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::compaction::{write_merged, Compaction, CompactionStats};
use crate::entry::Entry;
use crate::segment::{discover_segments, id_major, rollover_id, Segment};

/// Result of appending an entry through the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Append {
    /// Byte offset where the record begins in the active segment
    pub offset: u64,
    /// Whether the append rolled over into a freshly created segment,
    /// in which case the caller must start a new index slot
    pub new_segment: bool,
}

/// Owns the ordered segment set for one storage directory.
pub struct SegmentManager {
    dir: PathBuf,
    max_segment_size: u64,
    /// Segments in creation order; the last one is active
    segments: Vec<Segment>,
    /// Rollover number for the next fresh segment
    next_major: u32,
}

impl SegmentManager {
    /// Open a storage directory, recovering any persisted segments.
    ///
    /// Discovered files are sorted by segment id before the set is
    /// rebuilt; recovery is all-or-nothing, so a directory that cannot
    /// be created or scanned fails construction.
    pub fn open(dir: impl AsRef<Path>, max_segment_size: u64) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("Failed to create storage directory: {}", e)))?;

        let infos = discover_segments(&dir)?;
        let segments: Vec<Segment> = infos.iter().map(Segment::from_info).collect();
        let next_major = segments
            .last()
            .map(|s| id_major(s.id()) + 1)
            .unwrap_or(0);

        debug!(
            dir = %dir.display(),
            segments = segments.len(),
            "recovered segment set"
        );

        Ok(Self {
            dir,
            max_segment_size,
            segments,
            next_major,
        })
    }

    /// Append an entry to the active segment, rolling over first when
    /// there is no active segment or the active one has reached the
    /// size threshold.
    ///
    /// The threshold is a soft bound: the check happens before the
    /// append, so a single oversized entry still lands in an otherwise
    /// empty segment.
    pub fn append(&mut self, entry: &Entry) -> Result<Append> {
        let needs_rollover = match self.segments.last_mut() {
            None => true,
            Some(active) => {
                active.open()?;
                active.position()? >= self.max_segment_size
            }
        };

        if needs_rollover {
            self.rollover()?;
        }

        let active = self
            .segments
            .last_mut()
            .ok_or_else(|| Error::Storage("No active segment after rollover".to_string()))?;
        let offset = active.append(entry)?;

        Ok(Append {
            offset,
            new_segment: needs_rollover,
        })
    }

    /// Seal the current active segment and start a new one.
    fn rollover(&mut self) -> Result<()> {
        if let Some(active) = self.segments.last_mut() {
            active.close()?;
        }

        let id = rollover_id(self.next_major);
        let segment = Segment::create(&self.dir, id)?;
        debug!(segment = %segment.path().display(), "rolled over to new segment");

        self.next_major += 1;
        self.segments.push(segment);

        Ok(())
    }

    /// Read the entry at `offset` within segment `segment_index`.
    ///
    /// A closed segment is opened for the read and closed again
    /// afterwards, so a directory with many sealed segments does not
    /// accumulate open handles.
    pub fn read_at(&mut self, segment_index: usize, offset: u64) -> Result<Entry> {
        let segment = self.segments.get_mut(segment_index).ok_or_else(|| {
            Error::Storage(format!("Segment index {} out of range", segment_index))
        })?;

        let was_open = segment.is_open();
        segment.open()?;
        let outcome = segment.read(offset);
        if !was_open {
            segment.close()?;
        }

        match outcome? {
            Some((entry, _)) => Ok(entry),
            None => Err(Error::Storage(format!(
                "Offset {} is past the end of segment {}",
                offset, segment_index
            ))),
        }
    }

    /// Replay segment `segment_index` from offset 0, returning every
    /// record with the offset it starts at.
    ///
    /// Read-only and re-runnable; restores the segment's prior
    /// open/closed state like `read_at`.
    pub fn replay(&mut self, segment_index: usize) -> Result<Vec<(Entry, u64)>> {
        let segment = self.segments.get_mut(segment_index).ok_or_else(|| {
            Error::Storage(format!("Segment index {} out of range", segment_index))
        })?;

        let was_open = segment.is_open();
        segment.open()?;

        let mut records = Vec::new();
        let mut offset = 0;
        let outcome = loop {
            match segment.read(offset) {
                Ok(Some((entry, next))) => {
                    records.push((entry, offset));
                    offset = next;
                }
                Ok(None) => break Ok(records),
                Err(e) => break Err(e),
            }
        };

        if !was_open {
            segment.close()?;
        }

        outcome
    }

    /// Merge all sealed segments into a compacted set, keeping only
    /// the most recent value per key. The active segment is left
    /// untouched and is not part of the merge input.
    ///
    /// On return the in-memory set has been swapped to
    /// `[compacted..., active]`, but the replaced files still exist on
    /// disk: the caller must rebuild its index from the new set and
    /// only then delete them via [`remove_files`](Self::remove_files).
    /// Until that rebuild, any index built from the old set is stale.
    pub fn compact(&mut self) -> Result<Compaction> {
        let sealed = self.segments.len().saturating_sub(1);
        if sealed == 0 {
            return Ok(Compaction::default());
        }

        // Replay sealed segments in creation order; later segments
        // shadow earlier ones, matching lookup precedence.
        let mut merged: BTreeMap<String, String> = BTreeMap::new();
        let mut scanned = 0;
        for segment_index in 0..sealed {
            for (entry, _) in self.replay(segment_index)? {
                merged.insert(entry.key, entry.value);
                scanned += 1;
            }
        }

        let base_id = self.segments[sealed - 1].id();
        let ceiling_id = self.segments[sealed].id();
        let outputs = write_merged(
            &self.dir,
            &merged,
            self.max_segment_size,
            base_id,
            ceiling_id,
        )?;

        let stats = CompactionStats {
            segments_merged: sealed,
            segments_written: outputs.len(),
            entries_scanned: scanned,
            entries_retained: merged.len(),
        };

        // Swap: replace the sealed prefix with the compacted outputs,
        // keeping the active segment as the last element.
        let old: Vec<Segment> = self.segments.drain(..sealed).collect();
        let mut removed = Vec::with_capacity(old.len());
        for mut segment in old {
            segment.close()?;
            removed.push(segment.path().to_path_buf());
        }

        let mut swapped = outputs;
        swapped.append(&mut self.segments);
        self.segments = swapped;

        info!(
            merged = stats.segments_merged,
            written = stats.segments_written,
            retained = stats.entries_retained,
            "compacted sealed segments"
        );

        Ok(Compaction { removed, stats })
    }

    /// Delete replaced segment files from storage.
    pub fn remove_files(&self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            std::fs::remove_file(path)
                .map_err(|e| Error::Storage(format!("Failed to delete {:?}: {}", path, e)))?;
        }
        Ok(())
    }

    /// Number of segments in the set.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of sealed (non-active) segments.
    pub fn sealed_count(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    /// Total on-disk size of all segment files.
    pub fn total_size(&self) -> Result<u64> {
        let mut total = 0;
        for segment in &self.segments {
            total += std::fs::metadata(segment.path())?.len();
        }
        Ok(total)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_segment_size(&self) -> u64 {
        self.max_segment_size
    }
}
