// Compaction - merging sealed segments into fewer, denser ones
//
// The merge keeps only the most recent value per key across the sealed
// segments, then rewrites the survivors into fresh segments. The active
// segment never takes part. Output ids continue from the highest merged
// id, so on disk the outputs sort after everything they replace and
// before the active segment; a crash that leaves both file sets behind
// still recovers to the same values.

use casklite_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::entry::Entry;
use crate::segment::Segment;

/// Statistics from one compaction run.
#[derive(Debug, Clone, Default)]
pub struct CompactionStats {
    /// Sealed segments merged away
    pub segments_merged: usize,
    /// Compacted segments written
    pub segments_written: usize,
    /// Records read from the merged segments
    pub entries_scanned: usize,
    /// Records surviving the merge (one per live key)
    pub entries_retained: usize,
}

/// Outcome of a compaction: the statistics plus the sealed segment
/// files that were replaced. The files still exist on disk; the caller
/// deletes them once the index has been rebuilt from the new set.
#[derive(Debug, Default)]
pub struct Compaction {
    pub removed: Vec<PathBuf>,
    pub stats: CompactionStats,
}

/// Write merged key-value pairs into fresh segments, rolling to a new
/// one whenever the current output reaches `max_segment_size`.
///
/// Output ids are `base_id + 1, base_id + 2, ...` and must stay below
/// `ceiling_id` (the active segment) to preserve creation order on
/// recovery. Pairs are written in key order, which keeps the output
/// deterministic. The returned segments are closed and synced.
pub(crate) fn write_merged(
    dir: &Path,
    merged: &BTreeMap<String, String>,
    max_segment_size: u64,
    base_id: u64,
    ceiling_id: u64,
) -> Result<Vec<Segment>> {
    let mut outputs: Vec<Segment> = Vec::new();
    let mut current: Option<Segment> = None;

    for (key, value) in merged {
        let needs_new = match &current {
            None => true,
            Some(segment) => segment.position()? >= max_segment_size,
        };

        if needs_new {
            if let Some(mut finished) = current.take() {
                finished.close()?;
                outputs.push(finished);
            }

            let id = base_id + 1 + outputs.len() as u64;
            if id >= ceiling_id {
                return Err(Error::Storage(
                    "Compaction id space exhausted below active segment".to_string(),
                ));
            }
            current = Some(Segment::create(dir, id)?);
        }

        let entry = Entry::from_parts(key.clone(), value.clone());
        current
            .as_mut()
            .ok_or_else(|| Error::Storage("No open compaction output".to_string()))?
            .append(&entry)?;
    }

    if let Some(mut finished) = current.take() {
        finished.close()?;
        outputs.push(finished);
    }

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{discover_segments, rollover_id};
    use tempfile::TempDir;

    fn merged_fixture(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_write_merged_splits_at_threshold() {
        let dir = TempDir::new().unwrap();
        let merged = merged_fixture(&[("10", "write2"), ("12", "write1"), ("42", "write1")]);

        // Each record is 10 bytes; a 20-byte threshold fits two per
        // segment.
        let outputs =
            write_merged(dir.path(), &merged, 20, rollover_id(1), rollover_id(2)).unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].id(), rollover_id(1) + 1);
        assert_eq!(outputs[1].id(), rollover_id(1) + 2);
        assert!(outputs.iter().all(|s| !s.is_open()));
    }

    #[test]
    fn test_write_merged_outputs_sort_between_base_and_ceiling() {
        let dir = TempDir::new().unwrap();
        let merged = merged_fixture(&[("a", "1"), ("b", "2")]);

        let base = rollover_id(4);
        let outputs = write_merged(dir.path(), &merged, 1, base, rollover_id(5)).unwrap();
        assert_eq!(outputs.len(), 2);
        for segment in &outputs {
            assert!(segment.id() > base);
            assert!(segment.id() < rollover_id(5));
        }

        let found = discover_segments(dir.path()).unwrap();
        let ids: Vec<u64> = found.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![base + 1, base + 2]);
    }

    #[test]
    fn test_write_merged_empty_input_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let outputs = write_merged(
            dir.path(),
            &BTreeMap::new(),
            1024,
            rollover_id(0),
            rollover_id(1),
        )
        .unwrap();
        assert!(outputs.is_empty());
        assert!(discover_segments(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_write_merged_rejects_id_overflow() {
        let dir = TempDir::new().unwrap();
        let merged = merged_fixture(&[("a", "1"), ("b", "2")]);

        // Ceiling directly above base leaves no room for any output.
        let err = write_merged(dir.path(), &merged, 1024, 10, 11);
        assert!(err.is_err());
    }
}
