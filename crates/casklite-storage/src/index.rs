// In-memory index - per-segment key to byte-offset maps
//
// The maps sit positionally parallel to the segment set: maps[i]
// describes segments[i]. Within one map a key points at the offset of
// its most recent record in that segment. Lookups scan newest to
// oldest, which is what gives the engine last-write-wins resolution
// without touching the log.

use casklite_core::{Error, Result};
use std::collections::HashMap;

use crate::manager::SegmentManager;

/// Ordered sequence of per-segment `key -> offset` maps.
#[derive(Debug, Default)]
pub struct Index {
    maps: Vec<HashMap<String, u64>>,
}

impl Index {
    pub fn new() -> Self {
        Self { maps: Vec::new() }
    }

    /// Rebuild the index from data at rest by replaying every segment
    /// in creation order.
    ///
    /// Read-only with respect to segment contents and safe to re-run;
    /// this is the only way to construct an index from disk, used both
    /// on engine open and after compaction.
    pub fn rebuild(manager: &mut SegmentManager) -> Result<Self> {
        let mut maps = Vec::with_capacity(manager.segment_count());

        for segment_index in 0..manager.segment_count() {
            let mut map = HashMap::new();
            for (entry, offset) in manager.replay(segment_index)? {
                // Later records overwrite earlier offsets for the key.
                map.insert(entry.key, offset);
            }
            maps.push(map);
        }

        Ok(Self { maps })
    }

    /// Find the newest segment holding `key`, scanning from the most
    /// recently created segment backwards.
    pub fn locate(&self, key: &str) -> Option<(usize, u64)> {
        for (segment_index, map) in self.maps.iter().enumerate().rev() {
            if let Some(&offset) = map.get(key) {
                return Some((segment_index, offset));
            }
        }
        None
    }

    /// Start an empty map for a freshly created segment.
    pub fn start_segment(&mut self) {
        self.maps.push(HashMap::new());
    }

    /// Record a write into the active (last) segment's map.
    pub fn record(&mut self, key: String, offset: u64) -> Result<()> {
        let map = self
            .maps
            .last_mut()
            .ok_or_else(|| Error::Storage("Index has no segment slot".to_string()))?;
        map.insert(key, offset);
        Ok(())
    }

    /// Number of per-segment maps; equals the segment count whenever
    /// the engine is quiescent.
    pub fn segment_count(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
