// Segment files - one append-only log file per segment
//
// Segments are named: seg-{id:016x}.log
// The 64-bit id packs a rollover number in the high 32 bits and a
// compaction revision in the low 32 bits, so sorting by id is sorting
// by logical creation order. Rollover segments always have revision 0;
// compaction fills revisions above the highest segment it replaced.

use casklite_core::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::entry::Entry;

/// Filename prefix for segment files.
pub const SEGMENT_PREFIX: &str = "seg-";

/// Filename suffix for segment files. Together with the prefix this is
/// the sole criterion used to discover segments; any other file in the
/// directory is ignored.
pub const SEGMENT_SUFFIX: &str = ".log";

/// Segment id for the `major`-th rollover (revision 0).
pub(crate) fn rollover_id(major: u32) -> u64 {
    (major as u64) << 32
}

/// Rollover number of a segment id.
pub(crate) fn id_major(id: u64) -> u32 {
    (id >> 32) as u32
}

/// Filename for a segment id.
pub fn segment_file_name(id: u64) -> String {
    format!("{}{:016x}{}", SEGMENT_PREFIX, id, SEGMENT_SUFFIX)
}

/// Parse a segment id from a path, or `None` if the file does not
/// follow the segment naming convention.
pub fn parse_segment_id(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    let id_str = name
        .strip_prefix(SEGMENT_PREFIX)?
        .strip_suffix(SEGMENT_SUFFIX)?;
    u64::from_str_radix(id_str, 16).ok()
}

/// Information about a segment file found on disk.
#[derive(Debug, Clone)]
pub struct SegmentInfo {
    /// Path to the segment file
    pub path: PathBuf,
    /// Id extracted from the filename
    pub id: u64,
    /// File size in bytes
    pub size: u64,
}

/// Discover all segment files in a directory, sorted by id.
///
/// Directory listing order is not creation order; the sort is what
/// keeps last-write-wins resolution correct across a restart.
pub fn discover_segments(dir: &Path) -> Result<Vec<SegmentInfo>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::Storage(format!("Failed to read segment directory: {}", e)))?;

    // Recovery is all-or-nothing: a file that matches the naming
    // convention but cannot be stat'ed fails the scan rather than
    // silently shrinking the recovered set.
    let mut segments: Vec<SegmentInfo> = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| Error::Storage(format!("Failed to read segment directory: {}", e)))?;
        let path = entry.path();
        let Some(id) = parse_segment_id(&path) else {
            continue;
        };
        let size = std::fs::metadata(&path)
            .map_err(|e| Error::Storage(format!("Failed to stat segment {:?}: {}", path, e)))?
            .len();
        segments.push(SegmentInfo { path, id, size });
    }

    segments.sort_by_key(|s| s.id);

    Ok(segments)
}

/// One append-only segment file.
///
/// A segment holds its file handle only while open; the handle is
/// created on demand and can be released and reacquired any number of
/// times without affecting the data.
#[derive(Debug)]
pub struct Segment {
    id: u64,
    path: PathBuf,
    file: Option<File>,
    write_pos: u64,
}

impl Segment {
    /// Create a fresh segment in `dir` and open it for appending.
    pub fn create(dir: &Path, id: u64) -> Result<Self> {
        let mut segment = Self {
            id,
            path: dir.join(segment_file_name(id)),
            file: None,
            write_pos: 0,
        };
        segment.open()?;
        Ok(segment)
    }

    /// Wrap an existing on-disk segment, leaving it closed.
    pub fn from_info(info: &SegmentInfo) -> Self {
        Self {
            id: info.id,
            path: info.path.clone(),
            file: None,
            write_pos: info.size,
        }
    }

    /// Acquire the file handle. No-op if already open.
    pub fn open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| {
                Error::Storage(format!("Failed to open segment {:?}: {}", self.path, e))
            })?;
        self.write_pos = file.metadata()?.len();
        self.file = Some(file);

        Ok(())
    }

    /// Release the file handle, syncing first. No-op if already closed.
    pub fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Append one record at end-of-file and return the byte offset
    /// where it begins.
    pub fn append(&mut self, entry: &Entry) -> Result<u64> {
        let line = entry.encode();
        let file = self.file.as_mut().ok_or_else(|| {
            Error::Storage(format!("Segment {:?} is not open for append", self.path))
        })?;

        let offset = self.write_pos;
        file.write_all(line.as_bytes())?;
        self.write_pos += line.len() as u64;

        Ok(offset)
    }

    /// Read the record starting at `offset`.
    ///
    /// Returns `Ok(None)` when no record starts at or after `offset`
    /// (end of segment) - a normal outcome used by replay to stop. A
    /// readable but unparseable record is `Err(MalformedRecord)`. On
    /// success also returns the offset just past the record.
    pub fn read(&mut self, offset: u64) -> Result<Option<(Entry, u64)>> {
        let file = self.file.as_mut().ok_or_else(|| {
            Error::Storage(format!("Segment {:?} is not open for read", self.path))
        })?;

        if offset >= self.write_pos {
            return Ok(None);
        }

        file.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(&*file);
        let mut line = String::new();
        let consumed = reader.read_line(&mut line)?;
        if consumed == 0 {
            return Ok(None);
        }

        let entry = Entry::decode(&line)?;
        Ok(Some((entry, offset + consumed as u64)))
    }

    /// Current write cursor (the append-relative size of the segment).
    pub fn position(&self) -> Result<u64> {
        if self.file.is_none() {
            return Err(Error::Storage(format!(
                "Segment {:?} is not open",
                self.path
            )));
        }
        Ok(self.write_pos)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Segment {
    fn drop(&mut self) {
        // Best effort sync on drop
        let _ = self.close();
    }
}
