// Common test utilities for storage integration tests

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture that provides a temporary storage directory
pub struct StorageFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub data_dir: PathBuf,
}

impl StorageFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("data");
        fs::create_dir_all(&data_dir).expect("Failed to create data directory");

        Self { temp_dir, data_dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Segment file names currently in the data directory, sorted.
    #[allow(dead_code)]
    pub fn list_segments(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.data_dir)
            .expect("Failed to read data directory")
            .filter_map(|entry| {
                entry
                    .ok()
                    .and_then(|e| e.file_name().to_str().map(String::from))
            })
            .filter(|name| name.starts_with("seg-") && name.ends_with(".log"))
            .collect();
        names.sort();
        names
    }
}

impl Default for StorageFixture {
    fn default() -> Self {
        Self::new()
    }
}
