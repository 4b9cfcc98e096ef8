//! Demonstrates segment rollover and compaction.
//!
//! Run with: cargo run -p casklite --example compaction_demo

use casklite::logging::LogConfig;
use casklite::{Store, StorageConfig};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compaction progress shows up at info level
    let _guard = LogConfig::info().init();

    let store_path = "./demo_compaction";

    println!("=== casklite Compaction Demo ===\n");

    if Path::new(store_path).exists() {
        std::fs::remove_dir_all(store_path)?;
    }

    // A tiny threshold so rollover happens quickly
    let config = StorageConfig {
        max_segment_size: 64,
    };
    let store = Store::open_with_config(store_path, config)?;

    // Overwrite the same three keys many times. Every stale version
    // still occupies disk space until compaction runs.
    println!("📝 Writing 3 keys x 50 rounds...");
    for round in 0..50 {
        for key in ["alpha", "beta", "gamma"] {
            store.set(key, &format!("round-{round}"))?;
        }
    }

    let before = store.stats()?;
    println!(
        "   Before: {} segments ({} sealed), {} bytes on disk",
        before.segment_count, before.sealed_segment_count, before.total_disk_size
    );

    println!("\n🗜️  Compacting...");
    let stats = store.compact()?;
    println!(
        "   Merged {} segments into {}, kept {} of {} entries",
        stats.segments_merged, stats.segments_written, stats.entries_retained, stats.entries_scanned
    );

    let after = store.stats()?;
    println!(
        "   After: {} segments ({} sealed), {} bytes on disk",
        after.segment_count, after.sealed_segment_count, after.total_disk_size
    );

    // Values are unchanged
    for key in ["alpha", "beta", "gamma"] {
        assert_eq!(store.get(key)?, "round-49");
    }
    println!("\n   ✅ Latest values intact after compaction");

    std::fs::remove_dir_all(store_path)?;
    println!("\n=== Demo Complete! ===");

    Ok(())
}
