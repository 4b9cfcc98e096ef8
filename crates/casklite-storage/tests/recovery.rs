// Integration tests for startup recovery: segment discovery, ordering,
// and the all-or-nothing contract.

mod common;

use casklite_storage::{StorageConfig, StorageEngine};
use common::StorageFixture;

fn small_config(max_segment_size: u64) -> StorageConfig {
    StorageConfig { max_segment_size }
}

#[test]
fn test_restart_preserves_all_values() {
    let fixture = StorageFixture::new();

    // Force several segments, with repeated keys across them.
    {
        let engine =
            StorageEngine::open_with_config(fixture.dir(), small_config(16)).unwrap();
        for i in 0..10 {
            engine.set(&format!("key{}", i), &format!("value{}", i)).unwrap();
        }
        engine.set("key3", "updated3").unwrap();
        engine.set("key7", "updated7").unwrap();
        assert!(engine.segment_count().unwrap() >= 2);
        // Dropped without any explicit close - data must be on disk.
    }

    let engine = StorageEngine::open_with_config(fixture.dir(), small_config(16)).unwrap();
    for i in 0..10 {
        let expected = match i {
            3 => "updated3".to_string(),
            7 => "updated7".to_string(),
            n => format!("value{}", n),
        };
        assert_eq!(engine.get(&format!("key{}", i)).unwrap(), expected);
    }
}

#[test]
fn test_recovery_sorts_segments_by_id() {
    let fixture = StorageFixture::new();

    // Write the same key into two segments, creating the files in
    // reverse id order so a naive directory listing would misresolve
    // last-write-wins.
    let newer = fixture.dir().join("seg-0000000100000000.log");
    let older = fixture.dir().join("seg-0000000000000000.log");
    std::fs::write(&newer, "shared,newest\nonly_new,1\n").unwrap();
    std::fs::write(&older, "shared,oldest\nonly_old,1\n").unwrap();

    let engine = StorageEngine::open(fixture.dir()).unwrap();
    assert_eq!(engine.get("shared").unwrap(), "newest");
    assert_eq!(engine.get("only_old").unwrap(), "1");
    assert_eq!(engine.get("only_new").unwrap(), "1");
}

#[test]
fn test_recovery_ignores_foreign_files() {
    let fixture = StorageFixture::new();
    std::fs::write(fixture.dir().join("seg-0000000000000000.log"), "a,1\n").unwrap();
    std::fs::write(fixture.dir().join("notes.txt"), "not a segment\n").unwrap();
    std::fs::write(fixture.dir().join("seg-garbage.log.bak"), "x,y\n").unwrap();

    let engine = StorageEngine::open(fixture.dir()).unwrap();
    assert_eq!(engine.segment_count().unwrap(), 1);
    assert_eq!(engine.get("a").unwrap(), "1");
}

#[test]
fn test_recovery_fails_on_corrupt_segment() {
    let fixture = StorageFixture::new();
    std::fs::write(
        fixture.dir().join("seg-0000000000000000.log"),
        "good,record\nthis line has no delimiter\n",
    )
    .unwrap();

    // Startup is all-or-nothing: a malformed record fails open rather
    // than silently skipping it.
    assert!(StorageEngine::open(fixture.dir()).is_err());
}

#[cfg(unix)]
#[test]
fn test_recovery_fails_on_unreadable_segment() {
    let fixture = StorageFixture::new();
    std::fs::write(fixture.dir().join("seg-0000000000000000.log"), "a,1\n").unwrap();

    // A segment-named file that cannot be stat'ed must fail the open,
    // not shrink the recovered set to whatever was readable.
    std::os::unix::fs::symlink(
        fixture.dir().join("no-such-target"),
        fixture.dir().join("seg-0000000100000000.log"),
    )
    .unwrap();

    assert!(StorageEngine::open(fixture.dir()).is_err());
}

#[test]
fn test_restart_continues_appending_to_recovered_active() {
    let fixture = StorageFixture::new();

    {
        let engine = StorageEngine::open(fixture.dir()).unwrap();
        engine.set("a", "1").unwrap();
    }
    {
        let engine = StorageEngine::open(fixture.dir()).unwrap();
        engine.set("b", "2").unwrap();
        // Default threshold is 1 MiB; both writes share one segment.
        assert_eq!(engine.segment_count().unwrap(), 1);
    }

    let engine = StorageEngine::open(fixture.dir()).unwrap();
    assert_eq!(engine.get("a").unwrap(), "1");
    assert_eq!(engine.get("b").unwrap(), "2");
}

#[test]
fn test_open_on_fresh_directory() {
    let fixture = StorageFixture::new();
    let nested = fixture.dir().join("brand/new/store");

    let engine = StorageEngine::open(&nested).unwrap();
    assert_eq!(engine.segment_count().unwrap(), 0);
    assert!(matches!(
        engine.get("anything"),
        Err(casklite_core::Error::KeyNotFound)
    ));
}
