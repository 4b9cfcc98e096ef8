//! Demonstrates casklite's persistent storage across restarts.
//!
//! Run with: cargo run -p casklite --example persistent_demo

use casklite::Store;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store_path = "./demo_store";

    println!("=== casklite Persistence Demo ===\n");

    // Clean up any previous demo data
    if Path::new(store_path).exists() {
        std::fs::remove_dir_all(store_path)?;
        println!("🧹 Cleaned up previous demo data\n");
    }

    // PART 1: Write data
    println!("📝 PART 1: Writing data...");
    {
        let store = Store::open(store_path)?;

        store.set("user:1:name", "Alice")?;
        store.set("user:1:email", "alice@example.com")?;
        store.set("user:2:name", "Bob")?;
        store.set("user:2:email", "bob@example.com")?;
        store.set("stats:total_users", "2")?;

        println!("   ✅ Stored 2 users and 1 counter");
        println!("   📁 Segments written to: {}", store_path);

        // Store goes out of scope and closes
    }
    println!("   🔒 Store closed\n");

    // PART 2: Reopen and verify data persisted
    println!("🔓 PART 2: Reopening store and verifying data...");
    {
        let store = Store::open(store_path)?;

        println!(
            "   User 1: {} <{}>",
            store.get("user:1:name")?,
            store.get("user:1:email")?
        );
        println!(
            "   User 2: {} <{}>",
            store.get("user:2:name")?,
            store.get("user:2:email")?
        );
        println!("   Total users: {}", store.get("stats:total_users")?);

        println!("   ✅ All data successfully recovered!");
    }
    println!();

    // PART 3: Updates always win
    println!("🔄 PART 3: Updating data...");
    {
        let store = Store::open(store_path)?;

        store.set("user:1:email", "alice@work.example.com")?;
        println!("   📝 Updated Alice's email");

        assert_eq!(store.get("user:1:email")?, "alice@work.example.com");
        println!("   ✅ Latest value wins");
    }

    // Clean up demo
    std::fs::remove_dir_all(store_path)?;
    println!("\n🧹 Cleaned up demo store");
    println!("\n=== Demo Complete! ===");

    Ok(())
}
