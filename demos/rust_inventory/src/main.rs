//! ShelfDB Inventory Example
//!
//! This example demonstrates the entity lifecycle end to end:
//! - Opening a store and bootstrapping live entities from it
//! - Creating items by SKU and changing them through typed operations
//! - Committing with an audit log and a low-stock alert attached
//! - Re-keying and deleting items
//!
//! Run with: cargo run -p rust_inventory -- --store inventory.json

use clap::Parser;
use rust_inventory::{
    registry, AuditLog, InventoryError, InventoryItem, LogNotifier, LowStockAlert,
};
use shelfdb_codec::Attributes;
use shelfdb_core::{Config, CoreError, EntityManager};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Inventory demo backed by a ShelfDB store file.
#[derive(Parser)]
#[command(name = "inventory")]
#[command(version, about, long_about = None)]
struct Args {
    /// Store file
    #[arg(short, long, default_value = "inventory.json")]
    store: PathBuf,

    /// Audit log file
    #[arg(short, long, default_value = "inventory-audit.log")]
    audit_log: PathBuf,

    /// Notify observers only after the store is flushed
    #[arg(long)]
    notify_after_flush: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("Inventory Application Example");
    println!("=============================\n");

    let config = Config::new()
        .create_dirs(true)
        .notify_after_flush(args.notify_after_flush);
    let mut manager = EntityManager::open_with_config(&args.store, registry(), config)?;
    println!(
        "[OK] Store opened at {} ({} items loaded)",
        args.store.display(),
        manager.len()
    );

    manager.attach(Arc::new(AuditLog::open(&args.audit_log)?));
    manager.attach(Arc::new(LowStockAlert::new(Arc::new(LogNotifier))));

    // Receive stock
    println!("\n[+] Receiving stock...");
    let widget = manager.get_or_create::<InventoryItem>(
        Attributes::new()
            .with("sku", "abc-4589")
            .with("description", "Widget, large")
            .with("quantity", 0),
    )?;
    widget.receive(4)?;
    widget.set_sale_price(12.5)?;
    println!("  {} now has {} on hand", widget.sku, widget.quantity);

    let gizmo = manager.get_or_create::<InventoryItem>(
        Attributes::new()
            .with("sku", "gzm-0012")
            .with("description", "Gizmo")
            .with("quantity", 12),
    )?;
    gizmo.ship(5)?;
    println!("  {} now has {} on hand", gizmo.sku, gizmo.quantity);

    // Domain rules
    println!("\n[!] Trying to ship more than is on hand...");
    match gizmo.ship(100) {
        Err(e @ InventoryError::InsufficientStock { .. }) => println!("  rejected: {e}"),
        other => other?,
    }
    println!("\n[!] Trying a negative price...");
    match gizmo.set_sale_price(-1.0) {
        Err(e @ InventoryError::InvalidPrice { .. }) => println!("  rejected: {e}"),
        other => other?,
    }

    let staged = manager.commit()?;
    println!("\n[OK] Committed {staged} items");

    // Re-key an item
    if let Some(id) = manager.id_for("InventoryItem", "gzm-0012") {
        println!("\n[~] Renaming gzm-0012 to gzm-0013...");
        match manager.update(id, &Attributes::new().with("sku", "gzm-0013")) {
            Err(e @ CoreError::DuplicateKey { .. }) => println!("  skipped: {e}"),
            other => other?,
        }
    }

    // Remove an item
    if let Some(id) = manager.id_for("InventoryItem", "abc-4589") {
        println!("\n[-] Deleting abc-4589...");
        manager.delete(id)?;
    }
    manager.commit()?;

    println!("\n[*] Items on hand:");
    for id in manager.ids() {
        if let Some(item) = manager.entity::<InventoryItem>(id) {
            println!(
                "  {} {:<12} {:>4} @ {:.2}",
                id, item.sku, item.quantity, item.price
            );
        }
    }
    println!("\n[*] Audit log written to {}", args.audit_log.display());

    Ok(())
}
