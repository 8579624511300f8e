//! Inventory domain built on ShelfDB.
//!
//! - [`InventoryItem`] - a stocked item keyed by SKU
//! - [`AuditLog`] - appends a line per saved entity on every commit
//! - [`LowStockAlert`] - raises a [`StockAlert`] for items running low

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod item;
pub mod observers;

pub use error::{InventoryError, InventoryResult};
pub use item::InventoryItem;
pub use observers::{
    AuditLog, LogNotifier, LowStockAlert, Notifier, RecordingNotifier, StockAlert,
};

use shelfdb_core::EntityRegistry;

/// Registry with every entity type of the inventory domain.
#[must_use]
pub fn registry() -> EntityRegistry {
    EntityRegistry::new().with::<InventoryItem>()
}
