//! # ShelfDB Core
//!
//! Entity management for ShelfDB.
//!
//! This crate provides:
//! - [`Entity`] / [`DynEntity`] - typed entities with a declared member table
//! - [`DataStore`] - whole-file persistence of type → key → attribute bag
//! - [`EntityManager`] - identity cache, dual indexes, pending saves, commits
//! - [`CommitObserver`] - listeners notified on every commit
//!
//! ## Example
//!
//! ```rust,ignore
//! use shelfdb_core::{EntityManager, EntityRegistry};
//!
//! let registry = EntityRegistry::new().with::<InventoryItem>();
//! let mut manager = EntityManager::open(Path::new("inventory.json"), registry)?;
//! manager.attach(Arc::new(AuditLog::open("audit.log")?));
//!
//! let item = manager.get_or_create::<InventoryItem>(
//!     Attributes::new().with("sku", "abc-4589").with("quantity", 0),
//! )?;
//! item.receive(4)?;
//! manager.commit()?;
//! ```
//!
//! ## Limitations
//!
//! - One process per store file; there is no file locking
//! - A commit is not atomic across entities, and observers may run before a
//!   flush that then fails
//! - Surrogate IDs restart at 1 in every process

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod entity;
mod error;
mod manager;
mod observer;
mod store;
mod types;

pub use config::{Config, PendingPolicy};
pub use entity::{DynEntity, Entity, EntityRegistry, Member, ID_FIELD};
pub use error::{CoreError, CoreResult};
pub use manager::{EntityManager, SharedEntityManager};
pub use observer::CommitObserver;
pub use store::DataStore;
pub use types::{EntityKey, SurrogateId};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
