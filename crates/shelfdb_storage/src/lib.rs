//! # ShelfDB Storage
//!
//! Storage backend trait and implementations for ShelfDB.
//!
//! This crate provides the lowest-level storage abstraction for ShelfDB.
//! A backend holds exactly one **opaque blob**: the encoded record set.
//! Backends never interpret the bytes they store.
//!
//! ## Design Principles
//!
//! - Backends are whole-blob stores (read everything, replace everything)
//! - No knowledge of the record encoding
//! - Must be `Send + Sync` so a store can live behind a mutex
//! - A replace either lands completely or leaves the previous blob intact
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use shelfdb_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.replace(b"hello world").unwrap();
//! assert_eq!(backend.read_all().unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
