//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level storage backend for ShelfDB.
///
/// Storage backends hold a single **opaque blob**. ShelfDB owns the record
/// encoding; backends only know how to hand the blob back and how to swap it
/// for a new one.
///
/// # Invariants
///
/// - `read_all` returns exactly the bytes of the last successful `replace`
///   (or the initial contents when nothing was replaced yet)
/// - A failed `replace` leaves the previous blob readable
/// - An empty blob is valid and means "nothing stored"
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads the whole blob.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read_all(&self) -> StorageResult<Vec<u8>>;

    /// Replaces the whole blob with `data`.
    ///
    /// After this returns successfully the new contents are durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. The previous contents remain.
    fn replace(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Returns the current size of the blob in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Short human-readable description of where the blob lives.
    fn location(&self) -> String;
}
