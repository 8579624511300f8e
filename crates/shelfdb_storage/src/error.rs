//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store file exists but cannot be both read and written.
    #[error("store file is not readable and writable: {}", path.display())]
    PermissionDenied {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// The store path points at something other than a regular file.
    #[error("store path is not a regular file: {}", path.display())]
    NotAFile {
        /// Path of the offending entry.
        path: PathBuf,
    },
}
