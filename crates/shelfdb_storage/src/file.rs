//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Prefix for temporary files created next to the store during a replace.
const TEMP_PREFIX: &str = ".shelfdb-";
/// Suffix for temporary files created next to the store during a replace.
const TEMP_SUFFIX: &str = ".tmp";

/// A file-based storage backend.
///
/// The whole blob lives in one file. Replacing it uses the write-then-rename
/// pattern:
/// 1. Write to a temporary file in the same directory
/// 2. Sync the temporary file to disk
/// 3. Rename it over the store file
/// 4. Sync the directory so the rename itself is durable
///
/// A crash at any point leaves either the old or the new contents, never a
/// torn file.
///
/// # Example
///
/// ```no_run
/// use shelfdb_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("store.json")).unwrap();
/// backend.replace(b"{}").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Opens or creates a file backend at the given path.
    ///
    /// A missing file is created empty. An existing file must be a regular
    /// file that can be both read and written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, is not a regular
    /// file, or lacks read/write permission.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if path.exists() && !path.is_file() {
            return Err(StorageError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|err| match err.kind() {
                io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                    path: path.to_path_buf(),
                },
                _ => StorageError::Io(err),
            })?;

        // Privileged processes can open read-only files for writing; the
        // mode bits still decide whether the store is usable.
        if file.metadata()?.permissions().readonly() {
            return Err(StorageError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }

        debug!(path = %path.display(), "opened file backend");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Opens or creates a file backend, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or file cannot be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::open(path)
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Syncs the directory holding the store so a completed rename survives
    /// a crash.
    ///
    /// Windows NTFS journals metadata operations and does not support
    /// opening directories this way, so the explicit sync is skipped there.
    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        let dir = File::open(self.parent_dir())?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        let mut file = File::open(&self.path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(self.parent_dir())?;
        temp.write_all(data)?;
        temp.as_file().sync_all()?;

        // Keep the store's permissions across the rename.
        if let Ok(metadata) = fs::metadata(&self.path) {
            fs::set_permissions(temp.path(), metadata.permissions())?;
        }

        trace!(temp = %temp.path().display(), "renaming temporary file over store");
        temp.persist(&self.path).map_err(|err| err.error)?;
        self.sync_directory()?;

        debug!(path = %self.path.display(), bytes = data.len(), "replaced store file");
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
        assert!(backend.read_all().unwrap().is_empty());
    }

    #[test]
    fn file_replace_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.replace(b"first version").unwrap();
        backend.replace(b"second").unwrap();

        assert_eq!(backend.read_all().unwrap(), b"second");
        assert_eq!(backend.size().unwrap(), 6);
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.replace(b"persistent data").unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.read_all().unwrap(), b"persistent data");
    }

    #[test]
    fn file_open_keeps_existing_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, b"{\"Item\":{}}").unwrap();

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.read_all().unwrap(), b"{\"Item\":{}}");
    }

    #[test]
    fn file_replace_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.replace(b"abc").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(TEMP_SUFFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn file_directory_is_rejected() {
        let dir = tempdir().unwrap();

        let result = FileBackend::open(dir.path());
        assert!(matches!(result, Err(StorageError::NotAFile { .. })));
    }

    #[test]
    fn file_readonly_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, b"").unwrap();

        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        let result = FileBackend::open(&path);
        assert!(matches!(result, Err(StorageError::PermissionDenied { .. })));
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("store.json");

        let backend = FileBackend::open_with_create_dirs(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn file_path_and_location() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.path(), path);
        assert_eq!(backend.location(), path.display().to_string());
    }
}
