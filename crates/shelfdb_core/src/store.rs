//! Whole-file record store.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::types::SurrogateId;
use shelfdb_codec::{decode_records, encode_records, Attributes, Format, Records};
use shelfdb_storage::{FileBackend, InMemoryBackend, StorageBackend};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Persists type name → primary key → attribute bag as one blob.
///
/// All reads and writes between [`DataStore::open`] and
/// [`DataStore::flush`] happen on the in-memory record set; `flush`
/// re-encodes everything and replaces the blob in one step.
///
/// The store also hands out surrogate IDs. The counter starts at 1 for every
/// opened store and is never written to disk.
pub struct DataStore {
    backend: Box<dyn StorageBackend>,
    format: Format,
    records: Records,
    next_id: SurrogateId,
}

impl DataStore {
    /// Opens (creating if missing) the store file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::StoreUnavailable`] if the file cannot be created, read
    ///   or written
    /// - [`CoreError::StoreCorrupt`] if a non-empty file does not decode
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(path, &Config::default())
    }

    /// Opens the store file at `path` with custom configuration.
    ///
    /// # Errors
    ///
    /// As for [`DataStore::open`].
    pub fn open_with_config(path: &Path, config: &Config) -> CoreResult<Self> {
        let opened = if config.create_dirs {
            FileBackend::open_with_create_dirs(path)
        } else {
            FileBackend::open(path)
        };
        let backend = opened.map_err(|source| CoreError::StoreUnavailable {
            location: path.display().to_string(),
            source,
        })?;
        Self::with_backend(Box::new(backend), config.format)
    }

    /// Creates an empty store that lives only in memory.
    #[must_use]
    pub fn open_in_memory() -> Self {
        Self {
            backend: Box::new(InMemoryBackend::new()),
            format: Format::default(),
            records: Records::new(),
            next_id: SurrogateId::new(1),
        }
    }

    /// Loads a store from an arbitrary backend.
    ///
    /// The existing blob is decoded in the format it was written in;
    /// `format` only governs subsequent flushes.
    ///
    /// # Errors
    ///
    /// As for [`DataStore::open`].
    pub fn with_backend(backend: Box<dyn StorageBackend>, format: Format) -> CoreResult<Self> {
        let location = backend.location();
        let data = backend
            .read_all()
            .map_err(|source| CoreError::StoreUnavailable {
                location: location.clone(),
                source,
            })?;

        let stored_format = Format::detect(&data).unwrap_or(format);
        let records = decode_records(&data, stored_format)
            .map_err(|e| CoreError::store_corrupt(format!("{location}: {e}")))?;

        info!(
            location = %location,
            format = %stored_format,
            types = records.len(),
            "opened data store"
        );

        Ok(Self {
            backend,
            format,
            records,
            next_id: SurrogateId::new(1),
        })
    }

    /// Returns the next surrogate ID and advances the counter.
    pub fn next_auto_id(&mut self) -> SurrogateId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    /// Inserts or replaces the record at (`type_name`, `primary_key`).
    pub fn put(&mut self, type_name: &str, primary_key: &str, attributes: Attributes) {
        self.records
            .entry(type_name.to_string())
            .or_default()
            .insert(primary_key.to_string(), attributes);
    }

    /// Returns the record at (`type_name`, `primary_key`).
    #[must_use]
    pub fn get_record(&self, type_name: &str, primary_key: &str) -> Option<&Attributes> {
        self.records.get(type_name)?.get(primary_key)
    }

    /// Removes and returns the record at (`type_name`, `primary_key`).
    ///
    /// Absent records are ignored. A type left without records disappears.
    pub fn delete(&mut self, type_name: &str, primary_key: &str) -> Option<Attributes> {
        let keyed = self.records.get_mut(type_name)?;
        let removed = keyed.remove(primary_key);
        if keyed.is_empty() {
            self.records.remove(type_name);
        }
        removed
    }

    /// Stored type names, sorted.
    pub fn list_types(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Stored primary keys of `type_name`, sorted.
    pub fn list_keys<'a>(&'a self, type_name: &str) -> impl Iterator<Item = &'a str> {
        self.records
            .get(type_name)
            .into_iter()
            .flat_map(BTreeMap::keys)
            .map(String::as_str)
    }

    /// Total number of stored records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.values().map(BTreeMap::len).sum()
    }

    /// The whole in-memory record set.
    #[must_use]
    pub fn records(&self) -> &Records {
        &self.records
    }

    /// Encoding used by [`DataStore::flush`].
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Changes the encoding used by subsequent flushes.
    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// Where the blob lives.
    #[must_use]
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Encodes the record set and replaces the stored blob.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Codec`] if a record cannot be encoded
    /// - [`CoreError::StoreWriteFailed`] if the write fails; the previous
    ///   blob is left in place
    pub fn flush(&mut self) -> CoreResult<()> {
        let data = encode_records(&self.records, self.format)?;
        self.backend
            .replace(&data)
            .map_err(|source| CoreError::StoreWriteFailed { source })?;
        debug!(
            location = %self.backend.location(),
            records = self.record_count(),
            bytes = data.len(),
            "flushed data store"
        );
        Ok(())
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("location", &self.backend.location())
            .field("format", &self.format)
            .field("records", &self.record_count())
            .field("next_id", &self.next_id)
            .finish()
    }
}
