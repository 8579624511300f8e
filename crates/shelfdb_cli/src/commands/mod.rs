//! CLI command implementations.

pub mod convert;
pub mod dump;
pub mod inspect;
pub mod verify;

use shelfdb_core::DataStore;
use std::path::Path;

/// Opens an existing store file. Unlike [`DataStore::open`], a missing file
/// is an error rather than a new empty store.
pub(crate) fn open_existing(path: &Path) -> Result<DataStore, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("No store found at {}", path.display()).into());
    }
    Ok(DataStore::open(path)?)
}
