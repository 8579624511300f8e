//! Append-only audit log of saved entities.

use crate::error::InventoryResult;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use shelfdb_core::{CommitObserver, EntityManager};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Writes one line per pending entity on every commit:
///
/// ```text
/// 2026-03-01T09:30:00Z InventoryItem {"description":"","price":0.0,"quantity":4,"sku":"abc-4589"}
/// ```
pub struct AuditLog {
    sink: Mutex<BufWriter<File>>,
}

impl AuditLog {
    /// Opens `path` for appending, creating it if missing.
    ///
    /// # Errors
    ///
    /// Any I/O error opening the file.
    pub fn open(path: &Path) -> InventoryResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            sink: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write_entries(&self, manager: &EntityManager) -> InventoryResult<usize> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut sink = self.sink.lock();
        let mut written = 0;
        for id in manager.pending_save_ids() {
            let Some(entity) = manager.entity_by_id(*id) else {
                continue;
            };
            let attributes = serde_json::to_string(&entity.attributes())
                .map_err(std::io::Error::from)?;
            writeln!(sink, "{timestamp} {} {attributes}", entity.type_name())?;
            written += 1;
        }
        sink.flush()?;
        Ok(written)
    }
}

impl CommitObserver for AuditLog {
    fn on_commit(&self, manager: &EntityManager) {
        match self.write_entries(manager) {
            Ok(written) => debug!(entries = written, "audit log updated"),
            Err(e) => warn!(error = %e, "failed to write audit log"),
        }
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}
