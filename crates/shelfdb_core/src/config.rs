//! Store and manager configuration.

use shelfdb_codec::Format;

/// What happens to the pending-save list after a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingPolicy {
    /// Entities stay pending for the rest of the process (until deleted), so
    /// every commit re-persists everything created or touched so far.
    #[default]
    RetainAll,
    /// The pending list is cleared once a flush succeeds; only entities
    /// touched since then are staged by the next commit.
    ClearOnFlush,
}

/// Configuration for opening a store and bootstrapping a manager.
#[derive(Debug, Clone)]
pub struct Config {
    /// Encoding used when the store is flushed.
    ///
    /// Existing files are read in whatever format they were written in.
    pub format: Format,

    /// Whether to create missing parent directories of the store file.
    pub create_dirs: bool,

    /// Pending-save behavior after a successful commit.
    pub pending_policy: PendingPolicy,

    /// Flush before notifying observers instead of after.
    pub notify_after_flush: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: Format::Json,
            create_dirs: false,
            pending_policy: PendingPolicy::RetainAll,
            notify_after_flush: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flush encoding.
    #[must_use]
    pub const fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Sets whether missing parent directories are created.
    #[must_use]
    pub const fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }

    /// Sets the pending-save policy.
    #[must_use]
    pub const fn pending_policy(mut self, policy: PendingPolicy) -> Self {
        self.pending_policy = policy;
        self
    }

    /// Sets whether observers run only after a successful flush.
    #[must_use]
    pub const fn notify_after_flush(mut self, value: bool) -> Self {
        self.notify_after_flush = value;
        self
    }
}
