//! Core type definitions for ShelfDB.

use std::fmt;

/// Process-lifetime identity of a live entity.
///
/// Surrogate IDs are monotonically increasing and never reused within one
/// process, but they are not persisted: a reopened store numbers its
/// entities from 1 again. Only primary keys are durable identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurrogateId(pub u64);

impl SurrogateId {
    /// Creates a new surrogate ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next ID.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SurrogateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Durable identity of an entity: its type name plus primary key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    /// Entity type name.
    pub type_name: String,
    /// Primary key rendered as a string.
    pub primary_key: String,
}

impl EntityKey {
    /// Creates a key.
    pub fn new(type_name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            primary_key: primary_key.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_name, self.primary_key)
    }
}
