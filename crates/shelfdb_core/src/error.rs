//! Error types for ShelfDB core.

use crate::types::SurrogateId;
use shelfdb_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in ShelfDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The store file could not be created, opened or read.
    #[error("store unavailable at {location}: {source}")]
    StoreUnavailable {
        /// Where the store was expected.
        location: String,
        /// Underlying storage failure.
        #[source]
        source: StorageError,
    },

    /// The persisted content does not decode to a record set.
    #[error("store corrupt: {message}")]
    StoreCorrupt {
        /// Description of the corruption.
        message: String,
    },

    /// Writing the record set back to storage failed.
    #[error("store write failed: {source}")]
    StoreWriteFailed {
        /// Underlying storage failure.
        #[source]
        source: StorageError,
    },

    /// A record could not be encoded.
    #[error("codec error: {0}")]
    Codec(#[from] shelfdb_codec::CodecError),

    /// Attribute access on a name the entity type does not declare.
    #[error("{type_name} has no member named `{member}`")]
    UnknownMember {
        /// Entity type.
        type_name: String,
        /// The undeclared name.
        member: String,
    },

    /// A value of the wrong kind was assigned to a member.
    #[error("{type_name}.{member} expects {expected}, got {actual}")]
    InvalidValue {
        /// Entity type.
        type_name: String,
        /// Member being assigned.
        member: String,
        /// Kind the member accepts.
        expected: &'static str,
        /// Kind that was supplied.
        actual: &'static str,
    },

    /// The operation needs a surrogate ID that has not been assigned.
    #[error("{type_name} has no surrogate id yet")]
    IdentityNotSet {
        /// Entity type.
        type_name: String,
    },

    /// The entity is not tracked by the manager.
    #[error("entity {id} is not tracked")]
    NotTracked {
        /// Surrogate ID that was looked up.
        id: SurrogateId,
    },

    /// Creation attributes lack the primary-key member.
    #[error("{type_name} attributes are missing primary key `{member}`")]
    MissingPrimaryKey {
        /// Entity type.
        type_name: String,
        /// The primary-key member.
        member: String,
    },

    /// A primary-key change would collide with another live entity.
    #[error("{type_name} with primary key `{primary_key}` already exists")]
    DuplicateKey {
        /// Entity type.
        type_name: String,
        /// The contested key.
        primary_key: String,
    },
}

impl CoreError {
    /// Creates an unknown member error.
    pub fn unknown_member(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self::UnknownMember {
            type_name: type_name.into(),
            member: member.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(
        type_name: impl Into<String>,
        member: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::InvalidValue {
            type_name: type_name.into(),
            member: member.into(),
            expected,
            actual,
        }
    }

    /// Creates a store corrupt error.
    pub fn store_corrupt(message: impl Into<String>) -> Self {
        Self::StoreCorrupt {
            message: message.into(),
        }
    }

    /// Creates an identity not set error.
    pub fn identity_not_set(type_name: impl Into<String>) -> Self {
        Self::IdentityNotSet {
            type_name: type_name.into(),
        }
    }
}
