use std::fmt;

use thiserror::Error;

/// Errors raised by a persistence backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// A record was handed to `create`/`bulk_create` without an `id`.
    #[error("record has no id")]
    MissingId,

    #[error("record with id {0} already exists")]
    DuplicateId(String),

    #[error("backend serialization error: {0}")]
    Serde(String),

    #[error("backend storage error: {0}")]
    Storage(String),
}

/// Errors raised by models, records and collections.
///
/// Lookups that find nothing are never errors; they return `None`.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The backend failed. Passed through untouched.
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("model serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A schema value or patch did not encode to a JSON object.
    #[error("{model}: value does not encode to a JSON object")]
    NotAnObject { model: String },

    #[error("model registry lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// One or more members of a collection failed to save.
    #[error("{} of {attempted} records failed to save", .failures.len())]
    Batch {
        attempted: usize,
        failures: Vec<SaveFailure>,
    },
}

/// A single failed element of a collection save.
#[derive(Debug)]
pub struct SaveFailure {
    /// Position of the record in the collection.
    pub index: usize,
    pub error: ModelError,
}

impl fmt::Display for SaveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record #{}: {}", self.index, self.error)
    }
}
