//! Backends - key-value persistence beneath the models.
//!
//! A backend holds one table of records for one model, keyed by `id`. It knows
//! nothing about schemas or policies; the model decides ids and timestamps and
//! hands the backend finished documents.
//!
//! Two implementations ship with the crate:
//!
//! - [`InMemoryBackend`]: a process-local table, clone-friendly via `Arc`.
//! - [`StorageBackend`]: keeps the table as one JSON array in a Web-Storage-like
//!   [`KeyValueStorage`] area, the way a browser `localStorage` model would.

mod in_memory;
mod storage;

use chrono::{DateTime, Utc};

use crate::error::BackendError;
use crate::schema::{self, Document};
use crate::Filter;

pub use in_memory::InMemoryBackend;
pub use storage::{KeyValueStorage, MemoryStorage, StorageBackend};

/// Persistence contract consumed by [`Model`](crate::Model).
///
/// Iteration order of `list` and `find` is up to the implementation. Both
/// bundled backends return records in insertion order.
pub trait Backend: Send + Sync {
    /// Get a record by id. Returns None if not found.
    fn get(&self, id: &str) -> Result<Option<Document>, BackendError>;

    /// Every record in the table, soft-deleted ones included.
    fn list(&self) -> Result<Vec<Document>, BackendError>;

    /// Records matching `filter`. With `first_only` the scan stops at the first hit.
    fn find(&self, filter: &Filter, first_only: bool) -> Result<Vec<Document>, BackendError>;

    /// Insert a record whose `id` is already assigned.
    fn create(&self, record: Document) -> Result<Document, BackendError>;

    /// Insert several records, each with an `id` already assigned.
    fn bulk_create(&self, records: Vec<Document>) -> Result<Vec<Document>, BackendError>;

    /// Merge `patch` into the stored record. Returns None if the id is unknown.
    fn update(&self, id: &str, patch: Document) -> Result<Option<Document>, BackendError>;

    /// Overwrite the stored record with `record`. Keys absent from `record`
    /// are dropped, except the stored `id` and a stored `deletedAt` marker.
    /// Returns None if the id is unknown.
    fn replace(&self, id: &str, record: Document) -> Result<Option<Document>, BackendError>;

    /// Remove a record. Returns true if it existed.
    fn delete(&self, id: &str) -> Result<bool, BackendError>;

    /// Mark a record deleted at `deleted_at` without removing it.
    /// Returns true if it existed.
    fn soft_delete(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<bool, BackendError>;

    /// Remove every record.
    fn truncate(&self) -> Result<(), BackendError>;
}

pub(crate) fn record_id(record: &Document) -> Result<&str, BackendError> {
    record
        .get(schema::ID)
        .and_then(|id| id.as_str())
        .filter(|id| !id.is_empty())
        .ok_or(BackendError::MissingId)
}

pub(crate) fn position(records: &[Document], id: &str) -> Option<usize> {
    records
        .iter()
        .position(|record| record.get(schema::ID).and_then(|v| v.as_str()) == Some(id))
}

/// Reject a batch with a missing id, an id repeated within the batch, or an
/// id already present in `records`.
pub(crate) fn check_batch(records: &[Document], batch: &[Document]) -> Result<(), BackendError> {
    for (i, record) in batch.iter().enumerate() {
        let id = record_id(record)?;
        let repeated = batch[..i]
            .iter()
            .any(|earlier| record_id(earlier).ok() == Some(id));
        if repeated || position(records, id).is_some() {
            return Err(BackendError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

/// Full overwrite; the stored `id` and soft-delete marker survive.
pub(crate) fn overwrite(target: &mut Document, mut record: Document) {
    record.remove(schema::ID);
    if !record.contains_key(schema::DELETED_AT) {
        if let Some(marker) = target.remove(schema::DELETED_AT) {
            record.insert(schema::DELETED_AT.to_string(), marker);
        }
    }
    if let Some(id) = target.remove(schema::ID) {
        record.insert(schema::ID.to_string(), id);
    }
    *target = record;
}

/// Shallow key-wise merge; the stored `id` always survives.
pub(crate) fn merge(target: &mut Document, patch: Document) {
    for (key, value) in patch {
        if key == schema::ID {
            continue;
        }
        target.insert(key, value);
    }
}

pub(crate) fn deleted_marker(deleted_at: DateTime<Utc>) -> serde_json::Value {
    serde_json::Value::String(deleted_at.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
}
