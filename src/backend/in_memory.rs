//! InMemoryBackend - process-local table for testing and development.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::trace;

use super::{check_batch, deleted_marker, merge, overwrite, position, record_id, Backend};
use crate::error::BackendError;
use crate::schema::{self, Document};
use crate::Filter;

/// In-memory backend holding records in insertion order.
///
/// Clone-friendly via Arc: clones share the same table.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    records: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, soft-deleted ones included.
    pub fn len(&self) -> Result<usize, BackendError> {
        Ok(self.read("len")?.len())
    }

    pub fn is_empty(&self) -> Result<bool, BackendError> {
        Ok(self.len()? == 0)
    }

    fn read(
        &self,
        operation: &'static str,
    ) -> Result<std::sync::RwLockReadGuard<'_, Vec<Document>>, BackendError> {
        self.records
            .read()
            .map_err(|_| BackendError::LockPoisoned(operation))
    }

    fn write(
        &self,
        operation: &'static str,
    ) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Document>>, BackendError> {
        self.records
            .write()
            .map_err(|_| BackendError::LockPoisoned(operation))
    }
}

impl Backend for InMemoryBackend {
    fn get(&self, id: &str) -> Result<Option<Document>, BackendError> {
        let records = self.read("get")?;
        Ok(position(&records, id).map(|i| records[i].clone()))
    }

    fn list(&self) -> Result<Vec<Document>, BackendError> {
        Ok(self.read("list")?.clone())
    }

    fn find(&self, filter: &Filter, first_only: bool) -> Result<Vec<Document>, BackendError> {
        let records = self.read("find")?;
        let matching = records.iter().filter(|record| filter.matches(record));

        Ok(if first_only {
            matching.take(1).cloned().collect()
        } else {
            matching.cloned().collect()
        })
    }

    fn create(&self, record: Document) -> Result<Document, BackendError> {
        let mut records = self.write("create")?;
        let id = record_id(&record)?;

        if position(&records, id).is_some() {
            return Err(BackendError::DuplicateId(id.to_string()));
        }

        trace!(id, "insert");
        records.push(record.clone());
        Ok(record)
    }

    fn bulk_create(&self, batch: Vec<Document>) -> Result<Vec<Document>, BackendError> {
        let mut records = self.write("bulk_create")?;

        // Validate the whole batch first so a bad record leaves the table untouched.
        check_batch(&records, &batch)?;

        trace!(count = batch.len(), "bulk insert");
        records.extend(batch.iter().cloned());
        Ok(batch)
    }

    fn update(&self, id: &str, patch: Document) -> Result<Option<Document>, BackendError> {
        let mut records = self.write("update")?;

        match position(&records, id) {
            Some(i) => {
                trace!(id, "update");
                merge(&mut records[i], patch);
                Ok(Some(records[i].clone()))
            }
            None => Ok(None),
        }
    }

    fn replace(&self, id: &str, record: Document) -> Result<Option<Document>, BackendError> {
        let mut records = self.write("replace")?;

        match position(&records, id) {
            Some(i) => {
                trace!(id, "replace");
                overwrite(&mut records[i], record);
                Ok(Some(records[i].clone()))
            }
            None => Ok(None),
        }
    }

    fn delete(&self, id: &str) -> Result<bool, BackendError> {
        let mut records = self.write("delete")?;

        match position(&records, id) {
            Some(i) => {
                trace!(id, "delete");
                records.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn soft_delete(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<bool, BackendError> {
        let mut records = self.write("soft_delete")?;

        match position(&records, id) {
            Some(i) => {
                trace!(id, "soft delete");
                records[i].insert(schema::DELETED_AT.to_string(), deleted_marker(deleted_at));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn truncate(&self) -> Result<(), BackendError> {
        self.write("truncate")?.clear();
        Ok(())
    }
}
