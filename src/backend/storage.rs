//! StorageBackend - a model table kept as one JSON array in a string key-value area.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::trace;

use super::{check_batch, deleted_marker, merge, overwrite, position, record_id, Backend};
use crate::error::BackendError;
use crate::schema::{self, Document};
use crate::Filter;

/// A string-to-string storage area shaped like the Web Storage API
/// (`localStorage` / `sessionStorage`).
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, BackendError>;

    fn set_item(&self, key: &str, value: String) -> Result<(), BackendError>;

    fn remove_item(&self, key: &str) -> Result<(), BackendError>;
}

/// Process-local storage area. Clones share the same items.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently present, in no particular order.
    pub fn keys(&self) -> Result<Vec<String>, BackendError> {
        let items = self
            .items
            .read()
            .map_err(|_| BackendError::LockPoisoned("keys"))?;
        Ok(items.keys().cloned().collect())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, BackendError> {
        let items = self
            .items
            .read()
            .map_err(|_| BackendError::LockPoisoned("get_item"))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), BackendError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| BackendError::LockPoisoned("set_item"))?;
        items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| BackendError::LockPoisoned("remove_item"))?;
        items.remove(key);
        Ok(())
    }
}

/// Backend storing a whole table as a JSON array under a single key.
///
/// Every operation reads the array, edits it, and writes it back, so several
/// backends (or processes sharing the storage area) see each other's writes.
pub struct StorageBackend<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> StorageBackend<S> {
    /// Bind a backend to `key` inside `storage`. Usually the key is the model name.
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Vec<Document>, BackendError> {
        match self.storage.get_item(&self.key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| BackendError::Serde(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    fn store(&self, records: &[Document]) -> Result<(), BackendError> {
        let raw = serde_json::to_string(records).map_err(|e| BackendError::Serde(e.to_string()))?;
        self.storage.set_item(&self.key, raw)
    }

    fn modify<R>(
        &self,
        edit: impl FnOnce(&mut Vec<Document>) -> Result<(R, bool), BackendError>,
    ) -> Result<R, BackendError> {
        let mut records = self.load()?;
        let (result, changed) = edit(&mut records)?;
        if changed {
            self.store(&records)?;
        }
        Ok(result)
    }
}

impl<S: KeyValueStorage> Backend for StorageBackend<S> {
    fn get(&self, id: &str) -> Result<Option<Document>, BackendError> {
        let records = self.load()?;
        Ok(records
            .into_iter()
            .find(|record| record.get(schema::ID).and_then(|v| v.as_str()) == Some(id)))
    }

    fn list(&self) -> Result<Vec<Document>, BackendError> {
        self.load()
    }

    fn find(&self, filter: &Filter, first_only: bool) -> Result<Vec<Document>, BackendError> {
        let matching = self.load()?.into_iter().filter(|record| filter.matches(record));

        Ok(if first_only {
            matching.take(1).collect()
        } else {
            matching.collect()
        })
    }

    fn create(&self, record: Document) -> Result<Document, BackendError> {
        self.modify(|records| {
            let id = record_id(&record)?;
            if position(records, id).is_some() {
                return Err(BackendError::DuplicateId(id.to_string()));
            }
            trace!(key = %self.key, id, "insert");
            records.push(record.clone());
            Ok((record, true))
        })
    }

    fn bulk_create(&self, batch: Vec<Document>) -> Result<Vec<Document>, BackendError> {
        self.modify(|records| {
            check_batch(records, &batch)?;
            trace!(key = %self.key, count = batch.len(), "bulk insert");
            records.extend(batch.iter().cloned());
            Ok((batch, true))
        })
    }

    fn update(&self, id: &str, patch: Document) -> Result<Option<Document>, BackendError> {
        self.modify(|records| match position(records, id) {
            Some(i) => {
                trace!(key = %self.key, id, "update");
                merge(&mut records[i], patch);
                Ok((Some(records[i].clone()), true))
            }
            None => Ok((None, false)),
        })
    }

    fn replace(&self, id: &str, record: Document) -> Result<Option<Document>, BackendError> {
        self.modify(|records| match position(records, id) {
            Some(i) => {
                trace!(key = %self.key, id, "replace");
                overwrite(&mut records[i], record);
                Ok((Some(records[i].clone()), true))
            }
            None => Ok((None, false)),
        })
    }

    fn delete(&self, id: &str) -> Result<bool, BackendError> {
        self.modify(|records| match position(records, id) {
            Some(i) => {
                trace!(key = %self.key, id, "delete");
                records.remove(i);
                Ok((true, true))
            }
            None => Ok((false, false)),
        })
    }

    fn soft_delete(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<bool, BackendError> {
        self.modify(|records| match position(records, id) {
            Some(i) => {
                trace!(key = %self.key, id, "soft delete");
                records[i].insert(schema::DELETED_AT.to_string(), deleted_marker(deleted_at));
                Ok((true, true))
            }
            None => Ok((false, false)),
        })
    }

    fn truncate(&self) -> Result<(), BackendError> {
        self.storage.remove_item(&self.key)
    }
}
