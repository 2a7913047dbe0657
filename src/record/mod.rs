//! Records - live, self-persisting entities and ordered collections of them.
//!
//! A [`Record`] owns its field values and keeps a shared handle to the model
//! that built it. `save` and `delete` always act on the record's current
//! fields, however much they changed since it was built.
//!
//! Two records built from the same stored row are independent copies. Saving
//! one does not refresh the other, and whichever saves last wins.

mod collection;

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::ModelError;
use crate::model::{prepare_create, prepare_update, remove, ModelContext};
use crate::schema::{self, Document, Meta, Schema};

pub use collection::Records;

/// A schema value bound to its model's backend and settings.
///
/// Derefs to `T`, so fields read and assign directly:
///
/// ```ignore
/// let mut person = people.build_default();
/// person.name = "johnrey".into();
/// person.save()?;
/// assert!(person.id().is_some());
/// ```
pub struct Record<T> {
    meta: Meta,
    data: T,
    context: Arc<ModelContext>,
}

impl<T: Schema> Record<T> {
    pub(crate) fn new(context: Arc<ModelContext>, meta: Meta, data: T) -> Self {
        Self {
            meta,
            data,
            context,
        }
    }

    /// None until the record has been persisted.
    pub fn id(&self) -> Option<&str> {
        self.meta.id.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.meta.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.meta.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.meta.deleted_at
    }

    /// Whether the record carries a soft-delete marker.
    pub fn is_deleted(&self) -> bool {
        self.meta.deleted_at.is_some()
    }

    /// Whether the record has been assigned an id, i.e. saved at least once.
    ///
    /// This is not a live existence check: it stays true after a hard delete,
    /// so a later [`save`](Self::save) reinserts under the same id.
    pub fn has_id(&self) -> bool {
        self.meta.id.is_some()
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn model_name(&self) -> &str {
        &self.context.name
    }

    /// The record as it would be stored right now.
    pub fn to_document(&self) -> Result<Document, ModelError> {
        schema::encode(&self.context.name, &self.meta, &self.data)
    }

    /// Write the current fields to the backend.
    ///
    /// Without an id this creates the record (fresh id, creation stamp). With an
    /// id it rewrites the stored record from the in-memory fields (update
    /// stamp); no diffing against what the backend holds. If the backend no
    /// longer knows the id, the record is inserted again under it.
    ///
    /// The stored record is replaced, not merged: a field cleared in memory is
    /// cleared in storage too. A soft-delete marker already in storage is kept.
    ///
    /// On success the record reflects what the backend stored. On failure it is
    /// left as it was.
    pub fn save(&mut self) -> Result<(), ModelError> {
        let context = Arc::clone(&self.context);
        let settings = &context.settings;
        let clock = context.clock.as_ref();
        let mut meta = self.meta.clone();

        let stored = match meta.id.clone() {
            None => {
                prepare_create(&mut meta, settings, clock);
                let doc = schema::encode(&context.name, &meta, &self.data)?;
                debug!(model = %context.name, id = meta.id.as_deref(), "save new record");
                context.backend.create(doc)?
            }
            Some(id) => {
                prepare_update(&mut meta, settings, clock);
                let doc = schema::encode(&context.name, &meta, &self.data)?;
                debug!(model = %context.name, id = %id, "save record");
                match context.backend.replace(&id, doc.clone())? {
                    Some(stored) => stored,
                    None => {
                        debug!(model = %context.name, id = %id, "record missing from backend, reinserting");
                        context.backend.create(doc)?
                    }
                }
            }
        };

        let (meta, data) = schema::decode(stored)?;
        self.meta = meta;
        self.data = data;
        Ok(())
    }

    /// Delete the stored record, or mark it deleted when the model uses soft
    /// delete. Returns whether the backend had it.
    ///
    /// A record that was never saved has nothing to delete: this returns
    /// `Ok(false)` without touching the backend.
    pub fn delete(&mut self) -> Result<bool, ModelError> {
        let Some(id) = self.meta.id.clone() else {
            return Ok(false);
        };
        let context = Arc::clone(&self.context);

        debug!(model = %context.name, id = %id, soft = context.settings.soft_delete, "delete record");
        let (existed, deleted_at) = remove(
            context.backend.as_ref(),
            &id,
            &context.settings,
            context.clock.as_ref(),
        )?;

        if existed && deleted_at.is_some() {
            self.meta.deleted_at = deleted_at;
        }
        Ok(existed)
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T> DerefMut for Record<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

impl<T: Clone> Clone for Record<T> {
    fn clone(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            data: self.data.clone(),
            context: Arc::clone(&self.context),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Record<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("model", &self.context.name)
            .field("meta", &self.meta)
            .field("data", &self.data)
            .finish()
    }
}
