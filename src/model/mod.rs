//! Models - the facade binding one schema, one backend and one settings object.
//!
//! A model shapes raw data into live [`Record`]s, applies the timestamp and
//! soft-delete policies, and forwards lookups to its backend.
//!
//! ## Example
//!
//! ```ignore
//! use active_store::{Filter, InMemoryBackend, Model, ModelSettings, Schema};
//!
//! #[derive(Clone, Default, Serialize, Deserialize, Schema)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! let people = Model::<Person>::new(InMemoryBackend::new(), ModelSettings::default());
//!
//! let mut person = people.build_default();
//! person.name = "johnrey".into();
//! person.save()?;
//!
//! let found = people.find_one(&Filter::new().eq("name", "johnrey"))?;
//! ```

mod policy;
mod settings;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::backend::Backend;
use crate::error::ModelError;
use crate::filter::Filter;
use crate::record::{Record, Records};
use crate::schema::{self, Document, Meta, Schema};

pub(crate) use policy::{prepare_create, prepare_update, remove};
pub use policy::{Clock, SystemClock};
pub use settings::ModelSettings;

/// Everything a record needs to persist itself. Shared by the model and
/// every record it builds.
pub(crate) struct ModelContext {
    pub(crate) name: String,
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) settings: ModelSettings,
    pub(crate) clock: Arc<dyn Clock>,
}

/// Typed facade over a backend for schema `T`.
///
/// Clones share the backend. No uniqueness of names is enforced here; two
/// models with one name are fine when they are meant to reuse a schema.
pub struct Model<T> {
    context: Arc<ModelContext>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Model<T> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Model<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.context.name)
            .field("settings", &self.context.settings)
            .finish_non_exhaustive()
    }
}

impl<T: Schema> Model<T> {
    /// Create a model named after `T::NAME`.
    pub fn new(backend: impl Backend + 'static, settings: ModelSettings) -> Self {
        Self::with_name(T::NAME, backend, settings)
    }

    /// Create a model under an explicit name.
    pub fn with_name(
        name: impl Into<String>,
        backend: impl Backend + 'static,
        settings: ModelSettings,
    ) -> Self {
        Self::from_shared(name, Arc::new(backend), settings)
    }

    /// Create a model over a backend that is already shared.
    pub fn from_shared(
        name: impl Into<String>,
        backend: Arc<dyn Backend>,
        settings: ModelSettings,
    ) -> Self {
        Self {
            context: Arc::new(ModelContext {
                name: name.into(),
                backend,
                settings,
                clock: Arc::new(SystemClock),
            }),
            _marker: PhantomData,
        }
    }

    /// Replace the time source used for policy stamps. Records built before
    /// the call keep the previous clock.
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        let context = &self.context;
        Self {
            context: Arc::new(ModelContext {
                name: context.name.clone(),
                backend: Arc::clone(&context.backend),
                settings: context.settings,
                clock,
            }),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.context.name
    }

    pub fn settings(&self) -> ModelSettings {
        self.context.settings
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.context.backend
    }

    // ------------------------------------------------------------------
    // Building (no backend writes)
    // ------------------------------------------------------------------

    /// Wrap `data` in an unsaved record. It has no id until saved.
    pub fn build(&self, data: T) -> Record<T> {
        Record::new(Arc::clone(&self.context), Meta::default(), data)
    }

    /// An unsaved record with default field values.
    pub fn build_default(&self) -> Record<T> {
        self.build(T::default())
    }

    /// Wrap each value in an unsaved record, preserving order.
    pub fn build_many(&self, data: impl IntoIterator<Item = T>) -> Records<T> {
        data.into_iter().map(|item| self.build(item)).collect()
    }

    /// Turn a stored document (base fields included) into a live record.
    pub fn activate(&self, doc: Document) -> Result<Record<T>, ModelError> {
        let (meta, data) = schema::decode(doc)?;
        Ok(Record::new(Arc::clone(&self.context), meta, data))
    }

    fn activate_many(&self, docs: Vec<Document>) -> Result<Records<T>, ModelError> {
        docs.into_iter().map(|doc| self.activate(doc)).collect()
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Persist `data` as a new record with a fresh id.
    pub fn create(&self, data: T) -> Result<Record<T>, ModelError> {
        let context = &self.context;
        let mut meta = Meta::default();
        prepare_create(&mut meta, &context.settings, context.clock.as_ref());
        let doc = schema::encode(&context.name, &meta, &data)?;

        debug!(model = %context.name, id = meta.id.as_deref(), "create");
        let stored = context.backend.create(doc)?;
        self.activate(stored)
    }

    /// Persist several new records with one bulk backend call.
    pub fn create_many(&self, data: impl IntoIterator<Item = T>) -> Result<Records<T>, ModelError> {
        let context = &self.context;
        let docs = data
            .into_iter()
            .map(|item| {
                let mut meta = Meta::default();
                prepare_create(&mut meta, &context.settings, context.clock.as_ref());
                schema::encode(&context.name, &meta, &item)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if docs.is_empty() {
            return Ok(Records::new());
        }

        debug!(model = %context.name, count = docs.len(), "bulk create");
        let stored = context.backend.bulk_create(docs)?;
        self.activate_many(stored)
    }

    /// Merge `patch` into the record with `id`. Returns None if the id is unknown.
    ///
    /// `patch` must serialize to a JSON object. `id` and `createdAt` in the
    /// patch are ignored.
    pub fn update<P: Serialize + ?Sized>(
        &self,
        id: &str,
        patch: &P,
    ) -> Result<Option<Record<T>>, ModelError> {
        let context = &self.context;
        let mut patch = schema::to_object(&context.name, patch)?;
        policy::prepare_patch(&mut patch, &context.settings, context.clock.as_ref());

        debug!(model = %context.name, id, "update");
        match context.backend.update(id, patch)? {
            Some(stored) => self.activate(stored).map(Some),
            None => Ok(None),
        }
    }

    /// Delete the record with `id`, or mark it deleted when soft delete is on.
    /// Returns whether a record with that id existed.
    pub fn delete(&self, id: &str) -> Result<bool, ModelError> {
        let context = &self.context;
        debug!(model = %context.name, id, soft = context.settings.soft_delete, "delete");
        let (existed, _) = remove(
            context.backend.as_ref(),
            id,
            &context.settings,
            context.clock.as_ref(),
        )?;
        Ok(existed)
    }

    /// Remove every record, soft delete notwithstanding.
    pub fn truncate(&self) -> Result<(), ModelError> {
        debug!(model = %self.context.name, "truncate");
        self.context.backend.truncate()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Every record in the backend, soft-deleted ones included.
    pub fn list(&self) -> Result<Records<T>, ModelError> {
        let docs = self.context.backend.list()?;
        self.activate_many(docs)
    }

    /// Records whose fields equal every pair in `filter`.
    pub fn find(&self, filter: &Filter) -> Result<Records<T>, ModelError> {
        let docs = self.context.backend.find(filter, false)?;
        self.activate_many(docs)
    }

    /// The first record matching `filter`, or None.
    ///
    /// "First" follows the backend's iteration order, which is
    /// implementation-defined. The bundled backends use insertion order.
    pub fn find_one(&self, filter: &Filter) -> Result<Option<Record<T>>, ModelError> {
        match self.context.backend.find(filter, true)?.into_iter().next() {
            Some(doc) => self.activate(doc).map(Some),
            None => Ok(None),
        }
    }

    /// The record with `id`, or None.
    pub fn get(&self, id: &str) -> Result<Option<Record<T>>, ModelError> {
        match self.context.backend.get(id)? {
            Some(doc) => self.activate(doc).map(Some),
            None => Ok(None),
        }
    }

    /// Alias of [`get`](Self::get).
    pub fn find_by_id(&self, id: &str) -> Result<Option<Record<T>>, ModelError> {
        self.get(id)
    }
}
