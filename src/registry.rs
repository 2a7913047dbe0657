//! ModelRegistry - explicit tracking of live models and their backends.

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::backend::Backend;
use crate::error::ModelError;
use crate::model::{Model, ModelSettings};
use crate::schema::Schema;

struct Registered {
    name: String,
    backend: Arc<dyn Backend>,
}

/// Registry of models, created once at startup and handed to whoever builds
/// models. Clones share the same entries.
///
/// Registering a name that is already present replaces its backend binding.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    entries: Arc<RwLock<Vec<Registered>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a model named after `T::NAME` and register it.
    pub fn model<T: Schema>(
        &self,
        backend: impl Backend + 'static,
        settings: ModelSettings,
    ) -> Result<Model<T>, ModelError> {
        let model = Model::new(backend, settings);
        self.register(&model)?;
        Ok(model)
    }

    /// Construct a model under an explicit name and register it.
    pub fn model_named<T: Schema>(
        &self,
        name: impl Into<String>,
        backend: impl Backend + 'static,
        settings: ModelSettings,
    ) -> Result<Model<T>, ModelError> {
        let model = Model::with_name(name, backend, settings);
        self.register(&model)?;
        Ok(model)
    }

    pub fn register<T: Schema>(&self, model: &Model<T>) -> Result<(), ModelError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ModelError::LockPoisoned("register"))?;

        let backend = Arc::clone(model.backend());
        match entries.iter_mut().find(|entry| entry.name == model.name()) {
            Some(entry) => entry.backend = backend,
            None => entries.push(Registered {
                name: model.name().to_string(),
                backend,
            }),
        }
        debug!(model = model.name(), "registered");
        Ok(())
    }

    /// Forget a model. Returns true if it was registered.
    pub fn unregister(&self, name: &str) -> Result<bool, ModelError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ModelError::LockPoisoned("unregister"))?;

        let before = entries.len();
        entries.retain(|entry| entry.name != name);
        Ok(entries.len() != before)
    }

    pub fn contains(&self, name: &str) -> Result<bool, ModelError> {
        Ok(self.read("contains")?.iter().any(|entry| entry.name == name))
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Result<Vec<String>, ModelError> {
        Ok(self
            .read("names")?
            .iter()
            .map(|entry| entry.name.clone())
            .collect())
    }

    pub fn len(&self) -> Result<usize, ModelError> {
        Ok(self.read("len")?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ModelError> {
        Ok(self.len()? == 0)
    }

    /// Truncate every registered backend. Soft delete does not apply.
    pub fn truncate_all(&self) -> Result<(), ModelError> {
        let backends: Vec<_> = self
            .read("truncate_all")?
            .iter()
            .map(|entry| (entry.name.clone(), Arc::clone(&entry.backend)))
            .collect();

        for (name, backend) in backends {
            debug!(model = %name, "truncate");
            backend.truncate()?;
        }
        Ok(())
    }

    fn read(
        &self,
        operation: &'static str,
    ) -> Result<std::sync::RwLockReadGuard<'_, Vec<Registered>>, ModelError> {
        self.entries
            .read()
            .map_err(|_| ModelError::LockPoisoned(operation))
    }
}
