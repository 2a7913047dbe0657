mod backend;
mod error;
mod filter;
mod model;
mod record;
mod registry;
mod schema;

pub use backend::{Backend, InMemoryBackend, KeyValueStorage, MemoryStorage, StorageBackend};
pub use error::{BackendError, ModelError, SaveFailure};
pub use filter::Filter;
pub use model::{Clock, Model, ModelSettings, SystemClock};
pub use record::{Record, Records};
pub use registry::ModelRegistry;
pub use schema::{Document, Meta, Schema, BASE_KEYS};

// Re-export the derive macro under the trait's name, serde style
pub use active_store_macros::Schema;
