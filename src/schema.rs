//! Schema - the base shape every stored record extends.
//!
//! A stored record is a flat JSON object: the schema's own fields plus the base
//! fields `id`, `createdAt`, `updatedAt` and `deletedAt`. In memory the two halves
//! are kept apart as [`Meta`] and the schema value.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;

/// A stored record: string keys to JSON values.
pub type Document = Map<String, Value>;

pub const ID: &str = "id";
pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";
pub const DELETED_AT: &str = "deletedAt";

/// Keys owned by [`Meta`]. Schema types must not declare them.
pub const BASE_KEYS: [&str; 4] = [ID, CREATED_AT, UPDATED_AT, DELETED_AT];

/// Trait for types that can back a model.
///
/// Usually derived with `#[derive(Schema)]`:
///
/// ```ignore
/// #[derive(Clone, Default, Serialize, Deserialize, Schema)]
/// #[schema(name = "person")]
/// struct Person {
///     name: String,
///     age: u32,
/// }
/// ```
pub trait Schema: Serialize + DeserializeOwned + Clone + Default + Send + Sync + 'static {
    /// Default model name, also the storage key for key-value backends.
    const NAME: &'static str;
}

/// Identity and policy timestamps of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Encode a schema value and its meta into one stored document.
pub(crate) fn encode<T: Serialize>(
    model: &str,
    meta: &Meta,
    data: &T,
) -> Result<Document, ModelError> {
    let mut doc = to_object(model, data)?;
    for key in BASE_KEYS {
        doc.remove(key);
    }
    if let Value::Object(base) = serde_json::to_value(meta)? {
        doc.extend(base);
    }
    Ok(doc)
}

/// Split a stored document back into meta and schema value.
pub(crate) fn decode<T: DeserializeOwned>(mut doc: Document) -> Result<(Meta, T), ModelError> {
    let mut base = Map::new();
    for key in BASE_KEYS {
        if let Some(value) = doc.remove(key) {
            if !value.is_null() {
                base.insert(key.to_string(), value);
            }
        }
    }
    let meta: Meta = serde_json::from_value(Value::Object(base))?;
    let data: T = serde_json::from_value(Value::Object(doc))?;
    Ok((meta, data))
}

/// Serialize any value, requiring the result to be a JSON object.
pub(crate) fn to_object<T: Serialize + ?Sized>(model: &str, value: &T) -> Result<Document, ModelError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(ModelError::NotAnObject {
            model: model.to_string(),
        }),
    }
}
