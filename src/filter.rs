//! Equality filters for `find` / `find_one`.

use serde::Serialize;
use serde_json::Value;

use crate::error::ModelError;
use crate::schema::{self, Document};

/// A set of field/value pairs. A document matches when every pair is present
/// in it with an equal value.
///
/// ```ignore
/// let filter = Filter::new().eq("age", 1).eq("name", "jane doe");
/// let matches = people.find(&filter)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Document,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Build a filter from any value that serializes to a JSON object,
    /// e.g. `json!({"age": 1})` or a struct of optional fields.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, ModelError> {
        Ok(Self {
            fields: schema::to_object("filter", value)?,
        })
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `doc` carries every field of this filter with an equal value.
    pub fn matches(&self, doc: &Document) -> bool {
        self.fields
            .iter()
            .all(|(key, expected)| doc.get(key) == Some(expected))
    }
}

impl From<Document> for Filter {
    fn from(fields: Document) -> Self {
        Self { fields }
    }
}
