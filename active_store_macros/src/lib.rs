mod schema;

use proc_macro::TokenStream;

/// Derive macro that implements `active_store::Schema` for a struct.
///
/// # Usage
///
/// ```ignore
/// use active_store::Schema;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Default, Serialize, Deserialize, Schema)]
/// #[schema(name = "person")]
/// pub struct Person {
///     pub name: String,
///     pub age: u32,
/// }
/// ```
///
/// - `#[schema(name = "...")]` sets the model name (and storage key).
///   If omitted, defaults to the snake_case struct name.
/// - The struct must have named fields, none of which may be one of the base
///   fields every record already carries (`id`, `createdAt`, `updatedAt`,
///   `deletedAt`, in either snake_case or camelCase, or via `#[serde(rename)]`).
#[proc_macro_derive(Schema, attributes(schema))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    schema::derive_schema(input)
}
