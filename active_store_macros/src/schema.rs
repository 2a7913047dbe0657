use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr};

const RESERVED: [&str; 7] = [
    "id",
    "created_at",
    "createdAt",
    "updated_at",
    "updatedAt",
    "deleted_at",
    "deletedAt",
];

pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    if let Err(err) = check_fields(&input) {
        return err.to_compile_error().into();
    }

    let name = &input.ident;
    let model_name = match extract_name(&input) {
        Ok(model_name) => model_name,
        Err(err) => return err.to_compile_error().into(),
    };

    // Generic schemas only qualify for the instantiations that satisfy the
    // trait's supertraits.
    let mut generics = input.generics.clone();
    if !generics.params.is_empty() {
        let (_, ty_generics, _) = input.generics.split_for_impl();
        generics.make_where_clause().predicates.push(syn::parse_quote! {
            #name #ty_generics: ::serde::Serialize
                + ::serde::de::DeserializeOwned
                + ::core::clone::Clone
                + ::core::default::Default
                + ::core::marker::Send
                + ::core::marker::Sync
                + 'static
        });
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics active_store::Schema for #name #ty_generics #where_clause {
            const NAME: &'static str = #model_name;
        }
    };

    TokenStream::from(expanded)
}

fn check_fields(input: &DeriveInput) -> syn::Result<()> {
    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => fields,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Schema derive: only structs with named fields are supported",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Schema derive: only structs with named fields are supported",
            ))
        }
    };

    for field in &fields.named {
        let Some(ident) = &field.ident else { continue };
        let stored_as = serde_rename(field).unwrap_or_else(|| ident.to_string());

        if RESERVED.contains(&stored_as.as_str()) {
            return Err(syn::Error::new_spanned(
                ident,
                format!(
                    "Schema derive: `{}` is a base field managed by every record and cannot be declared",
                    stored_as
                ),
            ));
        }
    }

    Ok(())
}

/// `#[serde(rename = "...")]` on a field, if any.
fn serde_rename(field: &syn::Field) -> Option<String> {
    let mut renamed = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                renamed = Some(value.value());
            } else if meta.input.peek(syn::Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }
    renamed
}

fn extract_name(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("schema") {
            continue;
        }

        let mut name = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(syn::Error::new_spanned(&value, "Schema derive: name cannot be empty"));
                }
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("Schema derive: unsupported schema attribute, expected `name = \"...\"`"))
            }
        })?;

        if let Some(n) = name {
            return Ok(n);
        }
    }

    // Default: snake_case struct name
    Ok(to_snake_case(&input.ident.to_string()))
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
