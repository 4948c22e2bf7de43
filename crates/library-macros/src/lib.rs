//! Proc macros for the library API.
//!
//! `#[derive(ModelSerializer)]` turns a plain struct into a serializer: the
//! field table it generates drives validation, storage and the OpenAPI schema.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod parse;
mod serializer;

/// Derive `library_core::ModelSerializer` for a struct.
///
/// # Basic Usage
///
/// ```ignore
/// use library::ModelSerializer;
/// use serde::{Deserialize, Serialize};
///
/// /// A published book.
/// #[derive(Debug, Clone, Serialize, Deserialize, ModelSerializer)]
/// pub struct Book {
///     pub id: i64,
///     /// Full title of the book
///     #[field(max_length = 200)]
///     pub title: String,
///     #[field(min = 0, max = 9999)]
///     pub published_year: Option<i32>,
/// }
/// ```
///
/// # Type Mapping
///
/// - `String` -> string
/// - integer types -> integer
/// - `f32` / `f64` -> number
/// - `bool` -> boolean
/// - `Option<T>` -> nullable, not required
///
/// # Struct Attributes
///
/// - `#[serializer(name = "...")]` - display and schema name (default: struct name)
/// - `#[serializer(table = "...")]` - storage table (default: snake_case plural of the name)
///
/// # Field Attributes
///
/// - `#[field(primary_key)]` - identifier field (default: the field named `id`)
/// - `#[field(read_only)]` - present on output, ignored on input
/// - `#[field(allow_blank)]` - strings may be empty
/// - `#[field(max_length = N, min_length = N)]` - string length in characters
/// - `#[field(min = X, max = Y)]` - numeric range, inclusive
///
/// Doc comments on the struct and its fields become schema descriptions.
#[proc_macro_derive(ModelSerializer, attributes(serializer, field))]
pub fn model_serializer(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match serializer::expand_model_serializer(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
