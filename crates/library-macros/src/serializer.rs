//! `ModelSerializer` expansion.
//!
//! ```ignore
//! #[derive(Debug, Clone, Serialize, Deserialize, ModelSerializer)]
//! struct Book {
//!     id: i64,
//!     #[field(max_length = 200)]
//!     title: String,
//!     #[field(min = 0, max = 9999)]
//!     published_year: Option<i32>,
//! }
//! ```
//!
//! generates `impl ModelSerializer for Book` with a `const` field table.

use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::DeriveInput;

use crate::parse::{FieldInfo, Kind, ModelInfo};

pub(crate) fn expand_model_serializer(input: DeriveInput) -> syn::Result<TokenStream> {
    let model = ModelInfo::parse(&input)?;

    let ident = &model.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let name = &model.name;
    let table = &model.table;

    let pk = model.primary_key().ok_or_else(|| {
        syn::Error::new_spanned(&input.ident, "ModelSerializer needs a primary key")
    })?;
    let pk_ident = &pk.ident;

    let specs: Vec<TokenStream> = model.fields.iter().map(field_spec).collect();

    let description = match &model.docs {
        Some(docs) => quote! {
            fn description() -> ::std::option::Option<&'static str> {
                ::std::option::Option::Some(#docs)
            }
        },
        None => quote! {},
    };

    Ok(quote! {
        impl #impl_generics ::library_core::ModelSerializer for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
            const TABLE: &'static str = #table;

            #description

            fn fields() -> &'static [::library_core::FieldSpec] {
                const FIELDS: &[::library_core::FieldSpec] = &[#(#specs),*];
                FIELDS
            }

            #[allow(clippy::unnecessary_cast)]
            fn primary_key(&self) -> i64 {
                self.#pk_ident as i64
            }
        }
    })
}

fn field_spec(field: &FieldInfo) -> TokenStream {
    let name = field.ident.to_string();
    let kind = match field.kind {
        Kind::String => quote! { ::library_core::FieldKind::String },
        Kind::Integer => quote! { ::library_core::FieldKind::Integer },
        Kind::Float => quote! { ::library_core::FieldKind::Float },
        Kind::Boolean => quote! { ::library_core::FieldKind::Boolean },
    };

    let required = !field.optional;
    let nullable = field.optional;
    let primary_key = field.primary_key;
    let read_only = field.read_only;
    let allow_blank = field.allow_blank;
    let max_length = option_usize(field.max_length);
    let min_length = option_usize(field.min_length);
    let min_value = option_f64(field.min);
    let max_value = option_f64(field.max);
    let description = match &field.docs {
        Some(docs) => quote! { ::std::option::Option::Some(#docs) },
        None => quote! { ::std::option::Option::None },
    };

    quote! {
        ::library_core::FieldSpec {
            required: #required,
            nullable: #nullable,
            read_only: #read_only,
            primary_key: #primary_key,
            allow_blank: #allow_blank,
            max_length: #max_length,
            min_length: #min_length,
            min_value: #min_value,
            max_value: #max_value,
            description: #description,
            ..::library_core::FieldSpec::new(#name, #kind)
        }
    }
}

fn option_usize(value: Option<usize>) -> TokenStream {
    match value {
        Some(n) => {
            let lit = Literal::usize_suffixed(n);
            quote! { ::std::option::Option::Some(#lit) }
        }
        None => quote! { ::std::option::Option::None },
    }
}

fn option_f64(value: Option<f64>) -> TokenStream {
    match value {
        Some(n) => {
            let lit = Literal::f64_suffixed(n.abs());
            if n.is_sign_negative() {
                quote! { ::std::option::Option::Some(-#lit) }
            } else {
                quote! { ::std::option::Option::Some(#lit) }
            }
        }
        None => quote! { ::std::option::Option::None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_expansion_mentions_every_field() {
        let input: DeriveInput = parse_quote! {
            /// A published book.
            struct Book {
                id: i64,
                #[field(max_length = 200)]
                title: String,
                #[field(min = 0, max = 9999)]
                published_year: Option<i32>,
            }
        };

        let tokens = expand_model_serializer(input).unwrap().to_string();
        assert!(tokens.contains("\"Book\""));
        assert!(tokens.contains("\"books\""));
        assert!(tokens.contains("\"published_year\""));
        assert!(tokens.contains("200usize"));
        assert!(tokens.contains("9999f64"));
        assert!(tokens.contains("as i64"));
        assert!(tokens.contains("\"A published book.\""));
    }

    #[test]
    fn test_negative_bound_literal() {
        let tokens = option_f64(Some(-2.5)).to_string();
        assert!(tokens.contains("- 2.5f64"));
    }
}
