//! Attribute and type parsing for `#[derive(ModelSerializer)]`.

use heck::ToSnakeCase;
use syn::{
    Attribute, DeriveInput, Expr, ExprLit, ExprUnary, Field, GenericArgument, Ident, Lit, LitStr,
    Meta, PathArguments, Type, UnOp,
};

/// Wire type inferred from a Rust field type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    String,
    Integer,
    Float,
    Boolean,
}

/// Parsed model-level information
pub(crate) struct ModelInfo {
    pub ident: Ident,
    pub name: String,
    pub table: String,
    pub docs: Option<String>,
    pub fields: Vec<FieldInfo>,
}

/// Parsed field information
pub(crate) struct FieldInfo {
    pub ident: Ident,
    pub kind: Kind,
    /// `Option<T>`: nullable and not required
    pub optional: bool,
    pub primary_key: bool,
    pub read_only: bool,
    pub allow_blank: bool,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub docs: Option<String>,
}

impl ModelInfo {
    pub fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let syn::Data::Struct(data) = &input.data else {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "ModelSerializer can only be derived for structs with named fields",
            ));
        };
        let syn::Fields::Named(named) = &data.fields else {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "ModelSerializer requires named fields\n\
                 \n\
                 Example:\n\
                 #[derive(ModelSerializer)]\n\
                 struct Book {\n\
                     id: i64,\n\
                     title: String,\n\
                 }",
            ));
        };

        let (name, table) = parse_serializer_attrs(&input.attrs, &input.ident)?;

        let mut fields = named
            .named
            .iter()
            .map(FieldInfo::parse)
            .collect::<syn::Result<Vec<_>>>()?;

        resolve_primary_key(&input.ident, &mut fields)?;
        check_read_only(&fields)?;

        Ok(Self {
            ident: input.ident.clone(),
            name,
            table,
            docs: extract_docs(&input.attrs),
            fields,
        })
    }

    pub fn primary_key(&self) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.primary_key)
    }
}

impl FieldInfo {
    fn parse(field: &Field) -> syn::Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;

        let (inner, optional) = match option_inner(&field.ty) {
            Some(inner) => (inner, true),
            None => (&field.ty, false),
        };
        let (kind, range) = classify(inner)?;

        let mut info = FieldInfo {
            ident,
            kind,
            optional,
            primary_key: false,
            read_only: false,
            allow_blank: false,
            max_length: None,
            min_length: None,
            min: None,
            max: None,
            docs: extract_docs(&field.attrs),
        };
        parse_field_attrs(&field.attrs, &mut info)?;
        if let Some(range) = range {
            apply_type_range(&mut info, range)?;
        }
        Ok(info)
    }
}

/// Values the Rust type can hold. Explicit bounds must lie inside it;
/// missing bounds default to it.
fn apply_type_range(info: &mut FieldInfo, (lo, hi): (f64, f64)) -> syn::Result<()> {
    for bound in [info.min, info.max].into_iter().flatten() {
        if bound < lo || bound > hi {
            return Err(syn::Error::new_spanned(
                &info.ident,
                format!("bound {bound} is outside the range of the field type ({lo}..={hi})"),
            ));
        }
    }
    info.min = info.min.or(Some(lo));
    info.max = info.max.or(Some(hi));
    Ok(())
}

/// `#[serializer(name = "...", table = "...")]`
fn parse_serializer_attrs(attrs: &[Attribute], ident: &Ident) -> syn::Result<(String, String)> {
    let mut name = None;
    let mut table = None;

    for attr in attrs {
        if !attr.path().is_ident("serializer") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                let value = value.value();
                if value.is_empty()
                    || !value
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    return Err(meta.error("table name must be non-empty and use only letters, digits or '_'"));
                }
                table = Some(value);
                Ok(())
            } else {
                Err(meta.error(
                    "unknown attribute\n\
                     \n\
                     Valid attributes: name, table\n\
                     \n\
                     Example: #[serializer(name = \"Book\", table = \"books\")]",
                ))
            }
        })?;
    }

    let name = name.unwrap_or_else(|| ident.to_string());
    let table = table.unwrap_or_else(|| format!("{}s", name.to_snake_case()));
    Ok((name, table))
}

/// `#[field(primary_key, read_only, allow_blank, max_length = 200, min = 0, max = 9999)]`
fn parse_field_attrs(attrs: &[Attribute], info: &mut FieldInfo) -> syn::Result<()> {
    for attr in attrs {
        if !attr.path().is_ident("field") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("primary_key") {
                info.primary_key = true;
            } else if meta.path.is_ident("read_only") {
                info.read_only = true;
            } else if meta.path.is_ident("allow_blank") {
                require_kind(info, Kind::String, &meta, "allow_blank")?;
                info.allow_blank = true;
            } else if meta.path.is_ident("max_length") {
                require_kind(info, Kind::String, &meta, "max_length")?;
                let lit: syn::LitInt = meta.value()?.parse()?;
                info.max_length = Some(lit.base10_parse()?);
            } else if meta.path.is_ident("min_length") {
                require_kind(info, Kind::String, &meta, "min_length")?;
                let lit: syn::LitInt = meta.value()?.parse()?;
                info.min_length = Some(lit.base10_parse()?);
            } else if meta.path.is_ident("min") {
                require_numeric(info, &meta, "min")?;
                let expr: Expr = meta.value()?.parse()?;
                info.min = Some(parse_number(&expr)?);
            } else if meta.path.is_ident("max") {
                require_numeric(info, &meta, "max")?;
                let expr: Expr = meta.value()?.parse()?;
                info.max = Some(parse_number(&expr)?);
            } else {
                return Err(meta.error(
                    "unknown attribute\n\
                     \n\
                     Valid attributes: primary_key, read_only, allow_blank, max_length, min_length, min, max\n\
                     \n\
                     Examples:\n\
                     - #[field(max_length = 200)]\n\
                     - #[field(min = 0, max = 9999)]",
                ));
            }
            Ok(())
        })?;
    }

    if let (Some(min), Some(max)) = (info.min, info.max)
        && min > max
    {
        return Err(syn::Error::new_spanned(
            &info.ident,
            format!("`min` ({min}) is greater than `max` ({max})"),
        ));
    }
    if let (Some(min), Some(max)) = (info.min_length, info.max_length)
        && min > max
    {
        return Err(syn::Error::new_spanned(
            &info.ident,
            format!("`min_length` ({min}) is greater than `max_length` ({max})"),
        ));
    }

    Ok(())
}

fn require_kind(
    info: &FieldInfo,
    kind: Kind,
    meta: &syn::meta::ParseNestedMeta<'_>,
    attr: &str,
) -> syn::Result<()> {
    if info.kind == kind {
        Ok(())
    } else {
        Err(meta.error(format!("`{attr}` only applies to String fields")))
    }
}

fn require_numeric(
    info: &FieldInfo,
    meta: &syn::meta::ParseNestedMeta<'_>,
    attr: &str,
) -> syn::Result<()> {
    match info.kind {
        Kind::Integer | Kind::Float => Ok(()),
        _ => Err(meta.error(format!("`{attr}` only applies to integer and float fields"))),
    }
}

/// Accepts `5`, `-5`, `2.5` and `-2.5`
fn parse_number(expr: &Expr) -> syn::Result<f64> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Int(lit), .. }) => lit.base10_parse::<i64>().map(|n| n as f64),
        Expr::Lit(ExprLit { lit: Lit::Float(lit), .. }) => lit.base10_parse::<f64>(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => parse_number(expr).map(|n| -n),
        other => Err(syn::Error::new_spanned(other, "expected a numeric literal")),
    }
}

/// Pick the primary key: an explicit `#[field(primary_key)]`, or else a field named `id`
fn resolve_primary_key(model: &Ident, fields: &mut [FieldInfo]) -> syn::Result<()> {
    let explicit: Vec<usize> = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.primary_key)
        .map(|(i, _)| i)
        .collect();

    let index = match explicit.as_slice() {
        [] => fields
            .iter()
            .position(|f| f.ident == "id")
            .ok_or_else(|| {
                syn::Error::new_spanned(
                    model,
                    "ModelSerializer needs a primary key\n\
                     \n\
                     Add an `id: i64` field or mark one with #[field(primary_key)]",
                )
            })?,
        [index] => *index,
        [_, second, ..] => {
            return Err(syn::Error::new_spanned(
                &fields[*second].ident,
                "only one field may be marked #[field(primary_key)]",
            ));
        }
    };

    let pk = &mut fields[index];
    if pk.kind != Kind::Integer || pk.optional {
        return Err(syn::Error::new_spanned(
            &pk.ident,
            "primary key must be a non-optional integer field",
        ));
    }
    pk.primary_key = true;
    pk.read_only = true;
    Ok(())
}

/// Read-only fields are never written, so only `Option<T>` can be decoded back
fn check_read_only(fields: &[FieldInfo]) -> syn::Result<()> {
    match fields
        .iter()
        .find(|f| f.read_only && !f.primary_key && !f.optional)
    {
        Some(field) => Err(syn::Error::new_spanned(
            &field.ident,
            "#[field(read_only)] requires an `Option<T>` field",
        )),
        None => Ok(()),
    }
}

/// `Option<T>` -> `Some(T)`
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// Wire kind of a type, plus its value range when validation must enforce one.
///
/// `i64`, `isize` and `u64`/`usize` upper bounds are left to integer parsing,
/// which already rejects anything outside `i64`.
fn classify(ty: &Type) -> syn::Result<(Kind, Option<(f64, f64)>)> {
    fn integer(lo: i64, hi: i64) -> syn::Result<(Kind, Option<(f64, f64)>)> {
        Ok((Kind::Integer, Some((lo as f64, hi as f64))))
    }

    let ident = match ty {
        Type::Path(path) if path.qself.is_none() => {
            path.path.segments.last().map(|s| s.ident.to_string())
        }
        _ => None,
    };

    match ident.as_deref() {
        Some("String") => Ok((Kind::String, None)),
        Some("i8") => integer(i8::MIN.into(), i8::MAX.into()),
        Some("i16") => integer(i16::MIN.into(), i16::MAX.into()),
        Some("i32") => integer(i32::MIN.into(), i32::MAX.into()),
        Some("u8") => integer(0, u8::MAX.into()),
        Some("u16") => integer(0, u16::MAX.into()),
        Some("u32") => integer(0, u32::MAX.into()),
        Some("i64" | "isize") => Ok((Kind::Integer, None)),
        Some("u64" | "usize") => Ok((Kind::Integer, Some((0.0, i64::MAX as f64)))),
        Some("f32") => Ok((Kind::Float, Some((f32::MIN.into(), f32::MAX.into())))),
        Some("f64") => Ok((Kind::Float, None)),
        Some("bool") => Ok((Kind::Boolean, None)),
        _ => Err(syn::Error::new_spanned(
            ty,
            "unsupported field type\n\
             \n\
             Supported: String, integer types, f32, f64, bool, and Option of any of these",
        )),
    }
}

/// Extract doc comments from attributes, joined into one line
pub(crate) fn extract_docs(attrs: &[Attribute]) -> Option<String> {
    let docs: Vec<String> = attrs
        .iter()
        .filter_map(|attr| {
            if attr.path().is_ident("doc")
                && let Meta::NameValue(meta) = &attr.meta
                && let Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) = &meta.value
            {
                let line = s.value().trim().to_string();
                return (!line.is_empty()).then_some(line);
            }
            None
        })
        .collect();

    if docs.is_empty() {
        None
    } else {
        Some(docs.join(" "))
    }
}
