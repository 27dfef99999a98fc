use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::{Attribute, Data, DeriveInput, Fields, Meta, Token, Type, parse_macro_input};

/// Helper enum for parsed attribute values
enum MetaValue {
    Str(syn::LitStr),
    Expr(syn::Expr),
    Flag,
}

/// Defines a configuration struct and implements `envbind::EnvSchema` for it
///
/// Fields are bound with `#[env(...)]`:
/// - `key = "VAR"`: variable name, defaults to the field name
/// - `doc = "..."`: description used in generated docs
/// - `default = expr`: fallback when no source has a value
/// - `optional`: missing values are not an error (implied by `Option<T>`)
/// - `optional_if = |env: &EnvTree| ...`: decide optionality from the loaded values
/// - `choices = [..]`, `pattern = "regex"`: string constraints
/// - `min = expr`, `max = expr`: inclusive numeric bounds
/// - `nested`: the field is another `define_env!` struct
///
/// The value kind follows the field type: `String`, `bool` or a primitive
/// number, optionally wrapped in `Option`. Fields without `#[env]` keep their
/// `Default` value. Property paths use the Rust field names; a field renamed
/// for serde is reported as a diagnostic when loading.
#[proc_macro]
pub fn define_env(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_env(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_env(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let vis = &input.vis;
    let struct_attrs = &input.attrs;
    let type_name = struct_name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "define_env! does not support generic structs",
        ));
    }

    // Extract fields from the struct
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "define_env! only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "define_env! only supports structs",
            ));
        }
    };

    let mut field_defs = Vec::new();
    let mut schema_steps = Vec::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let field_vis = &field.vis;
        let field_type = &field.ty;

        // Everything but our own attribute is passed through
        let kept_attrs: Vec<&Attribute> = field
            .attrs
            .iter()
            .filter(|attr| !attr.path().is_ident("env"))
            .collect();
        field_defs.push(quote! {
            #(#kept_attrs)*
            #field_vis #field_name: #field_type
        });

        let Some(env_attr) = field.attrs.iter().find(|attr| attr.path().is_ident("env")) else {
            continue;
        };
        let config = parse_field_config(env_attr)?;

        // Extract cfg attributes for feature gating
        let cfg_attrs: Vec<&Attribute> = field
            .attrs
            .iter()
            .filter(|attr| attr.path().is_ident("cfg"))
            .collect();

        let property = field_name.to_string();
        let property = property.trim_start_matches("r#");
        let step = schema_step(field, property, &config)?;
        schema_steps.push(quote! {
            #(#cfg_attrs)*
            let schema = schema #step;
        });
    }

    let struct_def = quote! {
        #(#struct_attrs)*
        #vis struct #struct_name {
            #(#field_defs),*
        }
    };

    let schema_impl = quote! {
        impl ::envbind::EnvSchema for #struct_name {
            fn schema() -> ::envbind::Schema {
                let schema = ::envbind::Schema::new(#type_name);
                #(#schema_steps)*
                schema
            }
        }
    };

    Ok(quote! {
        #struct_def
        #schema_impl
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    String,
    Number,
    Boolean,
}

#[derive(Default)]
struct FieldConfig {
    key: Option<syn::LitStr>,
    doc: Option<syn::LitStr>,
    pattern: Option<syn::LitStr>,
    default: Option<syn::Expr>,
    choices: Option<syn::Expr>,
    min: Option<syn::Expr>,
    max: Option<syn::Expr>,
    optional_if: Option<syn::Expr>,
    optional: bool,
    nested: bool,
}

/// Builds the `.string(..)`/`.number(..)`/`.boolean(..)`/`.object(..)` call for one field
fn schema_step(
    field: &syn::Field,
    property: &str,
    config: &FieldConfig,
) -> syn::Result<proc_macro2::TokenStream> {
    let field_type = &field.ty;

    if config.nested {
        if config.key.is_some()
            || config.default.is_some()
            || config.choices.is_some()
            || config.pattern.is_some()
            || config.min.is_some()
            || config.max.is_some()
            || config.optional_if.is_some()
        {
            return Err(syn::Error::new_spanned(
                field,
                "nested fields only take `nested` (and `doc`)",
            ));
        }
        return Ok(quote! {
            .object(#property, <#field_type as ::envbind::EnvSchema>::schema())
        });
    }

    let (is_option, inner_type) = extract_option_type(field_type);
    let kind = infer_kind(inner_type).ok_or_else(|| {
        syn::Error::new_spanned(
            field_type,
            "cannot bind this type: use String, bool or a primitive number (optionally in Option<T>), or mark the field `nested`",
        )
    })?;

    let mut chain = Vec::new();
    if let Some(key) = &config.key {
        chain.push(quote! { .key(#key) });
    }
    if let Some(doc) = &config.doc {
        let doc = doc.value().trim().to_string();
        chain.push(quote! { .doc(#doc) });
    }
    if config.optional || is_option {
        chain.push(quote! { .optional() });
    }
    if let Some(condition) = &config.optional_if {
        chain.push(quote! { .optional_if(#condition) });
    }

    let misplaced = |what: &str| {
        syn::Error::new_spanned(field, format!("`{}` does not apply to {:?} fields", what, kind))
    };

    if kind != Kind::String {
        if config.choices.is_some() {
            return Err(misplaced("choices"));
        }
        if config.pattern.is_some() {
            return Err(misplaced("pattern"));
        }
    }
    if kind != Kind::Number {
        if config.min.is_some() {
            return Err(misplaced("min"));
        }
        if config.max.is_some() {
            return Err(misplaced("max"));
        }
    }

    let (method, prop) = match kind {
        Kind::String => {
            if let Some(default) = &config.default {
                chain.push(quote! { .default_with(|| ::std::string::String::from(#default)) });
            }
            if let Some(choices) = &config.choices {
                chain.push(quote! { .choices(#choices) });
            }
            if let Some(pattern) = &config.pattern {
                chain.push(quote! { .pattern(#pattern) });
            }
            (quote! { string }, quote! { ::envbind::StringProp::new() })
        }
        Kind::Number => {
            if let Some(default) = &config.default {
                chain.push(quote! { .default_with(|| (#default) as f64) });
            }
            if let Some(min) = &config.min {
                chain.push(quote! { .min((#min) as f64) });
            }
            if let Some(max) = &config.max {
                chain.push(quote! { .max((#max) as f64) });
            }
            (quote! { number }, quote! { ::envbind::NumberProp::new() })
        }
        Kind::Boolean => {
            if let Some(default) = &config.default {
                chain.push(quote! { .default_with(|| #default) });
            }
            (quote! { boolean }, quote! { ::envbind::BooleanProp::new() })
        }
    };

    Ok(quote! {
        .#method(#property, #prop #(#chain)*)
    })
}

/// Parse #[env(key = "X", doc = "Y", default = val, optional)] syntax
fn parse_field_list(meta_list: &syn::MetaList) -> syn::Result<HashMap<String, MetaValue>> {
    let mut values = HashMap::new();

    meta_list.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?
            .to_string();

        if meta.input.peek(Token![=]) {
            meta.input.parse::<Token![=]>()?;

            if key == "key" || key == "doc" || key == "pattern" {
                let value: syn::LitStr = meta.input.parse()?;
                values.insert(key, MetaValue::Str(value));
            } else {
                let expr: syn::Expr = meta.input.parse()?;
                values.insert(key, MetaValue::Expr(expr));
            }
        } else {
            values.insert(key, MetaValue::Flag);
        }

        Ok(())
    })?;

    Ok(values)
}

fn parse_field_config(attr: &Attribute) -> syn::Result<FieldConfig> {
    let parsed = match &attr.meta {
        Meta::List(list) => parse_field_list(list)?,
        Meta::Path(_) => HashMap::new(),
        Meta::NameValue(_) => {
            return Err(syn::Error::new_spanned(
                attr,
                "env attribute must be a list: #[env(key = \"...\", ...)]",
            ));
        }
    };

    let mut config = FieldConfig::default();
    for (name, value) in parsed {
        match (name.as_str(), value) {
            ("key", MetaValue::Str(s)) => config.key = Some(s),
            ("doc", MetaValue::Str(s)) => config.doc = Some(s),
            ("pattern", MetaValue::Str(s)) => config.pattern = Some(s),
            ("default", MetaValue::Expr(e)) => config.default = Some(e),
            ("choices", MetaValue::Expr(e)) => config.choices = Some(e),
            ("min", MetaValue::Expr(e)) => config.min = Some(e),
            ("max", MetaValue::Expr(e)) => config.max = Some(e),
            ("optional_if", MetaValue::Expr(e)) => config.optional_if = Some(e),
            ("optional", MetaValue::Flag) => config.optional = true,
            ("nested", MetaValue::Flag) => config.nested = true,
            (other, _) => {
                return Err(syn::Error::new_spanned(
                    attr,
                    format!("unknown or malformed env option `{}`", other),
                ));
            }
        }
    }

    Ok(config)
}

/// Map a field type onto the value kind it is parsed as
fn infer_kind(ty: &Type) -> Option<Kind> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let ident = type_path.path.segments.last()?.ident.to_string();
    match ident.as_str() {
        "String" => Some(Kind::String),
        "bool" => Some(Kind::Boolean),
        "u8" | "u16" | "u32" | "u64" | "u128" | "usize" | "i8" | "i16" | "i32" | "i64"
        | "i128" | "isize" | "f32" | "f64" => Some(Kind::Number),
        _ => None,
    }
}

/// Extract the inner type from Option<T>, returns (is_option, inner_type)
fn extract_option_type(ty: &Type) -> (bool, &Type) {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
        && segment.ident == "Option"
        && let syn::PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(syn::GenericArgument::Type(inner_ty)) = args.args.first()
    {
        return (true, inner_ty);
    }
    (false, ty)
}
