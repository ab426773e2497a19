//! Schema derivation: from typed argument structs or raw schema
//! documents to the internal [`InputSchema`] representation.

use crate::dialect::detect_dialect;
use crate::docstring::DocComment;
use crate::injected::{is_call_id_property, is_injected_property};
use crate::reflect::resolve_object_fields;
use crate::schema::{FieldSpec, FieldType, InputSchema};
use caplet_core::{Error, Result};
use schemars::JsonSchema;
use serde_json::Value;

/// Parameter names always stripped from derived schemas: the execution
/// context handles a tool implementation may declare but the external
/// invoker never supplies.
pub const FILTERED_ARGS: [&str; 2] = ["run_context", "callbacks"];

/// Options controlling a derivation.
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Additional parameter names to strip, on top of [`FILTERED_ARGS`].
    pub filter_args: Option<Vec<String>>,
    /// Keep fields tagged injected. True for the validation-facing
    /// schema; the call schema is produced by stripping them later.
    pub include_injected: bool,
    /// Parsed doc comment supplying fallback per-field descriptions.
    pub doc: Option<DocComment>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            filter_args: None,
            include_injected: true,
            doc: None,
        }
    }
}

/// Derives an input schema from a typed argument struct.
///
/// # Example
/// ```
/// use caplet_tool::{schema_from_type, SchemaOptions};
/// use schemars::JsonSchema;
///
/// #[derive(JsonSchema)]
/// struct SearchArgs {
///     /// Search query
///     query: String,
///     limit: Option<u32>,
/// }
///
/// let schema = schema_from_type::<SearchArgs>("search", &SchemaOptions::default()).unwrap();
/// assert_eq!(schema.len(), 2);
/// assert!(schema.field("query").unwrap().required);
/// assert!(!schema.field("limit").unwrap().required);
/// ```
pub fn schema_from_type<T: JsonSchema>(name: &str, options: &SchemaOptions) -> Result<InputSchema> {
    let root = schemars::schema_for!(T);
    let document = serde_json::to_value(root)?;
    schema_from_document(name, &document, options)
}

/// Derives an input schema from a schema document in either supported
/// dialect. Field order follows the document's declaration order; the
/// same document and options always derive the same schema.
pub fn schema_from_document(
    name: &str,
    document: &Value,
    options: &SchemaOptions,
) -> Result<InputSchema> {
    let dialect = detect_dialect(document)?;
    let resolved = resolve_object_fields(document, dialect)?;

    // Every documented parameter must exist in the argument list,
    // including filtered and injected ones
    if let Some(comment) = &options.doc {
        for (documented, _) in &comment.args {
            if !resolved.iter().any(|field| &field.name == documented) {
                return Err(Error::config(format!(
                    "documented parameter `{documented}` is not part of `{name}`'s arguments"
                )));
            }
        }
    }

    let mut filtered: Vec<String> = FILTERED_ARGS.iter().map(ToString::to_string).collect();
    if let Some(extra) = &options.filter_args {
        filtered.extend(extra.iter().cloned());
    }

    let mut fields = Vec::new();
    for field in resolved {
        if filtered.iter().any(|name| name == &field.name) {
            continue;
        }

        let injected = is_injected_property(&field.schema);
        let injects_call_id = is_call_id_property(&field.schema);
        if (injected || injects_call_id) && !options.include_injected {
            continue;
        }

        let (ty, nullable) = field_type_of(&field.schema);
        let description = field
            .schema
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                options
                    .doc
                    .as_ref()
                    .and_then(|comment| comment.arg_description(&field.name))
                    .map(str::to_string)
            });

        fields.push(FieldSpec {
            name: field.name,
            ty,
            nullable,
            required: field.required,
            description,
            injected,
            injects_call_id,
        });
    }

    let description = document
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            options
                .doc
                .as_ref()
                .map(|comment| comment.description.clone())
                .filter(|text| !text.is_empty())
        });

    Ok(InputSchema::new(name, description, fields))
}

fn field_type_of(property: &Value) -> (FieldType, bool) {
    match property.get("type") {
        Some(Value::String(single)) => (
            FieldType::from_name(single).unwrap_or(FieldType::Any),
            false,
        ),
        Some(Value::Array(entries)) => {
            let names: Vec<&str> = entries.iter().filter_map(Value::as_str).collect();
            let nullable = names.contains(&"null");
            let non_null: Vec<&str> = names.into_iter().filter(|name| *name != "null").collect();
            match non_null.as_slice() {
                [single] => (FieldType::from_name(single).unwrap_or(FieldType::Any), nullable),
                _ => (FieldType::Any, nullable),
            }
        }
        _ => (FieldType::Any, false),
    }
}
