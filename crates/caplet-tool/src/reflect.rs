//! Schema reflection: resolving references and composition.
//!
//! Pure, stateless helpers that flatten a schema document into its
//! effective field list: `$ref` chains are chased through the dialect's
//! definitions container, `allOf` composition (how generators render
//! inherited and flattened types) is merged, and the `anyOf`-with-null
//! pattern of optional values is collapsed into a nullable field.
//! Unresolvable references degrade to an unconstrained field rather than
//! erroring; reference cycles are cut at the point of recursion.

use crate::dialect::SchemaDialect;
use caplet_core::{Error, Result};
use serde_json::{Map, Value};

/// A fully-resolved object property.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub name: String,
    pub schema: Value,
    pub required: bool,
}

/// Resolves a schema document into its ordered list of object fields.
pub fn resolve_object_fields(
    document: &Value,
    dialect: SchemaDialect,
) -> Result<Vec<ResolvedField>> {
    let definitions = document
        .get(dialect.definitions_key())
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut seen = Vec::new();
    let root = resolve_schema(document, &definitions, dialect, &mut seen);
    let root = root
        .as_object()
        .ok_or_else(|| Error::config("schema document must describe an object"))?;

    let required: Vec<&str> = root
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut fields = Vec::new();
    if let Some(properties) = root.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            let mut seen = Vec::new();
            let schema = resolve_schema(property, &definitions, dialect, &mut seen);
            fields.push(ResolvedField {
                name: name.clone(),
                schema,
                required: required.contains(&name.as_str()),
            });
        }
    }
    Ok(fields)
}

/// Resolves one schema node into a flat object: referenced definitions
/// first, then `allOf` branches, then the node's own keys (which win).
fn resolve_schema(
    schema: &Value,
    definitions: &Map<String, Value>,
    dialect: SchemaDialect,
    seen: &mut Vec<String>,
) -> Value {
    let Some(node) = schema.as_object() else {
        // Boolean schemas and malformed nodes resolve to unconstrained
        return Value::Object(Map::new());
    };

    let mut merged = Map::new();

    if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
        if let Some(target_name) = reference.strip_prefix(dialect.ref_prefix()) {
            let cycle = seen.iter().any(|name| name == target_name);
            if !cycle {
                if let Some(target) = definitions.get(target_name) {
                    seen.push(target_name.to_string());
                    let resolved = resolve_schema(target, definitions, dialect, seen);
                    seen.pop();
                    merge_schema(&mut merged, resolved);
                }
                // Dangling reference: the field stays unconstrained
            }
        }
    }

    if let Some(branches) = node.get("allOf").and_then(Value::as_array) {
        for branch in branches {
            let resolved = resolve_schema(branch, definitions, dialect, seen);
            merge_schema(&mut merged, resolved);
        }
    }

    if let Some(branches) = node.get("anyOf").and_then(Value::as_array) {
        let mut non_null = Vec::new();
        let mut saw_null = false;
        for branch in branches {
            let resolved = resolve_schema(branch, definitions, dialect, seen);
            if resolved.get("type").and_then(Value::as_str) == Some("null") {
                saw_null = true;
            } else {
                non_null.push(resolved);
            }
        }
        // Only the optional-value pattern collapses; anything broader
        // stays unconstrained
        if non_null.len() == 1 {
            let mut only = non_null.remove(0);
            if saw_null {
                if let Some(obj) = only.as_object_mut() {
                    make_nullable(obj);
                }
            }
            merge_schema(&mut merged, only);
        }
    }

    for (key, value) in node {
        match key.as_str() {
            "$ref" | "allOf" | "anyOf" => {}
            "properties" => merge_properties(&mut merged, value),
            "required" => merge_required(&mut merged, value),
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }

    Value::Object(merged)
}

fn merge_schema(into: &mut Map<String, Value>, from: Value) {
    let Value::Object(from) = from else { return };
    for (key, value) in from {
        if key == "properties" {
            merge_properties(into, &value);
        } else if key == "required" {
            merge_required(into, &value);
        } else {
            into.insert(key, value);
        }
    }
}

fn merge_properties(into: &mut Map<String, Value>, value: &Value) {
    let Some(incoming) = value.as_object() else {
        return;
    };
    let properties = into
        .entry("properties".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(existing) = properties.as_object_mut() {
        for (name, property) in incoming {
            existing.insert(name.clone(), property.clone());
        }
    }
}

fn merge_required(into: &mut Map<String, Value>, value: &Value) {
    let Some(incoming) = value.as_array() else {
        return;
    };
    let required = into
        .entry("required".to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Some(existing) = required.as_array_mut() {
        for name in incoming {
            if !existing.contains(name) {
                existing.push(name.clone());
            }
        }
    }
}

fn make_nullable(schema: &mut Map<String, Value>) {
    let null = Value::String("null".to_string());
    let widened = match schema.get("type") {
        Some(Value::String(single)) => Some(Value::Array(vec![
            Value::String(single.clone()),
            null,
        ])),
        Some(Value::Array(types)) if !types.contains(&null) => {
            let mut types = types.clone();
            types.push(null);
            Some(Value::Array(types))
        }
        // Already nullable, or no type constraint at all
        _ => None,
    };
    if let Some(widened) = widened {
        schema.insert("type".to_string(), widened);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolves_ref_through_definitions() {
        let document = json!({
            "type": "object",
            "properties": {"who": {"$ref": "#/definitions/Name"}},
            "required": ["who"],
            "definitions": {"Name": {"type": "string", "description": "A name"}}
        });
        let fields = resolve_object_fields(&document, SchemaDialect::Draft07).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].schema["type"], "string");
        assert_eq!(fields[0].schema["description"], "A name");
        assert!(fields[0].required);
    }

    #[test]
    fn test_surface_keys_override_ref_target() {
        let document = json!({
            "type": "object",
            "properties": {
                "who": {"$ref": "#/definitions/Name", "description": "Overridden"}
            },
            "definitions": {"Name": {"type": "string", "description": "A name"}}
        });
        let fields = resolve_object_fields(&document, SchemaDialect::Draft07).unwrap();
        assert_eq!(fields[0].schema["description"], "Overridden");
    }

    #[test]
    fn test_all_of_unions_properties_and_required() {
        let document = json!({
            "allOf": [
                {"$ref": "#/$defs/Base"},
                {
                    "type": "object",
                    "properties": {"extra": {"type": "integer"}},
                    "required": ["extra"]
                }
            ],
            "$defs": {
                "Base": {
                    "type": "object",
                    "properties": {"id": {"type": "string"}},
                    "required": ["id"]
                }
            }
        });
        let fields = resolve_object_fields(&document, SchemaDialect::Draft2020).unwrap();
        let names: Vec<&str> = fields.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, vec!["id", "extra"]);
        assert!(fields.iter().all(|field| field.required));
    }

    #[test]
    fn test_dangling_ref_degrades_to_unconstrained() {
        let document = json!({
            "type": "object",
            "properties": {"ghost": {"$ref": "#/definitions/Missing"}}
        });
        let fields = resolve_object_fields(&document, SchemaDialect::Draft07).unwrap();
        assert!(fields[0].schema.get("type").is_none());
    }

    #[test]
    fn test_reference_cycle_is_cut() {
        let document = json!({
            "type": "object",
            "properties": {"node": {"$ref": "#/definitions/Node"}},
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": {"next": {"$ref": "#/definitions/Node"}}
                }
            }
        });
        let fields = resolve_object_fields(&document, SchemaDialect::Draft07).unwrap();
        assert_eq!(fields[0].schema["type"], "object");
    }

    #[test]
    fn test_any_of_null_collapses_to_nullable() {
        let document = json!({
            "type": "object",
            "properties": {
                "maybe": {"anyOf": [{"$ref": "#/definitions/Name"}, {"type": "null"}]}
            },
            "definitions": {"Name": {"type": "string"}}
        });
        let fields = resolve_object_fields(&document, SchemaDialect::Draft07).unwrap();
        assert_eq!(fields[0].schema["type"], json!(["string", "null"]));
    }
}
