//! Internal schema representation for tool arguments.
//!
//! Every schema dialect accepted by the deriver is normalized into this
//! single representation; validation, introspection, and call-schema
//! subsetting all run against it. Constructed once, immutable afterwards.

use crate::injected::{INJECTED_CALL_ID_MARKER, INJECTED_MARKER};
use caplet_core::{Error, Result};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// JSON value type a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Unconstrained; any value validates.
    Any,
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl FieldType {
    pub fn from_name(name: &str) -> Option<FieldType> {
        match name {
            "string" => Some(FieldType::String),
            "integer" => Some(FieldType::Integer),
            "number" => Some(FieldType::Number),
            "boolean" => Some(FieldType::Boolean),
            "array" => Some(FieldType::Array),
            "object" => Some(FieldType::Object),
            "null" => Some(FieldType::Null),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Any => "any",
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Null => "null",
        }
    }

    /// Strict JSON type check. Integers are accepted where numbers are
    /// expected; no cross-type coercion.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::Any => true,
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
            FieldType::Null => value.is_null(),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One derived parameter: type, requiredness, description, and the
/// injection flags evaluated once at derivation time.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub nullable: bool,
    pub required: bool,
    pub description: Option<String>,
    /// Supplied by the runtime, never by the external invoker.
    pub injected: bool,
    /// Receives the invocation id when the call arrives as an envelope.
    pub injects_call_id: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            required: false,
            description: None,
            injected: false,
            injects_call_id: false,
        }
    }
}

/// Ordered, introspectable input description for a tool. Field order
/// follows declaration order and is stable across derivations.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSchema {
    name: String,
    description: Option<String>,
    fields: Vec<FieldSpec>,
}

impl InputSchema {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        fields: Vec<FieldSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            fields,
        }
    }

    /// Schema of an explicit no-argument tool.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, None, Vec::new())
    }

    pub fn builder(name: impl Into<String>) -> InputSchemaBuilder {
        InputSchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields that receive the invocation id at runtime.
    pub fn call_id_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.injects_call_id)
    }

    /// Copy with every injected field removed: the invoker-facing shape.
    pub fn without_injected(&self) -> InputSchema {
        InputSchema {
            name: self.name.clone(),
            description: self.description.clone(),
            fields: self
                .fields
                .iter()
                .filter(|field| !field.injected && !field.injects_call_id)
                .cloned()
                .collect(),
        }
    }

    /// Validates an argument object against this schema: unknown fields
    /// are forbidden, required fields must be present, and every present
    /// value must match its field type.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<Map<String, Value>> {
        for key in args.keys() {
            if self.field(key).is_none() {
                return Err(Error::validation(format!(
                    "unexpected field `{key}` for `{}`",
                    self.name
                )));
            }
        }

        for spec in &self.fields {
            match args.get(&spec.name) {
                None => {
                    if spec.required {
                        return Err(Error::validation(format!(
                            "missing required field `{}` for `{}`",
                            spec.name, self.name
                        )));
                    }
                }
                Some(Value::Null) if spec.nullable || spec.ty == FieldType::Null => {}
                Some(value) => {
                    if !spec.ty.matches(value) {
                        return Err(Error::validation(format!(
                            "field `{}` expects {}, got {}",
                            spec.name,
                            spec.ty.name(),
                            json_type_name(value)
                        )));
                    }
                }
            }
        }

        Ok(args.clone())
    }

    /// Renders the schema as a JSON Schema object document. Injection
    /// markers are retained so a rendered schema re-derives identically.
    pub fn to_value(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for spec in &self.fields {
            let mut property = Map::new();
            match (spec.ty, spec.nullable) {
                (FieldType::Any, _) => {}
                (ty, false) => {
                    property.insert("type".to_string(), json!(ty.name()));
                }
                (ty, true) => {
                    property.insert("type".to_string(), json!([ty.name(), "null"]));
                }
            }
            if let Some(description) = &spec.description {
                property.insert("description".to_string(), json!(description));
            }
            if spec.injected {
                property.insert(INJECTED_MARKER.to_string(), json!(true));
            }
            if spec.injects_call_id {
                property.insert(INJECTED_CALL_ID_MARKER.to_string(), json!(true));
            }
            if spec.required {
                required.push(Value::String(spec.name.clone()));
            }
            properties.insert(spec.name.clone(), Value::Object(property));
        }

        let mut document = Map::new();
        document.insert("title".to_string(), json!(self.name));
        if let Some(description) = &self.description {
            document.insert("description".to_string(), json!(description));
        }
        document.insert("type".to_string(), json!("object"));
        document.insert("properties".to_string(), Value::Object(properties));
        document.insert("required".to_string(), Value::Array(required));
        document.insert("additionalProperties".to_string(), json!(false));
        Value::Object(document)
    }
}

/// Builder for hand-assembled schemas
#[derive(Debug, Clone)]
pub struct InputSchemaBuilder {
    name: String,
    description: Option<String>,
    fields: Vec<FieldSpec>,
}

impl InputSchemaBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn property(
        mut self,
        name: impl Into<String>,
        ty: FieldType,
        description: impl Into<String>,
    ) -> Self {
        let mut spec = FieldSpec::new(name, ty);
        spec.description = Some(description.into());
        self.fields.push(spec);
        self
    }

    pub fn required(mut self, name: &str) -> Self {
        if let Some(spec) = self.fields.iter_mut().find(|spec| spec.name == name) {
            spec.required = true;
        }
        self
    }

    pub fn injected(mut self, name: &str) -> Self {
        if let Some(spec) = self.fields.iter_mut().find(|spec| spec.name == name) {
            spec.injected = true;
        }
        self
    }

    pub fn injects_call_id(mut self, name: &str) -> Self {
        if let Some(spec) = self.fields.iter_mut().find(|spec| spec.name == name) {
            spec.injects_call_id = true;
        }
        self
    }

    pub fn build(self) -> InputSchema {
        InputSchema::new(self.name, self.description, self.fields)
    }
}

/// Schema attached to a tool: derived and introspectable, or an opaque
/// externally-defined document treated as passthrough.
#[derive(Debug, Clone)]
pub enum ArgsSchema {
    Derived(Arc<InputSchema>),
    Raw(Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point_schema() -> InputSchema {
        InputSchema::builder("point")
            .property("x", FieldType::Number, "Horizontal coordinate")
            .property("y", FieldType::Number, "Vertical coordinate")
            .property("label", FieldType::String, "Optional label")
            .required("x")
            .required("y")
            .build()
    }

    #[test]
    fn test_validate_accepts_complete_args() {
        let schema = point_schema();
        let args = json!({"x": 1.5, "y": 2, "label": "origin"});
        let validated = schema.validate(args.as_object().unwrap()).unwrap();
        assert_eq!(validated.len(), 3);
    }

    #[test]
    fn test_validate_rejects_unknown_field() {
        let schema = point_schema();
        let args = json!({"x": 1, "y": 2, "z": 3});
        let error = schema.validate(args.as_object().unwrap()).unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_missing_required() {
        let schema = point_schema();
        let args = json!({"x": 1});
        let error = schema.validate(args.as_object().unwrap()).unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
        assert!(error.to_string().contains("`y`"));
    }

    #[test]
    fn test_validate_rejects_type_mismatch() {
        let schema = point_schema();
        let args = json!({"x": "one", "y": 2});
        let error = schema.validate(args.as_object().unwrap()).unwrap_err();
        assert!(error.to_string().contains("expects number"));
    }

    #[test]
    fn test_integer_accepted_for_number_field() {
        let schema = point_schema();
        let args = json!({"x": 1, "y": 2});
        assert!(schema.validate(args.as_object().unwrap()).is_ok());
    }

    #[test]
    fn test_without_injected_strips_marked_fields() {
        let schema = InputSchema::builder("lookup")
            .property("query", FieldType::String, "Search query")
            .property("state", FieldType::Object, "Runtime state")
            .property("call_id", FieldType::String, "Originating call")
            .required("query")
            .injected("state")
            .injects_call_id("call_id")
            .build();

        let visible = schema.without_injected();
        assert_eq!(visible.len(), 1);
        assert!(visible.field("query").is_some());
    }

    #[test]
    fn test_to_value_renders_object_document() {
        let schema = point_schema();
        let value = schema.to_value();
        assert_eq!(value["type"], "object");
        assert_eq!(value["properties"]["x"]["type"], "number");
        assert_eq!(value["required"], json!(["x", "y"]));
        assert_eq!(value["additionalProperties"], json!(false));
    }
}
