//! Marker types for runtime-injected tool arguments.
//!
//! A field whose type is wrapped in one of these markers is supplied by
//! the execution environment, never by the external invoker. The marker
//! surfaces in the generated schema as an `x-injected` extension, is read
//! once at derivation time, and is cached on the resulting field spec.
//! The invoker-facing call schema omits the field entirely.

use schemars::r#gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extension key marking a runtime-injected property.
pub const INJECTED_MARKER: &str = "x-injected";

/// Extension key marking the property that receives the invocation id.
pub const INJECTED_CALL_ID_MARKER: &str = "x-injected-call-id";

/// Wrapper marking an argument as injected by the runtime.
///
/// ```
/// use caplet_tool::Injected;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct Params {
///     query: String,
///     state: Injected<String>,
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Injected<T>(pub T);

impl<T> Injected<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Injected<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: JsonSchema> JsonSchema for Injected<T> {
    fn schema_name() -> String {
        format!("Injected_{}", T::schema_name())
    }

    fn is_referenceable() -> bool {
        // The marker must stay at the property site
        false
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        let mut schema = generator.subschema_for::<T>().into_object();
        schema
            .extensions
            .insert(INJECTED_MARKER.to_string(), Value::Bool(true));
        Schema::Object(schema)
    }
}

/// Wrapper marking the argument that receives the invocation id.
///
/// A tool declaring a field of this type can only be invoked with a full
/// tool-call envelope; the id is injected under the field's name when the
/// model did not supply it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InjectedToolCallId(pub String);

impl InjectedToolCallId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for InjectedToolCallId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl JsonSchema for InjectedToolCallId {
    fn schema_name() -> String {
        "InjectedToolCallId".to_string()
    }

    fn is_referenceable() -> bool {
        false
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        let mut schema = SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            ..Default::default()
        };
        schema
            .extensions
            .insert(INJECTED_MARKER.to_string(), Value::Bool(true));
        schema
            .extensions
            .insert(INJECTED_CALL_ID_MARKER.to_string(), Value::Bool(true));
        Schema::Object(schema)
    }
}

/// Whether a property schema carries the injected marker.
pub fn is_injected_property(property: &Value) -> bool {
    property
        .get(INJECTED_MARKER)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Whether a property schema receives the invocation id.
pub fn is_call_id_property(property: &Value) -> bool {
    property
        .get(INJECTED_CALL_ID_MARKER)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_schema_carries_marker() {
        let root = schemars::schema_for!(Injected<String>);
        let value = serde_json::to_value(root).unwrap();
        assert_eq!(value[INJECTED_MARKER], Value::Bool(true));
        assert_eq!(value["type"], "string");
    }

    #[test]
    fn test_call_id_schema_carries_both_markers() {
        let root = schemars::schema_for!(InjectedToolCallId);
        let value = serde_json::to_value(root).unwrap();
        assert!(is_injected_property(&value));
        assert!(is_call_id_property(&value));
    }

    #[test]
    fn test_transparent_deserialization() {
        let id: InjectedToolCallId = serde_json::from_value(Value::String("abc".into())).unwrap();
        assert_eq!(id.as_str(), "abc");

        let wrapped: Injected<u32> = serde_json::from_value(serde_json::json!(7)).unwrap();
        assert_eq!(wrapped.into_inner(), 7);
    }
}
