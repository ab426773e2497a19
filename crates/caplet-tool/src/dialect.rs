//! Schema-document dialect detection.
//!
//! Two mutually exclusive JSON Schema families are supported: draft-07
//! (definitions under `definitions`, refs under `#/definitions/`) and
//! draft 2019-09/2020-12 (`$defs`, `#/$defs/`). The dialect is decided
//! once per document; a document mixing both families is rejected before
//! any derivation happens, and downstream code only ever sees the
//! normalized representation.

use caplet_core::{Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDialect {
    Draft07,
    Draft2020,
}

impl SchemaDialect {
    pub fn definitions_key(&self) -> &'static str {
        match self {
            SchemaDialect::Draft07 => "definitions",
            SchemaDialect::Draft2020 => "$defs",
        }
    }

    pub fn ref_prefix(&self) -> &'static str {
        match self {
            SchemaDialect::Draft07 => "#/definitions/",
            SchemaDialect::Draft2020 => "#/$defs/",
        }
    }
}

impl std::fmt::Display for SchemaDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaDialect::Draft07 => write!(f, "draft-07"),
            SchemaDialect::Draft2020 => write!(f, "draft 2020-12"),
        }
    }
}

/// Decides which dialect a schema document uses.
///
/// The decision considers the `$schema` URI, which definitions container
/// is present, and which family every `$ref` in the document points
/// into. Any disagreement between those signals is a configuration
/// error, never silently resolved. Documents with no distinguishing
/// feature default to draft-07 (the dialect our own generator emits).
pub fn detect_dialect(document: &Value) -> Result<SchemaDialect> {
    let root = document
        .as_object()
        .ok_or_else(|| Error::config("schema document must be a JSON object"))?;

    let declared = root
        .get("$schema")
        .and_then(Value::as_str)
        .and_then(|uri| {
            if uri.contains("draft-07") {
                Some(SchemaDialect::Draft07)
            } else if uri.contains("2019-09") || uri.contains("2020-12") {
                Some(SchemaDialect::Draft2020)
            } else {
                None
            }
        });

    let mut uses_draft07 = root.contains_key("definitions");
    let mut uses_draft2020 = root.contains_key("$defs");
    scan_ref_families(document, &mut uses_draft07, &mut uses_draft2020);

    let used = match (uses_draft07, uses_draft2020) {
        (true, true) => {
            return Err(Error::config(
                "schema document mixes draft-07 and draft 2020-12 dialects",
            ));
        }
        (true, false) => Some(SchemaDialect::Draft07),
        (false, true) => Some(SchemaDialect::Draft2020),
        (false, false) => None,
    };

    match (declared, used) {
        (Some(declared), Some(used)) if declared != used => Err(Error::config(format!(
            "schema document declares {declared} but uses {used} constructs"
        ))),
        (_, Some(used)) => Ok(used),
        (Some(declared), None) => Ok(declared),
        (None, None) => Ok(SchemaDialect::Draft07),
    }
}

fn scan_ref_families(value: &Value, uses_draft07: &mut bool, uses_draft2020: &mut bool) {
    match value {
        Value::Object(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                if reference.starts_with("#/definitions/") {
                    *uses_draft07 = true;
                }
                if reference.starts_with("#/$defs/") {
                    *uses_draft2020 = true;
                }
            }
            for nested in map.values() {
                scan_ref_families(nested, uses_draft07, uses_draft2020);
            }
        }
        Value::Array(items) => {
            for nested in items {
                scan_ref_families(nested, uses_draft07, uses_draft2020);
            }
        }
        _ => {}
    }
}
