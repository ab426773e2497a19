//! Invocation input normalization.

use caplet_core::{stringify, Error, Result, ToolInput};
use serde_json::{Map, Value};

/// Input after envelope extraction: the free-form text or argument
/// object that argument resolution consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedArgs {
    Text(String),
    Args(Map<String, Value>),
}

impl PreparedArgs {
    /// Human-readable rendering for logging and start notifications.
    pub fn display(&self) -> String {
        match self {
            PreparedArgs::Text(text) => text.clone(),
            PreparedArgs::Args(args) => stringify(&Value::Object(args.clone())),
        }
    }
}

/// Extracts the argument payload and invocation id from an input.
///
/// Envelope arguments are copied, so injecting values downstream never
/// mutates the caller's [`ToolCall`](caplet_core::ToolCall).
pub fn prepare(input: ToolInput) -> Result<(PreparedArgs, Option<String>)> {
    match input {
        ToolInput::Text(text) => Ok((PreparedArgs::Text(text), None)),
        ToolInput::Args(args) => Ok((PreparedArgs::Args(args), None)),
        ToolInput::Call(call) => {
            let args = call
                .args
                .as_object()
                .cloned()
                .ok_or_else(|| Error::validation("tool call arguments must be a JSON object"))?;
            Ok((PreparedArgs::Args(args), call.id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caplet_core::ToolCall;
    use serde_json::json;

    #[test]
    fn test_envelope_yields_args_and_id() {
        let call = ToolCall::new("echo", json!({"message": "hi"})).with_id("call-1");
        let (parsed, call_id) = prepare(ToolInput::Call(call)).unwrap();
        assert_eq!(call_id.as_deref(), Some("call-1"));
        assert_eq!(
            parsed,
            PreparedArgs::Args(json!({"message": "hi"}).as_object().unwrap().clone())
        );
    }

    #[test]
    fn test_envelope_args_are_copied() {
        let call = ToolCall::new("echo", json!({"message": "hi"})).with_id("call-1");
        let original = call.clone();
        let (parsed, _) = prepare(ToolInput::Call(call.clone())).unwrap();

        if let PreparedArgs::Args(mut args) = parsed {
            args.insert("injected".to_string(), json!("later"));
        }
        assert_eq!(call, original, "caller's envelope must stay untouched");
    }

    #[test]
    fn test_non_object_envelope_args_rejected() {
        let call = ToolCall::new("echo", json!("not an object"));
        let error = prepare(ToolInput::Call(call)).unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
    }

    #[test]
    fn test_text_input_has_no_id() {
        let (parsed, call_id) = prepare(ToolInput::from("2 + 2")).unwrap();
        assert_eq!(parsed, PreparedArgs::Text("2 + 2".to_string()));
        assert!(call_id.is_none());
    }
}
