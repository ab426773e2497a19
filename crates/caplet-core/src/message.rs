use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content block tags accepted without re-serialization when shaping
/// tool output for a model-facing message.
pub const TOOL_MESSAGE_BLOCK_TYPES: [&str; 5] =
    ["text", "image_url", "image", "json", "search_result"];

/// ToolCall is the invocation envelope produced by the model: the tool
/// name, an argument object, and an optional call identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Terminal status carried by a [`ToolMessage`]. Recovered errors are
/// shaped exactly like successes and distinguished only by this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// Renderer-friendly message content: plain text, or a list of content
/// blocks (strings or objects carrying a recognized `type` tag).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<Value>),
}

impl MessageContent {
    /// A block is a bare string or an object whose `type` tag is one of
    /// [`TOOL_MESSAGE_BLOCK_TYPES`].
    pub fn is_valid_block(value: &Value) -> bool {
        match value {
            Value::String(_) => true,
            Value::Object(obj) => obj
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|tag| TOOL_MESSAGE_BLOCK_TYPES.contains(&tag)),
            _ => false,
        }
    }

    pub fn is_valid_content(value: &Value) -> bool {
        match value {
            Value::String(_) => true,
            Value::Array(items) => items.iter().all(Self::is_valid_block),
            _ => false,
        }
    }

    /// Coerces an arbitrary tool result into message content. Valid
    /// shapes pass through; anything else is serialized to JSON text.
    pub fn coerce(value: Value) -> MessageContent {
        match value {
            Value::String(text) => MessageContent::Text(text),
            Value::Array(items) if items.iter().all(Self::is_valid_block) => {
                MessageContent::Blocks(items)
            }
            other => MessageContent::Text(stringify(&other)),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            MessageContent::Blocks(_) => None,
        }
    }
}

/// Serializes a value to compact JSON, falling back to its display
/// rendering when serialization fails.
pub fn stringify(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// ToolMessage is the result envelope handed back to the model runtime.
/// Constructed once per invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolMessage {
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Value>,
    pub status: ToolStatus,
    pub name: String,
    pub tool_call_id: String,
}

impl ToolMessage {
    pub fn new(
        content: MessageContent,
        name: impl Into<String>,
        tool_call_id: impl Into<String>,
    ) -> Self {
        Self {
            content,
            artifact: None,
            status: ToolStatus::Success,
            name: name.into(),
            tool_call_id: tool_call_id.into(),
        }
    }

    pub fn with_artifact(mut self, artifact: Value) -> Self {
        self.artifact = Some(artifact);
        self
    }

    pub fn with_status(mut self, status: ToolStatus) -> Self {
        self.status = status;
        self
    }
}

/// What a tool callable produces: a plain JSON value, or an
/// already-shaped [`ToolMessage`] that is exempt from output wrapping.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolReturn {
    Value(Value),
    Message(ToolMessage),
}

impl From<Value> for ToolReturn {
    fn from(value: Value) -> Self {
        ToolReturn::Value(value)
    }
}

impl From<ToolMessage> for ToolReturn {
    fn from(message: ToolMessage) -> Self {
        ToolReturn::Message(message)
    }
}

/// What an invocation returns: a shaped message envelope, or the raw
/// result when no invocation id was supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Message(ToolMessage),
    Raw(Value),
}

impl ToolOutput {
    pub fn message(&self) -> Option<&ToolMessage> {
        match self {
            ToolOutput::Message(message) => Some(message),
            ToolOutput::Raw(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&Value> {
        match self {
            ToolOutput::Raw(value) => Some(value),
            ToolOutput::Message(_) => None,
        }
    }
}

/// The three input shapes an invocation may arrive in.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    /// Free-form text bound to the schema's sole field.
    Text(String),
    /// A mapping of argument name to value.
    Args(Map<String, Value>),
    /// A full invocation envelope.
    Call(ToolCall),
}

impl From<&str> for ToolInput {
    fn from(text: &str) -> Self {
        ToolInput::Text(text.to_string())
    }
}

impl From<String> for ToolInput {
    fn from(text: String) -> Self {
        ToolInput::Text(text)
    }
}

impl From<Map<String, Value>> for ToolInput {
    fn from(args: Map<String, Value>) -> Self {
        ToolInput::Args(args)
    }
}

impl From<ToolCall> for ToolInput {
    fn from(call: ToolCall) -> Self {
        ToolInput::Call(call)
    }
}
