//! Span creation helpers for tool invocations

use crate::attributes::*;

/// Attributes for tracing a tool invocation
#[derive(Debug, Clone)]
pub struct ToolSpanAttributes {
    pub tool_name: String,
    pub tool_description: String,
    pub tool_call_id: String,
    pub run_id: String,
    pub args_json: String,
    pub response_json: String,
}

/// Create and record an OpenTelemetry span for a tool invocation.
///
/// Records the tool identity, call id, run id, argument payload, and the
/// shaped response. The span follows OpenTelemetry semantic conventions
/// for generative AI tool execution.
pub fn trace_tool_call(attrs: ToolSpanAttributes) {
    let span = tracing::info_span!(
        "invoke_tool",
        { GEN_AI_OPERATION_NAME } = "execute_tool",
        { GEN_AI_SYSTEM } = SYSTEM_NAME,
        { GEN_AI_TOOL_NAME } = %attrs.tool_name,
        { GEN_AI_TOOL_DESCRIPTION } = %attrs.tool_description,
        { GEN_AI_TOOL_CALL_ID } = %attrs.tool_call_id,
        { CAPLET_RUN_ID } = %attrs.run_id,
        { CAPLET_TOOL_CALL_ARGS } = %attrs.args_json,
        { CAPLET_TOOL_RESPONSE } = %attrs.response_json,
    );

    // Enter and immediately exit the span (it's recorded)
    let _guard = span.enter();
}

/// Helper to safely serialize to JSON string
pub fn safe_serialize<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "<not serializable>".to_string())
}
