//! # Caplet Telemetry
//!
//! OpenTelemetry integration for tool invocation tracing.
//!
//! This crate provides span helpers for tool executions using OpenTelemetry
//! semantic conventions for generative AI, plus a tracer bootstrap that wires
//! the OpenTelemetry layer into the `tracing` subscriber stack.

mod spans;
mod tracer;

pub use spans::{safe_serialize, trace_tool_call, ToolSpanAttributes};
pub use tracer::{init_telemetry, register_span_processor, tracer_provider};

/// Span attribute constants for tool invocation observability.
///
/// Tool-level names follow OpenTelemetry semantic conventions for
/// generative AI; run-level names live under the `caplet.` namespace.
pub mod attributes {
    // Generic AI attributes
    pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";
    pub const GEN_AI_SYSTEM: &str = "gen_ai.system";

    // Tool-specific attributes
    pub const GEN_AI_TOOL_NAME: &str = "gen_ai.tool.name";
    pub const GEN_AI_TOOL_DESCRIPTION: &str = "gen_ai.tool.description";
    pub const GEN_AI_TOOL_CALL_ID: &str = "gen_ai.tool.call.id";

    // Caplet run attributes
    pub const CAPLET_RUN_ID: &str = "caplet.run_id";
    pub const CAPLET_TOOL_CALL_ARGS: &str = "caplet.tool_call_args";
    pub const CAPLET_TOOL_RESPONSE: &str = "caplet.tool_response";

    // System name constant
    pub const SYSTEM_NAME: &str = "caplet";
}
