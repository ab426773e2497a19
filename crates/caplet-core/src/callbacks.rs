use crate::error::Error;
use crate::message::ToolOutput;
use std::sync::Arc;

/// Identity of a tool as presented to a notification sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

/// Notification sink for the tool execution lifecycle.
///
/// For every invocation, `on_tool_start` fires before argument
/// resolution, then exactly one of `on_tool_end` (success or recovered
/// error) or `on_tool_error` (fatal fault) fires.
pub trait ToolCallbacks: Send + Sync {
    fn on_tool_start(&self, _tool: &ToolDescriptor, _input: &str, _run_id: &str) {}

    fn on_tool_end(&self, _output: &ToolOutput, _run_id: &str) {}

    fn on_tool_error(&self, _error: &Error, _run_id: &str) {}

    /// Child-scope handle propagated to nested executions.
    fn child(&self) -> Option<Arc<dyn ToolCallbacks>> {
        None
    }
}

/// Sink that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolCallbacks;

impl ToolCallbacks for NoopToolCallbacks {}
