use crate::context::RunConfig;
use crate::error::Result;
use crate::message::{ToolInput, ToolOutput};
use async_trait::async_trait;
use serde_json::Value;

/// Tool trait - a named, described, schema-validated capability exposed
/// to an external invoker such as a language model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of the tool
    fn name(&self) -> &str;

    /// Returns guidance text telling the model how and when to use it
    fn description(&self) -> &str;

    /// Full input schema, injected fields included. This is the schema
    /// validation runs against.
    fn input_schema(&self) -> Value;

    /// Invoker-facing schema with injected fields removed: exactly what
    /// the model must supply.
    fn call_schema(&self) -> Value;

    /// Hint that the tool's output should be returned to the user
    /// directly instead of being fed back to the model. Not enforced
    /// here.
    fn return_direct(&self) -> bool {
        false
    }

    /// Invokes the tool. Tools without an async implementation run
    /// their blocking implementation on a worker thread.
    async fn invoke(&self, input: ToolInput, config: Option<RunConfig>) -> Result<ToolOutput>;

    /// Invokes the tool on the calling thread. Fails for tools that
    /// only provide an async implementation.
    fn invoke_blocking(&self, input: ToolInput, config: Option<RunConfig>) -> Result<ToolOutput>;
}
