use crate::injected::InjectedToolCallId;
use crate::structured::StructuredTool;
use caplet_core::{Result, ToolReturn};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize, JsonSchema)]
struct EchoParams {
    /// Message to echo back
    message: String,
    /// Identifier of the originating tool call
    call_id: InjectedToolCallId,
}

/// Creates an echo tool for testing purposes.
///
/// Declares an injected tool-call-id parameter, so it must be invoked
/// with a full tool-call envelope.
pub fn create_echo_tool() -> Result<StructuredTool> {
    StructuredTool::builder()
        .name("echo")
        .description("Echoes back the provided message. Useful for testing tool execution.")
        .args::<EchoParams>()
        .invoke_with(|ctx, args| {
            let params: EchoParams = serde_json::from_value(args)?;

            tracing::debug!(
                run_id = %ctx.run_id(),
                tool_call_id = %params.call_id.as_str(),
                message = %params.message,
                "Echo tool called"
            );

            Ok(ToolReturn::Value(serde_json::json!({
                "message": params.message,
                "toolCallId": params.call_id.as_str(),
            })))
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use caplet_core::{Error, Tool, ToolCall, ToolInput};
    use serde_json::json;

    #[tokio::test]
    async fn test_echo_tool_with_envelope() {
        let tool = create_echo_tool().unwrap();

        assert_eq!(tool.name(), "echo");

        let call = ToolCall::new("echo", json!({"message": "Hello, World!"})).with_id("call-123");
        let output = tool.invoke(ToolInput::Call(call), None).await.unwrap();

        let message = output.message().unwrap();
        let content: Value =
            serde_json::from_str(message.content.as_text().expect("text content")).unwrap();
        assert_eq!(content["message"], "Hello, World!");
        assert_eq!(content["toolCallId"], "call-123");
    }

    #[tokio::test]
    async fn test_echo_tool_requires_envelope() {
        let tool = create_echo_tool().unwrap();

        let args = json!({"message": "no envelope"});
        let error = tool
            .invoke(ToolInput::Args(args.as_object().unwrap().clone()), None)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }
}
