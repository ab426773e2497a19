//! Quickstart: define a typed tool, invoke it with a tool-call envelope,
//! and inspect the shaped result.
//!
//! Run with: cargo run --example quickstart

use caplet_core::{Tool, ToolCall, ToolInput};
use caplet_tool::{InjectedToolCallId, StructuredTool, ToolReturn};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, JsonSchema)]
struct GreetParams {
    /// Name of the person to greet
    name: String,
    /// Language code for the greeting
    language: Option<String>,
    /// Originating call id, supplied by the runtime
    call_id: InjectedToolCallId,
}

fn create_greet_tool() -> caplet_core::Result<StructuredTool> {
    StructuredTool::builder()
        .name("greet")
        .description("Greets a person by name, optionally in a given language.")
        .args::<GreetParams>()
        .invoke_with(|_ctx, args| {
            let params: GreetParams = serde_json::from_value(args)?;
            let greeting = match params.language.as_deref() {
                Some("fr") => "Bonjour",
                Some("de") => "Hallo",
                _ => "Hello",
            };
            Ok(ToolReturn::Value(json!({
                "greeting": format!("{greeting}, {}!", params.name),
                "callId": params.call_id.as_str(),
            })))
        })
        .build()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    caplet_telemetry::init_telemetry();

    let tool = create_greet_tool()?;

    // The schema the model sees: injected fields are stripped
    println!(
        "call schema: {}",
        serde_json::to_string_pretty(&tool.call_schema())?
    );

    // Invoke with a full tool-call envelope; the id is injected into the
    // declared call_id parameter
    let call = ToolCall::new("greet", json!({"name": "Ada", "language": "fr"})).with_id("call-1");
    let output = tool.invoke(ToolInput::Call(call), None).await?;

    if let Some(message) = output.message() {
        println!("status: {:?}", message.status);
        println!("content: {}", message.content.as_text().unwrap_or(""));
    }

    Ok(())
}
