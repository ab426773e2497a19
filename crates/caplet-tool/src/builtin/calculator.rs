use crate::structured::{ErrorHandling, StructuredTool};
use caplet_core::{Error, Result, ToolReturn};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize, JsonSchema)]
struct CalculatorParams {
    /// Mathematical expression to evaluate (e.g., '2 + 2', '10 * 5')
    expression: String,
}

/// Creates a calculator tool that evaluates mathematical expressions.
///
/// Single-field schema, so it also accepts free-form text input. An
/// unevaluable expression is a declared tool error and is reported back
/// as an observation rather than propagated.
pub fn create_calculator_tool() -> Result<StructuredTool> {
    StructuredTool::builder()
        .name("calculator")
        .description(
            "Evaluates mathematical expressions. Supports +, -, *, /, parentheses, and numbers.",
        )
        .args::<CalculatorParams>()
        .handle_tool_error(ErrorHandling::Report)
        .invoke_with(|ctx, args| {
            let expression = match args {
                // Free-form text input arrives as the bare string
                Value::String(text) => text,
                other => serde_json::from_value::<CalculatorParams>(other)?.expression,
            };

            tracing::debug!(
                run_id = %ctx.run_id(),
                expression = %expression,
                "Calculating expression"
            );

            let result = evaluate_expression(&expression)?;

            Ok(ToolReturn::Value(serde_json::json!({
                "result": result,
                "expression": expression
            })))
        })
        .build()
}

/// Simple expression evaluator
/// Supports: +, -, *, /, parentheses, and numbers
fn evaluate_expression(expression: &str) -> Result<f64> {
    let expression = expression.trim().replace(" ", "");

    meval::eval_str(&expression)
        .map_err(|error| Error::tool(format!("failed to evaluate expression: {error}")))
}
