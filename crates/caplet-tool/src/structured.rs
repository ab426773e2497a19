//! The structured tool invoker.
//!
//! [`StructuredTool`] wraps one callable (blocking, async, or both) plus
//! its derived or supplied schema into an invocable unit: input is
//! normalized and validated, runtime-only values are injected, the
//! callable runs inside a scoped execution context, and the result is
//! shaped into a uniform output envelope. Validation failures and
//! declared tool errors are recoverable per configured policy; every
//! other fault propagates after a single error notification.

use crate::context::RunContext;
use crate::derive::{schema_from_document, schema_from_type, SchemaOptions};
use crate::docstring::parse_doc_comment;
use crate::input::{prepare, PreparedArgs};
use crate::schema::{ArgsSchema, InputSchema};
use async_trait::async_trait;
use caplet_core::{
    Error, MessageContent, Result, RunConfig, Tool, ToolCallbacks, ToolContext, ToolDescriptor,
    ToolInput, ToolMessage, ToolOutput, ToolReturn, ToolStatus,
};
use caplet_telemetry::{safe_serialize, trace_tool_call, ToolSpanAttributes};
use schemars::JsonSchema;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for the blocking execution function
pub type SyncToolFn =
    Arc<dyn Fn(Arc<dyn ToolContext>, Value) -> Result<ToolReturn> + Send + Sync>;

/// Type alias for the async execution function
pub type AsyncToolFn = Arc<
    dyn Fn(Arc<dyn ToolContext>, Value) -> Pin<Box<dyn Future<Output = Result<ToolReturn>> + Send>>
        + Send
        + Sync,
>;

/// How the callable's return value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// The return value is the message content.
    #[default]
    Content,
    /// The return value is a two-element `[content, artifact]` array.
    ContentAndArtifact,
}

/// Recovery policy for one recoverable error kind.
#[derive(Clone, Default)]
pub enum ErrorHandling {
    /// Propagate the error to the caller.
    #[default]
    Propagate,
    /// Substitute the error kind's default message.
    Report,
    /// Substitute a fixed message.
    Message(String),
    /// Substitute a message computed from the error.
    Handler(Arc<dyn Fn(&Error) -> String + Send + Sync>),
}

impl ErrorHandling {
    fn recovers(&self) -> bool {
        !matches!(self, ErrorHandling::Propagate)
    }

    fn substitute(&self, error: &Error, default: String) -> String {
        match self {
            ErrorHandling::Propagate | ErrorHandling::Report => default,
            ErrorHandling::Message(text) => text.clone(),
            ErrorHandling::Handler(handler) => handler(error),
        }
    }
}

impl std::fmt::Debug for ErrorHandling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorHandling::Propagate => write!(f, "Propagate"),
            ErrorHandling::Report => write!(f, "Report"),
            ErrorHandling::Message(text) => f.debug_tuple("Message").field(text).finish(),
            ErrorHandling::Handler(_) => write!(f, "Handler(..)"),
        }
    }
}

/// A schema-validated tool built from a callable.
pub struct StructuredTool {
    name: String,
    description: String,
    args_schema: ArgsSchema,
    return_direct: bool,
    response_format: ResponseFormat,
    handle_tool_error: ErrorHandling,
    handle_validation_error: ErrorHandling,
    callbacks: Option<Arc<dyn ToolCallbacks>>,
    tags: Vec<String>,
    metadata: HashMap<String, Value>,
    sync_fn: Option<SyncToolFn>,
    async_fn: Option<AsyncToolFn>,
}

impl std::fmt::Debug for StructuredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuredTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("args_schema", &self.args_schema)
            .field("return_direct", &self.return_direct)
            .field("response_format", &self.response_format)
            .field("handle_tool_error", &self.handle_tool_error)
            .field("handle_validation_error", &self.handle_validation_error)
            .field("has_sync_fn", &self.sync_fn.is_some())
            .field("has_async_fn", &self.async_fn.is_some())
            .finish()
    }
}

impl StructuredTool {
    pub fn builder() -> StructuredToolBuilder {
        StructuredToolBuilder::new()
    }

    pub fn args_schema(&self) -> &ArgsSchema {
        &self.args_schema
    }

    /// Whether the invoker-facing schema has exactly one field.
    pub fn is_single_input(&self) -> bool {
        match &self.args_schema {
            ArgsSchema::Derived(schema) => schema.len() == 1,
            ArgsSchema::Raw(_) => false,
        }
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    /// Resolves prepared input into the value handed to the callable.
    fn resolve_args(&self, parsed: PreparedArgs, call_id: Option<&str>) -> Result<Value> {
        let schema = match &self.args_schema {
            ArgsSchema::Raw(_) => {
                return match parsed {
                    // String input is only legal for introspectable
                    // single-field schemas
                    PreparedArgs::Text(_) => Err(Error::config(format!(
                        "tool `{}` uses an opaque args schema; free-form text input is not allowed",
                        self.name
                    ))),
                    PreparedArgs::Args(args) => Ok(Value::Object(args)),
                };
            }
            ArgsSchema::Derived(schema) => schema,
        };

        // Explicit no-argument tool: every input shape resolves to no
        // arguments
        if schema.is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        match parsed {
            PreparedArgs::Text(text) => {
                let first = match schema.fields().first() {
                    Some(spec) => spec,
                    None => return Ok(Value::Object(Map::new())),
                };
                let mut probe = Map::new();
                probe.insert(first.name.clone(), Value::String(text.clone()));
                schema.validate(&probe)?;
                // The callable's single positional argument
                Ok(Value::String(text))
            }
            PreparedArgs::Args(mut args) => {
                for spec in schema.call_id_fields() {
                    if !args.contains_key(&spec.name) {
                        let id = call_id.ok_or_else(|| {
                            Error::config(format!(
                                "tool `{}` declares injected tool-call-id parameter `{}`; \
                                 it must be invoked with a full tool-call envelope carrying an id",
                                self.name, spec.name
                            ))
                        })?;
                        args.insert(spec.name.clone(), Value::String(id.to_string()));
                    }
                }
                let validated = schema.validate(&args)?;
                Ok(Value::Object(validated))
            }
        }
    }

    /// Applies the response format to the callable's return value.
    fn shape_response(&self, response: ToolReturn) -> Result<(ToolReturn, Option<Value>)> {
        match self.response_format {
            ResponseFormat::Content => Ok((response, None)),
            ResponseFormat::ContentAndArtifact => match response {
                ToolReturn::Value(Value::Array(mut pair)) if pair.len() == 2 => {
                    let artifact = pair.pop().unwrap_or(Value::Null);
                    let content = pair.pop().unwrap_or(Value::Null);
                    Ok((ToolReturn::Value(content), Some(artifact)))
                }
                other => Err(Error::tool_failed(
                    &self.name,
                    anyhow::anyhow!(
                        "response_format is 'content_and_artifact' so a two-element \
                         [content, artifact] array is expected, got {}",
                        describe_return(&other)
                    ),
                )),
            },
        }
    }

    fn run_context(
        &self,
        call_id: Option<&str>,
        run_id: &str,
        config: &RunConfig,
        callbacks: Option<&Arc<dyn ToolCallbacks>>,
    ) -> Arc<dyn ToolContext> {
        let child = config.child(callbacks.and_then(|sink| sink.child()));
        Arc::new(RunContext::new(
            call_id.map(str::to_string),
            run_id.to_string(),
            child,
        ))
    }

    async fn execute(
        &self,
        parsed: PreparedArgs,
        call_id: Option<&str>,
        run_id: &str,
        config: &RunConfig,
        callbacks: Option<&Arc<dyn ToolCallbacks>>,
    ) -> Result<(ToolReturn, Option<Value>)> {
        let args = self.resolve_args(parsed, call_id)?;
        let ctx = self.run_context(call_id, run_id, config, callbacks);

        let response = if let Some(run) = &self.async_fn {
            run(ctx, args).await?
        } else if let Some(run) = &self.sync_fn {
            // Off-load the blocking implementation so the scheduler is
            // never blocked
            let run = Arc::clone(run);
            let tool = self.name.clone();
            tokio::task::spawn_blocking(move || run(ctx, args))
                .await
                .map_err(|join_error| {
                    Error::tool_failed(tool, anyhow::anyhow!("worker thread failed: {join_error}"))
                })??
        } else {
            return Err(Error::config(format!(
                "tool `{}` has no execution function",
                self.name
            )));
        };

        self.shape_response(response)
    }

    fn execute_blocking(
        &self,
        parsed: PreparedArgs,
        call_id: Option<&str>,
        run_id: &str,
        config: &RunConfig,
        callbacks: Option<&Arc<dyn ToolCallbacks>>,
    ) -> Result<(ToolReturn, Option<Value>)> {
        let args = self.resolve_args(parsed, call_id)?;
        let run = self.sync_fn.as_ref().ok_or_else(|| {
            Error::config(format!(
                "tool `{}` has no blocking implementation; use `invoke`",
                self.name
            ))
        })?;
        let ctx = self.run_context(call_id, run_id, config, callbacks);
        let response = run(ctx, args)?;
        self.shape_response(response)
    }

    /// Terminal handling shared by both entry points: policy-based
    /// recovery, output formatting, and the end/error notification.
    fn finish(
        &self,
        outcome: Result<(ToolReturn, Option<Value>)>,
        call_id: Option<String>,
        callbacks: Option<&Arc<dyn ToolCallbacks>>,
        run_id: &str,
        args_display: &str,
    ) -> Result<ToolOutput> {
        let (content, artifact, status) = match outcome {
            Ok((content, artifact)) => (content, artifact, ToolStatus::Success),
            Err(error @ Error::Validation(_)) if self.handle_validation_error.recovers() => {
                let text = self
                    .handle_validation_error
                    .substitute(&error, "Tool input validation error".to_string());
                (
                    ToolReturn::Value(Value::String(text)),
                    None,
                    ToolStatus::Error,
                )
            }
            Err(error @ Error::Tool(_)) if self.handle_tool_error.recovers() => {
                let default = match &error {
                    Error::Tool(message) => message.clone(),
                    _ => "Tool execution error".to_string(),
                };
                let text = self.handle_tool_error.substitute(&error, default);
                (
                    ToolReturn::Value(Value::String(text)),
                    None,
                    ToolStatus::Error,
                )
            }
            Err(error) => {
                if let Some(sink) = callbacks {
                    sink.on_tool_error(&error, run_id);
                }
                tracing::debug!(
                    tool = %self.name,
                    run_id = %run_id,
                    error = %error,
                    "Tool invocation failed"
                );
                return Err(error);
            }
        };

        let output = format_output(content, artifact, call_id.clone(), &self.name, status);

        trace_tool_call(ToolSpanAttributes {
            tool_name: self.name.clone(),
            tool_description: self.description.clone(),
            tool_call_id: call_id.unwrap_or_default(),
            run_id: run_id.to_string(),
            args_json: args_display.to_string(),
            response_json: safe_serialize(&output),
        });

        if let Some(sink) = callbacks {
            sink.on_tool_end(&output, run_id);
        }
        Ok(output)
    }

    /// Effective configuration for one invocation: call-level settings
    /// merged with the tool's own tags, metadata, and callback sink.
    fn effective_config(&self, config: Option<RunConfig>) -> (RunConfig, String) {
        let mut config = RunConfig::ensure(config);
        config.tags.extend(self.tags.iter().cloned());
        for (key, value) in &self.metadata {
            config
                .metadata
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        if config.callbacks.is_none() {
            config.callbacks = self.callbacks.clone();
        }
        let run_id = config.take_run_id().to_string();
        (config, run_id)
    }
}

#[async_trait]
impl Tool for StructuredTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        match &self.args_schema {
            ArgsSchema::Derived(schema) => schema.to_value(),
            ArgsSchema::Raw(document) => document.clone(),
        }
    }

    fn call_schema(&self) -> Value {
        match &self.args_schema {
            ArgsSchema::Derived(schema) => {
                let mut document = schema.without_injected().to_value();
                if let Some(root) = document.as_object_mut() {
                    root.insert("description".to_string(), Value::String(self.description.clone()));
                }
                document
            }
            // Opaque schemas pass through with the tool description
            // merged in
            ArgsSchema::Raw(document) => {
                let mut document = document.clone();
                if let Some(root) = document.as_object_mut() {
                    if !self.description.is_empty() {
                        root.insert(
                            "description".to_string(),
                            Value::String(self.description.clone()),
                        );
                    }
                }
                document
            }
        }
    }

    fn return_direct(&self) -> bool {
        self.return_direct
    }

    async fn invoke(&self, input: ToolInput, config: Option<RunConfig>) -> Result<ToolOutput> {
        let (config, run_id) = self.effective_config(config);
        let callbacks = config.callbacks.clone();
        let (parsed, call_id) = prepare(input)?;
        let rendered = parsed.display();

        tracing::debug!(tool = %self.name, run_id = %run_id, input = %rendered, "Invoking tool");
        if let Some(sink) = &callbacks {
            sink.on_tool_start(&self.descriptor(), &rendered, &run_id);
        }

        let outcome = self
            .execute(parsed, call_id.as_deref(), &run_id, &config, callbacks.as_ref())
            .await;
        self.finish(outcome, call_id, callbacks.as_ref(), &run_id, &rendered)
    }

    fn invoke_blocking(&self, input: ToolInput, config: Option<RunConfig>) -> Result<ToolOutput> {
        let (config, run_id) = self.effective_config(config);
        let callbacks = config.callbacks.clone();
        let (parsed, call_id) = prepare(input)?;
        let rendered = parsed.display();

        tracing::debug!(tool = %self.name, run_id = %run_id, input = %rendered, "Invoking tool");
        if let Some(sink) = &callbacks {
            sink.on_tool_start(&self.descriptor(), &rendered, &run_id);
        }

        let outcome =
            self.execute_blocking(parsed, call_id.as_deref(), &run_id, &config, callbacks.as_ref());
        self.finish(outcome, call_id, callbacks.as_ref(), &run_id, &rendered)
    }
}

/// Shapes terminal content into the invocation output.
///
/// An already-rich message passes through unchanged, as does any result
/// when no invocation id is present; everything else is coerced into a
/// [`ToolMessage`] carrying the artifact, status, tool name and id.
fn format_output(
    content: ToolReturn,
    artifact: Option<Value>,
    call_id: Option<String>,
    name: &str,
    status: ToolStatus,
) -> ToolOutput {
    match (content, call_id) {
        (ToolReturn::Message(message), _) => ToolOutput::Message(message),
        (ToolReturn::Value(value), None) => ToolOutput::Raw(value),
        (ToolReturn::Value(value), Some(id)) => {
            let mut message = ToolMessage::new(MessageContent::coerce(value), name, id)
                .with_status(status);
            message.artifact = artifact;
            ToolOutput::Message(message)
        }
    }
}

fn describe_return(value: &ToolReturn) -> String {
    match value {
        ToolReturn::Message(_) => "a tool message".to_string(),
        ToolReturn::Value(Value::Array(items)) => format!("an array of {} elements", items.len()),
        ToolReturn::Value(Value::Null) => "null".to_string(),
        ToolReturn::Value(Value::Bool(_)) => "a boolean".to_string(),
        ToolReturn::Value(Value::Number(_)) => "a number".to_string(),
        ToolReturn::Value(Value::String(_)) => "a string".to_string(),
        ToolReturn::Value(Value::Object(_)) => "an object".to_string(),
    }
}

type SchemaThunk = Box<dyn FnOnce(&str, &SchemaOptions) -> Result<InputSchema> + Send>;

enum SchemaSource {
    Derive(SchemaThunk),
    Document(Value),
    Schema(InputSchema),
    Raw(Value),
}

/// Builder for StructuredTool
pub struct StructuredToolBuilder {
    name: Option<String>,
    description: Option<String>,
    schema: Option<SchemaSource>,
    doc: Option<String>,
    parse_doc: bool,
    strict_doc: bool,
    filter_args: Option<Vec<String>>,
    return_direct: bool,
    response_format: ResponseFormat,
    handle_tool_error: ErrorHandling,
    handle_validation_error: ErrorHandling,
    callbacks: Option<Arc<dyn ToolCallbacks>>,
    callback_manager: Option<Arc<dyn ToolCallbacks>>,
    tags: Vec<String>,
    metadata: HashMap<String, Value>,
    sync_fn: Option<SyncToolFn>,
    async_fn: Option<AsyncToolFn>,
}

impl StructuredToolBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            description: None,
            schema: None,
            doc: None,
            parse_doc: false,
            strict_doc: false,
            filter_args: None,
            return_direct: false,
            response_format: ResponseFormat::Content,
            handle_tool_error: ErrorHandling::Propagate,
            handle_validation_error: ErrorHandling::Propagate,
            callbacks: None,
            callback_manager: None,
            tags: Vec::new(),
            metadata: HashMap::new(),
            sync_fn: None,
            async_fn: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Derives the args schema from a typed argument struct.
    pub fn args<T: JsonSchema>(mut self) -> Self {
        self.schema = Some(SchemaSource::Derive(Box::new(|name, options| {
            schema_from_type::<T>(name, options)
        })));
        self
    }

    /// Derives the args schema from a schema document in either
    /// supported dialect.
    pub fn args_document(mut self, document: Value) -> Self {
        self.schema = Some(SchemaSource::Document(document));
        self
    }

    /// Uses an already-built input schema.
    pub fn input_schema(mut self, schema: InputSchema) -> Self {
        self.schema = Some(SchemaSource::Schema(schema));
        self
    }

    /// Attaches an opaque externally-defined schema document. It is
    /// passed to the invoker verbatim and never introspected; argument
    /// objects bypass validation.
    pub fn raw_schema(mut self, document: Value) -> Self {
        self.schema = Some(SchemaSource::Raw(document));
        self
    }

    /// Documentation block for the tool; see
    /// [`parse_doc`](Self::parse_doc).
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Parse the doc block for the tool description and per-argument
    /// descriptions. `strict` escalates malformed entries to errors.
    pub fn parse_doc(mut self, strict: bool) -> Self {
        self.parse_doc = true;
        self.strict_doc = strict;
        self
    }

    /// Additional parameter names to strip from the derived schema.
    pub fn filter_args(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.filter_args = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn return_direct(mut self, return_direct: bool) -> Self {
        self.return_direct = return_direct;
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    pub fn handle_tool_error(mut self, policy: ErrorHandling) -> Self {
        self.handle_tool_error = policy;
        self
    }

    pub fn handle_validation_error(mut self, policy: ErrorHandling) -> Self {
        self.handle_validation_error = policy;
        self
    }

    pub fn callbacks(mut self, callbacks: Arc<dyn ToolCallbacks>) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    #[deprecated(note = "use `callbacks` instead")]
    pub fn callback_manager(mut self, callbacks: Arc<dyn ToolCallbacks>) -> Self {
        self.callback_manager = Some(callbacks);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Blocking implementation.
    pub fn invoke_with<F>(mut self, run: F) -> Self
    where
        F: Fn(Arc<dyn ToolContext>, Value) -> Result<ToolReturn> + Send + Sync + 'static,
    {
        self.sync_fn = Some(Arc::new(run));
        self
    }

    /// Async implementation. Preferred by `invoke` when both are set.
    pub fn invoke_async<F, Fut>(mut self, run: F) -> Self
    where
        F: Fn(Arc<dyn ToolContext>, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolReturn>> + Send + 'static,
    {
        self.async_fn = Some(Arc::new(move |ctx, args| Box::pin(run(ctx, args))));
        self
    }

    pub fn build(self) -> Result<StructuredTool> {
        let name = self
            .name
            .ok_or_else(|| Error::config("tool name is required"))?;

        if self.sync_fn.is_none() && self.async_fn.is_none() {
            return Err(Error::config(format!(
                "tool `{name}` needs at least one execution function"
            )));
        }

        let doc_comment = match (&self.doc, self.parse_doc) {
            (Some(text), true) => Some(parse_doc_comment(text, self.strict_doc)?),
            _ => None,
        };

        let description = match self.description {
            Some(description) => description,
            None => doc_comment
                .as_ref()
                .map(|comment| comment.description.clone())
                .filter(|text| !text.is_empty())
                .ok_or_else(|| Error::config(format!("tool `{name}` needs a description")))?,
        };

        let options = SchemaOptions {
            filter_args: self.filter_args,
            include_injected: true,
            doc: doc_comment,
        };

        let args_schema = match self.schema {
            Some(SchemaSource::Derive(derive)) => {
                ArgsSchema::Derived(Arc::new(derive(&name, &options)?))
            }
            Some(SchemaSource::Document(document)) => {
                ArgsSchema::Derived(Arc::new(schema_from_document(&name, &document, &options)?))
            }
            Some(SchemaSource::Schema(schema)) => ArgsSchema::Derived(Arc::new(schema)),
            Some(SchemaSource::Raw(document)) => {
                if !document.is_object() {
                    return Err(Error::config(format!(
                        "tool `{name}`: raw args schema must be a JSON object document"
                    )));
                }
                ArgsSchema::Raw(document)
            }
            None => ArgsSchema::Derived(Arc::new(InputSchema::empty(&name))),
        };

        // One-time migration of the deprecated alias
        let callbacks = match (self.callbacks, self.callback_manager) {
            (Some(callbacks), _) => Some(callbacks),
            (None, Some(callbacks)) => {
                tracing::warn!("callback_manager is deprecated; use callbacks instead");
                Some(callbacks)
            }
            (None, None) => None,
        };

        Ok(StructuredTool {
            name,
            description,
            args_schema,
            return_direct: self.return_direct,
            response_format: self.response_format,
            handle_tool_error: self.handle_tool_error,
            handle_validation_error: self.handle_validation_error,
            callbacks,
            tags: self.tags,
            metadata: self.metadata,
            sync_fn: self.sync_fn,
            async_fn: self.async_fn,
        })
    }
}

impl Default for StructuredToolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use serde_json::json;

    fn adder() -> StructuredTool {
        StructuredTool::builder()
            .name("add")
            .description("Adds two numbers")
            .input_schema(
                InputSchema::builder("add")
                    .property("x", FieldType::Number, "First addend")
                    .property("y", FieldType::Number, "Second addend")
                    .required("x")
                    .required("y")
                    .build(),
            )
            .invoke_with(|_ctx, args| {
                let x = args["x"].as_f64().unwrap_or(0.0);
                let y = args["y"].as_f64().unwrap_or(0.0);
                Ok(ToolReturn::Value(json!({"sum": x + y})))
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_invoke_with_args_map() {
        let tool = adder();
        let args = json!({"x": 2, "y": 3});
        let output = tool
            .invoke(ToolInput::Args(args.as_object().unwrap().clone()), None)
            .await
            .unwrap();

        // No invocation id: the raw result passes through
        assert_eq!(output.raw().unwrap()["sum"], 5.0);
    }

    #[tokio::test]
    async fn test_invoke_with_envelope_wraps_output() {
        let tool = adder();
        let call = caplet_core::ToolCall::new("add", json!({"x": 2, "y": 3})).with_id("call-9");
        let output = tool.invoke(ToolInput::Call(call), None).await.unwrap();

        let message = output.message().unwrap();
        assert_eq!(message.tool_call_id, "call-9");
        assert_eq!(message.status, ToolStatus::Success);
        assert_eq!(message.name, "add");
        // Object content is serialized to JSON text
        assert_eq!(message.content.as_text(), Some("{\"sum\":5.0}"));
    }

    #[tokio::test]
    async fn test_validation_error_propagates_by_default() {
        let tool = adder();
        let args = json!({"x": 2});
        let error = tool
            .invoke(ToolInput::Args(args.as_object().unwrap().clone()), None)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_unexpected_field_is_validation_error() {
        let tool = adder();
        let args = json!({"x": 2, "y": 3, "z": 4});
        let error = tool
            .invoke(ToolInput::Args(args.as_object().unwrap().clone()), None)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_builder_requires_execution_function() {
        let error = StructuredTool::builder()
            .name("empty")
            .description("Nothing")
            .build()
            .unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_builder_requires_description() {
        let error = StructuredTool::builder()
            .name("undescribed")
            .invoke_with(|_ctx, _args| Ok(ToolReturn::Value(Value::Null)))
            .build()
            .unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_description_falls_back_to_doc_comment() {
        let tool = StructuredTool::builder()
            .name("documented")
            .doc("Does documented things.")
            .parse_doc(true)
            .invoke_with(|_ctx, _args| Ok(ToolReturn::Value(Value::Null)))
            .build()
            .unwrap();
        assert_eq!(tool.description(), "Does documented things.");
    }

    #[tokio::test]
    async fn test_no_schema_means_no_arguments() {
        let tool = StructuredTool::builder()
            .name("ping")
            .description("Always pongs")
            .invoke_with(|_ctx, args| {
                assert_eq!(args, json!({}));
                Ok(ToolReturn::Value(json!("pong")))
            })
            .build()
            .unwrap();

        // Any input shape resolves to no arguments
        let output = tool.invoke(ToolInput::from("ignored"), None).await.unwrap();
        assert_eq!(output.raw().unwrap(), &json!("pong"));
    }

    #[test]
    fn test_invoke_blocking_runs_sync_fn() {
        let tool = adder();
        let args = json!({"x": 1, "y": 2});
        let output = tool
            .invoke_blocking(ToolInput::Args(args.as_object().unwrap().clone()), None)
            .unwrap();
        assert_eq!(output.raw().unwrap()["sum"], 3.0);
    }

    #[test]
    fn test_invoke_blocking_rejects_async_only_tool() {
        let tool = StructuredTool::builder()
            .name("async-only")
            .description("Only async")
            .invoke_async(|_ctx, _args| async move { Ok(ToolReturn::Value(Value::Null)) })
            .build()
            .unwrap();

        let error = tool
            .invoke_blocking(ToolInput::Args(Map::new()), None)
            .unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_async_fn_preferred_over_sync() {
        let tool = StructuredTool::builder()
            .name("both")
            .description("Has both implementations")
            .invoke_with(|_ctx, _args| Ok(ToolReturn::Value(json!("sync"))))
            .invoke_async(|_ctx, _args| async move { Ok(ToolReturn::Value(json!("async"))) })
            .build()
            .unwrap();

        let output = tool.invoke(ToolInput::Args(Map::new()), None).await.unwrap();
        assert_eq!(output.raw().unwrap(), &json!("async"));
    }

    #[tokio::test]
    async fn test_content_and_artifact_splits_pair() {
        let tool = StructuredTool::builder()
            .name("probe")
            .description("Returns content and artifact")
            .response_format(ResponseFormat::ContentAndArtifact)
            .invoke_with(|_ctx, _args| {
                Ok(ToolReturn::Value(json!(["summary", {"bytes": [1, 2, 3]}])))
            })
            .build()
            .unwrap();

        let call = caplet_core::ToolCall::new("probe", json!({})).with_id("call-1");
        let output = tool.invoke(ToolInput::Call(call), None).await.unwrap();
        let message = output.message().unwrap();
        assert_eq!(message.content.as_text(), Some("summary"));
        assert_eq!(message.artifact, Some(json!({"bytes": [1, 2, 3]})));
    }

    #[tokio::test]
    async fn test_content_and_artifact_rejects_single_value() {
        let tool = StructuredTool::builder()
            .name("probe")
            .description("Misbehaves")
            .response_format(ResponseFormat::ContentAndArtifact)
            .invoke_with(|_ctx, _args| Ok(ToolReturn::Value(json!("just content"))))
            .build()
            .unwrap();

        let error = tool
            .invoke(ToolInput::Args(Map::new()), None)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::ToolFailed { .. }));
    }

    #[tokio::test]
    async fn test_rich_message_passes_through() {
        let tool = StructuredTool::builder()
            .name("rich")
            .description("Returns a shaped message")
            .invoke_with(|_ctx, _args| {
                Ok(ToolReturn::Message(ToolMessage::new(
                    MessageContent::Text("shaped".to_string()),
                    "rich",
                    "preset-id",
                )))
            })
            .build()
            .unwrap();

        let call = caplet_core::ToolCall::new("rich", json!({})).with_id("call-7");
        let output = tool.invoke(ToolInput::Call(call), None).await.unwrap();
        // The preset id survives: no re-wrapping happened
        assert_eq!(output.message().unwrap().tool_call_id, "preset-id");
    }

    #[test]
    fn test_raw_schema_rejects_text_input() {
        let tool = StructuredTool::builder()
            .name("opaque")
            .description("Opaque schema")
            .raw_schema(json!({"type": "object", "properties": {"q": {"type": "string"}}}))
            .invoke_with(|_ctx, args| Ok(ToolReturn::Value(args)))
            .build()
            .unwrap();

        let error = tool
            .invoke_blocking(ToolInput::from("free text"), None)
            .unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[test]
    fn test_raw_schema_passes_args_unvalidated() {
        let tool = StructuredTool::builder()
            .name("opaque")
            .description("Opaque schema")
            .raw_schema(json!({"type": "object"}))
            .invoke_with(|_ctx, args| Ok(ToolReturn::Value(args)))
            .build()
            .unwrap();

        let args = json!({"anything": [1, 2, 3]});
        let output = tool
            .invoke_blocking(ToolInput::Args(args.as_object().unwrap().clone()), None)
            .unwrap();
        assert_eq!(output.raw().unwrap(), &args);
    }

    #[test]
    fn test_raw_schema_must_be_object() {
        let error = StructuredTool::builder()
            .name("bad")
            .description("Bad schema")
            .raw_schema(json!("not a schema"))
            .invoke_with(|_ctx, args| Ok(ToolReturn::Value(args)))
            .build()
            .unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[tokio::test]
    #[allow(deprecated)]
    async fn test_callback_manager_alias_migrates() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[derive(Default)]
        struct Counter(AtomicUsize);

        impl ToolCallbacks for Counter {
            fn on_tool_end(&self, _output: &ToolOutput, _run_id: &str) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = Arc::new(Counter::default());
        let tool = StructuredTool::builder()
            .name("legacy")
            .description("Uses the deprecated alias")
            .callback_manager(counter.clone())
            .invoke_with(|_ctx, _args| Ok(ToolReturn::Value(Value::Null)))
            .build()
            .unwrap();

        tool.invoke(ToolInput::Args(Map::new()), None).await.unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }
}
