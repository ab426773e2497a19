//! Tool system for caplet
//!
//! This crate provides the schema-derivation and invocation layer:
//! - Schema derivation from typed argument structs or schema documents,
//!   normalized across the two supported schema dialects
//! - Runtime-injected argument markers and doc-comment descriptions
//! - The `StructuredTool` invoker with validation, error-recovery
//!   policies, and sync/async execution bridging
//! - Built-in tools (echo, calculator)

pub mod builtin;
pub mod context;
pub mod derive;
pub mod dialect;
pub mod docstring;
pub mod injected;
pub mod input;
pub mod reflect;
pub mod schema;
pub mod structured;

// Re-exports
pub use context::RunContext;
pub use derive::{schema_from_document, schema_from_type, SchemaOptions, FILTERED_ARGS};
pub use dialect::{detect_dialect, SchemaDialect};
pub use docstring::{parse_doc_comment, DocComment};
pub use injected::{Injected, InjectedToolCallId};
pub use input::{prepare, PreparedArgs};
pub use schema::{ArgsSchema, FieldSpec, FieldType, InputSchema, InputSchemaBuilder};
pub use structured::{
    ErrorHandling, ResponseFormat, StructuredTool, StructuredToolBuilder,
};

// Re-export core types
pub use caplet_core::{
    Error, Result, RunConfig, Tool, ToolCall, ToolContext, ToolInput, ToolMessage, ToolOutput,
    ToolReturn, ToolStatus,
};
