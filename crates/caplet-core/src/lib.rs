//! Core traits and types for caplet
//!
//! This crate provides the foundational abstractions for schema-validated
//! tool invocation: the error taxonomy, invocation and result envelopes,
//! per-run configuration, the notification sink, and the `Tool` trait.

pub mod callbacks;
pub mod context;
pub mod error;
pub mod message;
pub mod traits;

// Re-exports
pub use callbacks::{NoopToolCallbacks, ToolCallbacks, ToolDescriptor};
pub use context::{RunConfig, ToolContext};
pub use error::{Error, Result};
pub use message::{
    MessageContent, ToolCall, ToolInput, ToolMessage, ToolOutput, ToolReturn, ToolStatus,
    TOOL_MESSAGE_BLOCK_TYPES, stringify,
};
pub use traits::Tool;
