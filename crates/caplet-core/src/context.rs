use crate::callbacks::ToolCallbacks;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Ambient per-invocation configuration: callback sink, tags, trace
/// metadata, and the run identity. Read-only from the invoker's
/// perspective except that the run id is taken for the current run.
#[derive(Clone, Default)]
pub struct RunConfig {
    pub callbacks: Option<Arc<dyn ToolCallbacks>>,
    pub tags: Vec<String>,
    pub metadata: HashMap<String, Value>,
    pub run_name: Option<String>,
    pub run_id: Option<Uuid>,
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("callbacks", &self.callbacks.is_some())
            .field("tags", &self.tags)
            .field("metadata", &self.metadata)
            .field("run_name", &self.run_name)
            .field("run_id", &self.run_id)
            .finish()
    }
}

impl RunConfig {
    /// Materializes a usable configuration from an optional one.
    pub fn ensure(config: Option<RunConfig>) -> RunConfig {
        config.unwrap_or_default()
    }

    /// Takes the run id for the current invocation, generating a fresh
    /// one when the caller did not supply any.
    pub fn take_run_id(&mut self) -> Uuid {
        self.run_id.take().unwrap_or_else(Uuid::new_v4)
    }

    /// Scoped configuration handed down to the execution context, with
    /// the given child callback handle. The run identity is not
    /// inherited: nested runs get their own.
    pub fn child(&self, callbacks: Option<Arc<dyn ToolCallbacks>>) -> RunConfig {
        RunConfig {
            callbacks,
            tags: self.tags.clone(),
            metadata: self.metadata.clone(),
            run_name: None,
            run_id: None,
        }
    }
}

/// Scoped execution context handed to a tool callable.
pub trait ToolContext: Send + Sync {
    /// Identifier of the originating tool call, when the invocation
    /// arrived as a full envelope.
    fn tool_call_id(&self) -> Option<&str>;

    /// Identifier of this run.
    fn run_id(&self) -> &str;

    /// Scoped configuration for nested executions within this run.
    fn config(&self) -> &RunConfig;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_run_id_prefers_supplied_id() {
        let id = Uuid::new_v4();
        let mut config = RunConfig {
            run_id: Some(id),
            ..Default::default()
        };
        assert_eq!(config.take_run_id(), id);
        assert!(config.run_id.is_none(), "run id should be popped");
    }

    #[test]
    fn test_child_config_keeps_tags_and_metadata() {
        let mut config = RunConfig::default();
        config.tags.push("billing".to_string());
        config.run_id = Some(Uuid::new_v4());

        let child = config.child(None);
        assert_eq!(child.tags, vec!["billing".to_string()]);
        assert!(child.run_id.is_none(), "child runs get their own id");
    }
}
