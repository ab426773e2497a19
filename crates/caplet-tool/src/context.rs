use caplet_core::{RunConfig, ToolContext};

/// Default implementation of ToolContext
#[derive(Debug, Clone)]
pub struct RunContext {
    tool_call_id: Option<String>,
    run_id: String,
    config: RunConfig,
}

impl RunContext {
    pub fn new(tool_call_id: Option<String>, run_id: String, config: RunConfig) -> Self {
        Self {
            tool_call_id,
            run_id,
            config,
        }
    }
}

impl ToolContext for RunContext {
    fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref()
    }

    fn run_id(&self) -> &str {
        &self.run_id
    }

    fn config(&self) -> &RunConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_context_accessors() {
        let ctx = RunContext::new(
            Some("call-123".to_string()),
            "run-456".to_string(),
            RunConfig::default(),
        );

        assert_eq!(ctx.tool_call_id(), Some("call-123"));
        assert_eq!(ctx.run_id(), "run-456");
        assert!(ctx.config().callbacks.is_none());
    }
}
