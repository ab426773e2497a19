use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Schema or construction misuse. Never recoverable by a tool's
    /// runtime error-handling policy.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tool input failed schema validation.
    #[error("Input validation failed: {0}")]
    Validation(String),

    /// A failure the tool itself declared, meant to be surfaced to the
    /// model as an observation rather than a crash.
    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Tool '{tool}' execution failed: {source}")]
    ToolFailed {
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Helper for creating configuration errors
    ///
    /// # Example
    /// ```
    /// use caplet_core::Error;
    /// let err = Error::config("args schema must be an object");
    /// ```
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Helper for creating input validation errors
    ///
    /// # Example
    /// ```
    /// use caplet_core::Error;
    /// let err = Error::validation("missing required field `query`");
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Helper for creating declared tool-logic errors
    ///
    /// # Example
    /// ```
    /// use caplet_core::Error;
    /// let err = Error::tool("no results for that query");
    /// ```
    pub fn tool(msg: impl Into<String>) -> Self {
        Error::Tool(msg.into())
    }

    /// Helper for wrapping an unexpected execution fault
    pub fn tool_failed(tool: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Error::ToolFailed {
            tool: tool.into(),
            source: source.into(),
        }
    }
}
