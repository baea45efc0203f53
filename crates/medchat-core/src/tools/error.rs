//! Tool dispatch errors
//!
//! None of these abort a chat turn; they are handed to the model as error payloads.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// The model asked for a tool no connected provider declares
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The provider failed while executing the call
    #[error("Tool {tool} failed: {message}")]
    Execution { tool: String, message: String },

    #[error("Tool {tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },
}

impl ToolError {
    pub fn execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Outcome of one provider call: success payload or error detail
pub type ToolCallResult = Result<serde_json::Value, ToolError>;
