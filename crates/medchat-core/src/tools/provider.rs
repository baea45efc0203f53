//! The seam between the registry and a tool-provider connection

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::Tool;
use super::error::ToolCallResult;

/// A source of callable tools (an MCP server connection in production)
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Provider name from the descriptor
    fn name(&self) -> &str;

    /// Declarations discovered at connect time, schemas already cleaned
    fn tools(&self) -> &[Tool];

    /// Execute a tool. Failures come back as `Err` values, never as panics.
    async fn call_tool(&self, name: &str, arguments: Value) -> ToolCallResult;

    /// Release the transport. Calling it again is a no-op.
    async fn close(&self);
}

pub type SharedToolProvider = Arc<dyn ToolProvider>;
