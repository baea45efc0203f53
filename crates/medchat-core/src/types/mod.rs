//! Core types for tool-calling conversations
//!
//! This module contains the shared types used by the MCP, tools, llm and chat modules.

mod message;
mod tool;
mod stream;
mod cancellation;

pub use message::{ChatMessage, ContentPart, MessageRole, MessageContent};
pub use tool::{Tool, ToolBundle, ToolCall, ToolResult, ToolChoice};
pub use stream::StreamChunk;
pub use cancellation::CancellationToken;
