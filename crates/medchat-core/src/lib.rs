//! MedChat Core
//!
//! A chat host that lets a hosted LLM call tools exposed by MCP tool-provider
//! processes. This crate is runtime-agnostic: the terminal front end lives in
//! `medchat-cli`, and other front ends can drive the same `ChatHost`.
//!
//! ## Tool Orchestration
//!
//! - `mcp`: one connection per configured provider, tools listed at startup
//! - `tools`: the registry that routes a tool name to its provider
//! - `chat`: the model/tool loop and the emitter that streams its output
//! - `host`: the context object owning all of the above
//!
//! ```rust,ignore
//! use medchat_core::{ChatHost, EmitMode, CancellationToken, collect_answer};
//!
//! let host = ChatHost::start_from_file(path, secrets, logger).await?;
//! let answer = collect_answer(
//!     host.process_query("Any recruiting asthma trials?", EmitMode::Batch, CancellationToken::new()),
//! ).await?;
//! host.shutdown().await;
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod llm;
pub mod tools;
pub mod mcp;
pub mod chat;
pub mod host;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentPart, MessageRole, MessageContent,
    Tool, ToolBundle, ToolCall, ToolResult, ToolChoice,
    StreamChunk,
    CancellationToken,
};

pub use secrets::{SecretStore, EnvSecretStore, MemorySecretStore};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, TracingLogger};

pub use config::{ChatSettings, ConfigError, DispatchPolicy, HostConfig, ServerConfig};

pub use llm::{create_provider, GenaiProvider, LlmProvider, MockProvider, ProviderError};

pub use tools::{ToolError, ToolProvider, ToolRegistry};

// MCP client using official rmcp SDK
pub use mcp::{clean_schema, McpConnection, McpError};

pub use chat::{
    chat_stream, collect_answer, text_stream, write_to,
    ChatError, ChatEvent, ChatStream, EmitMode, LoopState, ToolLoop,
};

pub use host::{connect_providers, ChatHost, HostError};
