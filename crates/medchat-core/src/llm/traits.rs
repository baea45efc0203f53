//! LLM provider trait definition

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;

use crate::config::ChatSettings;
use crate::types::{CancellationToken, ChatMessage, StreamChunk, ToolBundle, ToolCall, ToolChoice};
use super::error::ProviderResult;

/// Model configuration for provider requests
#[derive(Debug, Clone)]
pub struct ProviderModelConfig {
    /// Model identifier as used by the provider's API
    pub model: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl ProviderModelConfig {
    /// Create a new model config
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_base: None,
        }
    }
}

impl From<&ChatSettings> for ProviderModelConfig {
    fn from(settings: &ChatSettings) -> Self {
        Self {
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            api_base: settings.api_base.clone(),
        }
    }
}

/// Options for one model invocation
#[derive(Debug, Clone, Default)]
pub struct StreamChatOptions {
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Tool declarations grouped per provider, passed through as registered
    pub tool_bundles: Vec<ToolBundle>,
    /// Tool choice behavior
    pub tool_choice: ToolChoice,
}

impl StreamChatOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set the tool bundles
    pub fn with_tool_bundles(mut self, bundles: Vec<ToolBundle>) -> Self {
        self.tool_bundles = bundles;
        self
    }

    /// Total number of declared tools across bundles
    pub fn tool_count(&self) -> usize {
        self.tool_bundles.iter().map(|b| b.tools.len()).sum()
    }
}

/// Type alias for the streaming response
pub type StreamResponse = Pin<Box<dyn Stream<Item = ProviderResult<StreamChunk>> + Send>>;

/// LLM provider abstraction
///
/// Implementations never execute tools themselves; requested calls are
/// surfaced as `StreamChunk::ToolCall` and dispatched by the host.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "gemini", "openai")
    fn name(&self) -> &str;

    /// Stream a chat completion
    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse>;
}

/// A complete model response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    /// Concatenated text; empty when the model produced none
    pub text: String,
    /// Requested tool calls in the order the model issued them
    pub tool_calls: Vec<ToolCall>,
}

impl ModelReply {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Drain a response stream into a `ModelReply`
pub async fn collect_reply(mut stream: StreamResponse) -> ProviderResult<ModelReply> {
    let mut reply = ModelReply::default();
    while let Some(chunk) = stream.next().await {
        match chunk? {
            StreamChunk::Text { text } => reply.text.push_str(&text),
            StreamChunk::ToolCall { tool_call } => reply.tool_calls.push(tool_call),
        }
    }
    Ok(reply)
}
