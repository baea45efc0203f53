//! Mock provider for testing
//!
//! Provides deterministic, configurable responses without network dependencies.
//! Besides the single-response modes it can play back a script of replies,
//! one per invocation, which is how the orchestration loop is tested.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::traits::{LlmProvider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::logging::Logger;
use crate::types::{
    CancellationToken, ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk,
    ToolBundle, ToolCall,
};

/// One scripted model reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Final text, no tool calls
    Text(String),
    /// Optional text followed by requested tool calls
    ToolCalls { text: String, calls: Vec<ToolCall> },
    /// The invocation fails
    Fail(String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    /// A reply requesting a single tool call
    pub fn call(id: &str, name: &str, input: serde_json::Value) -> Self {
        MockReply::ToolCalls {
            text: String::new(),
            calls: vec![ToolCall::new(id, name, input)],
        }
    }

    pub fn calls(calls: Vec<ToolCall>) -> Self {
        MockReply::ToolCalls {
            text: String::new(),
            calls,
        }
    }
}

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Echo back the last user message
    #[default]
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Return response as specific chunks with delays
    Chunks(Vec<String>),
    /// Simulate an error after some chunks
    Error { message: String, delay_chunks: usize },
    /// Return nothing (empty response)
    Empty,
    /// Play back replies in order, one per invocation
    Script(Vec<MockReply>),
}

/// Configuration for the mock provider
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Response mode
    pub mode: MockMode,
    /// Delay between chunks in milliseconds (0 = no delay)
    pub chunk_delay_ms: u64,
    /// Size of each chunk when splitting text responses
    pub chunk_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mode: MockMode::Echo,
            chunk_delay_ms: 0,
            chunk_size: 10,
        }
    }
}

/// What the mock saw on one invocation
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub messages: Vec<ChatMessage>,
    pub tool_bundles: Vec<ToolBundle>,
    pub max_tokens: Option<u32>,
}

/// Mock LLM provider for testing
pub struct MockProvider {
    config: MockConfig,
    script: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<MockRequest>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    /// Create a new mock provider with default config
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_config(MockConfig::default(), logger)
    }

    /// Create with specific config
    pub fn with_config(config: MockConfig, logger: Arc<dyn Logger>) -> Self {
        let script = match &config.mode {
            MockMode::Script(replies) => replies.iter().cloned().collect(),
            _ => VecDeque::new(),
        };
        Self {
            config,
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode,
                ..Default::default()
            },
            logger,
        )
    }

    /// Create an echo provider (echoes back user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Echo, logger)
    }

    /// Create a fixed response provider
    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    /// Create a chunked response provider
    pub fn chunked(chunks: Vec<String>, delay_ms: u64, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Chunks(chunks), logger).with_delay(delay_ms)
    }

    /// Create an error-producing provider
    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(
            MockMode::Error {
                message: message.into(),
                delay_chunks: 0,
            },
            logger,
        )
    }

    /// Create a provider that never produces output
    pub fn empty(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Empty, logger)
    }

    /// Create a provider that plays back `replies` in order
    pub fn scripted(replies: Vec<MockReply>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Script(replies), logger)
    }

    /// Set chunk delay
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.config.chunk_delay_ms = delay_ms;
        self
    }

    /// Set chunk size for splitting responses
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Every request seen so far, oldest first
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// Number of invocations so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Scripted replies not yet played
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }

    /// Extract last user message content
    fn get_last_user_message(&self, messages: &[ChatMessage]) -> String {
        for msg in messages.iter().rev().filter(|m| m.role == MessageRole::User) {
            let text = match &msg.content {
                MessageContent::Text(text) => text.clone(),
                MessageContent::Parts(parts) => parts
                    .iter()
                    .filter_map(|p| match p {
                        ContentPart::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect(),
            };
            if !text.is_empty() {
                return text;
            }
        }
        "Hello from MockProvider!".to_string()
    }

    /// Split text into chunks
    fn split_into_chunks(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if self.config.chunk_size == 0 {
            return vec![text.to_string()];
        }

        text.chars()
            .collect::<Vec<_>>()
            .chunks(self.config.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }

    fn text_chunks(&self, text: &str) -> Vec<ProviderResult<StreamChunk>> {
        self.split_into_chunks(text)
            .into_iter()
            .map(|t| Ok(StreamChunk::text(t)))
            .collect()
    }

    fn next_scripted(&self) -> ProviderResult<Vec<ProviderResult<StreamChunk>>> {
        let reply = self
            .script
            .lock()
            .pop_front()
            .ok_or_else(|| ProviderError::invalid_response("mock", "script exhausted"))?;

        match reply {
            MockReply::Text(text) => Ok(self.text_chunks(&text)),
            MockReply::ToolCalls { text, calls } => {
                let mut chunks = self.text_chunks(&text);
                chunks.extend(calls.into_iter().map(|c| Ok(StreamChunk::tool_call(c))));
                Ok(chunks)
            }
            MockReply::Fail(message) => Err(ProviderError::api_error("mock", message)),
        }
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        _model: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        self.logger.debug(&format!(
            "MockProvider: stream_chat called with {} messages",
            messages.len()
        ));

        let chunks: Vec<ProviderResult<StreamChunk>> = match &self.config.mode {
            MockMode::Echo => {
                let user_msg = self.get_last_user_message(&messages);
                self.text_chunks(&format!("Echo: {}", user_msg))
            }
            MockMode::Fixed(response) => self.text_chunks(response),
            MockMode::Chunks(chunks) => chunks.iter().map(|c| Ok(StreamChunk::text(c.clone()))).collect(),
            MockMode::Empty => Vec::new(),
            MockMode::Error { message, delay_chunks } => {
                let mut result: Vec<ProviderResult<StreamChunk>> = (0..*delay_chunks)
                    .map(|i| Ok(StreamChunk::text(format!("Chunk {} before error. ", i))))
                    .collect();
                result.push(Err(ProviderError::Other(format!("Mock error: {}", message))));
                result
            }
            MockMode::Script(_) => {
                // Recorded even when the scripted reply is a failure
                self.requests.lock().push(MockRequest {
                    messages: messages.clone(),
                    tool_bundles: options.tool_bundles.clone(),
                    max_tokens: options.max_tokens,
                });
                let chunks = self.next_scripted()?;
                return Ok(Box::pin(stream::iter(chunks)));
            }
        };

        self.requests.lock().push(MockRequest {
            messages,
            tool_bundles: options.tool_bundles,
            max_tokens: options.max_tokens,
        });

        let delay_ms = self.config.chunk_delay_ms;
        let logger = self.logger.clone();

        let stream = stream::iter(chunks.into_iter().enumerate()).then(move |(i, chunk)| {
            let logger = logger.clone();
            let cancel = cancel_token.clone();
            async move {
                if cancel.is_cancelled() {
                    return Err(ProviderError::Cancelled);
                }

                // Apply delay (except for first chunk)
                if i > 0 && delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }

                logger.debug(&format!("MockProvider: Yielding chunk {}", i));
                chunk
            }
        });

        Ok(Box::pin(stream))
    }
}
