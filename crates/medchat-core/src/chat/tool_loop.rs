//! The tool-call orchestration loop
//!
//! ```text
//! AwaitingModel --(reply has tool calls)--> DispatchingTool
//! DispatchingTool --(selected calls answered)--> AwaitingModel
//! AwaitingModel --(reply has no tool calls)--> Done
//! ```
//!
//! The loop suspends only while the model or a tool provider is working.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::{ChatSettings, DispatchPolicy};
use crate::llm::{
    collect_reply, LlmProvider, ModelReply, ProviderError, ProviderModelConfig, StreamChatOptions,
};
use crate::logging::Logger;
use crate::tools::ToolRegistry;
use crate::types::{CancellationToken, ChatMessage, ToolCall};

use super::conversation::ConversationState;
use super::error::{ChatError, ChatResult};

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingModel,
    DispatchingTool,
    Done,
}

/// One query's run through the model/tool cycle
pub struct ToolLoop {
    model: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    model_config: ProviderModelConfig,
    max_tokens: u32,
    temperature: Option<f32>,
    dispatch: DispatchPolicy,
    conversation: ConversationState,
    state: LoopState,
    /// Calls selected from the last model reply, not yet answered
    pending: VecDeque<ToolCall>,
    answer: Option<String>,
    dispatch_count: usize,
    cancel: CancellationToken,
    logger: Arc<dyn Logger>,
}

impl ToolLoop {
    pub fn new(
        query: impl Into<String>,
        model: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
        settings: &ChatSettings,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            model,
            registry,
            model_config: ProviderModelConfig::from(settings),
            max_tokens: settings.max_output_tokens,
            temperature: settings.temperature,
            dispatch: settings.dispatch,
            conversation: ConversationState::new(query),
            state: LoopState::AwaitingModel,
            pending: VecDeque::new(),
            answer: None,
            dispatch_count: 0,
            cancel: CancellationToken::new(),
            logger,
        }
    }

    /// Cancel this turn through `token`
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    /// Final text once `Done`; empty when the model produced none
    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    /// Tool calls dispatched so far
    pub fn dispatch_count(&self) -> usize {
        self.dispatch_count
    }

    /// The call the next `step` will dispatch
    pub fn next_call(&self) -> Option<&ToolCall> {
        match self.state {
            LoopState::DispatchingTool => self.pending.front(),
            _ => None,
        }
    }

    /// Perform one transition and return the new state
    pub async fn step(&mut self) -> ChatResult<LoopState> {
        match self.state {
            LoopState::AwaitingModel => {
                let reply = self.invoke_model().await?;
                self.accept_reply(reply);
            }
            LoopState::DispatchingTool => self.dispatch_next().await?,
            LoopState::Done => {}
        }
        Ok(self.state)
    }

    /// Drive the loop to `Done` and return the final text
    pub async fn run(&mut self) -> ChatResult<String> {
        while self.state != LoopState::Done {
            self.step().await?;
        }
        Ok(self.answer.clone().unwrap_or_default())
    }

    async fn invoke_model(&self) -> ChatResult<ModelReply> {
        let options = StreamChatOptions {
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            tool_bundles: self.registry.bundles().to_vec(),
            ..Default::default()
        };

        self.logger.info(&format!(
            "[ToolLoop] Invoking {} with {} turns",
            self.model.name(),
            self.conversation.len()
        ));

        let request = async {
            let stream = self
                .model
                .stream_chat(
                    self.conversation.to_messages(),
                    self.model_config.clone(),
                    options,
                    self.cancel.clone(),
                )
                .await?;
            collect_reply(stream).await
        };

        let reply = tokio::select! {
            reply = request => reply,
            _ = self.cancel.cancelled() => Err(ProviderError::Cancelled),
        };

        match reply {
            Ok(reply) => Ok(reply),
            Err(ProviderError::Cancelled) => Err(ChatError::Cancelled),
            Err(e) => Err(ChatError::ModelInvocation(e)),
        }
    }

    fn accept_reply(&mut self, reply: ModelReply) {
        if !reply.has_tool_calls() {
            self.conversation.push(ChatMessage::assistant(reply.text.clone()));
            self.answer = Some(reply.text);
            self.state = LoopState::Done;
            return;
        }

        // The full reply is kept even when only the first call is acted on
        self.conversation
            .push(ChatMessage::assistant_tool_calls(reply.text, &reply.tool_calls));

        let requested = reply.tool_calls.len();
        self.pending = match self.dispatch {
            DispatchPolicy::First => reply.tool_calls.into_iter().take(1).collect(),
            DispatchPolicy::All => reply.tool_calls.into_iter().collect(),
        };
        if self.pending.len() < requested {
            self.logger.debug(&format!(
                "[ToolLoop] Model requested {} calls, dispatching {}",
                requested,
                self.pending.len()
            ));
        }
        self.state = LoopState::DispatchingTool;
    }

    async fn dispatch_next(&mut self) -> ChatResult<()> {
        if let Some(call) = self.pending.pop_front() {
            let result = tokio::select! {
                result = self.registry.dispatch(&call) => result,
                _ = self.cancel.cancelled() => return Err(ChatError::Cancelled),
            };
            self.conversation.push(ChatMessage::tool_result(&result));
            self.dispatch_count += 1;
        }

        if self.pending.is_empty() {
            self.state = LoopState::AwaitingModel;
        }
        Ok(())
    }
}
