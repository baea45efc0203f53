//! GenaiProvider - Unified provider using the genai crate
//!
//! Handles every genai-native provider (Gemini, OpenAI, Anthropic, ...) as well
//! as OpenAI-compatible ones (Azure, OpenRouter, Mistral) via the
//! ServiceTargetResolver.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::Arc;

use genai::chat::{ChatRequest, ChatStreamEvent};

use crate::logging::Logger;
use crate::secrets::SecretStore;
use crate::types::{CancellationToken, ChatMessage, ToolChoice};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_event, is_genai_supported, requires_api_key, resolve_api_key,
    to_genai_messages, to_genai_options, to_genai_tools, ProviderConfig,
};
use super::traits::{LlmProvider, ProviderModelConfig, StreamChatOptions, StreamResponse};

/// Unified provider using genai for all supported LLM APIs
pub struct GenaiProvider {
    /// Provider identifier
    provider_id: String,
    /// Where API keys come from when the settings carry none
    secrets: Arc<dyn SecretStore>,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    /// Create a new GenaiProvider
    pub fn new(
        provider_id: impl Into<String>,
        secrets: Arc<dyn SecretStore>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            secrets,
            logger,
        }
    }

    /// Check if this provider can handle the given provider ID
    pub fn supports(provider_id: &str) -> bool {
        is_genai_supported(provider_id)
    }

    /// Drop a leading `<provider>/` from the model id.
    ///
    /// Only this provider's own prefix is stripped, so namespaced ids such as
    /// OpenRouter's `anthropic/claude-3.5-sonnet` pass through whole.
    pub fn extract_model_name<'a>(provider_id: &str, model: &'a str) -> &'a str {
        match model.split_once('/') {
            Some((prefix, rest)) if prefix.eq_ignore_ascii_case(provider_id) => rest,
            _ => model,
        }
    }
}

#[async_trait]
impl LlmProvider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model_config: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        let api_key = resolve_api_key(
            &self.provider_id,
            model_config.api_key.as_deref(),
            self.secrets.as_ref(),
        );
        if api_key.is_none() && requires_api_key(&self.provider_id) {
            return Err(ProviderError::MissingApiKey {
                provider: self.provider_id.clone(),
            });
        }

        let client = create_client(&ProviderConfig {
            provider: self.provider_id.clone(),
            api_key,
            api_base: model_config.api_base.clone(),
        });

        let mut chat_req = ChatRequest::new(to_genai_messages(messages)?);
        let genai_tools = match options.tool_choice {
            ToolChoice::None => Vec::new(),
            ToolChoice::Auto | ToolChoice::Required => to_genai_tools(&options.tool_bundles),
        };
        if !genai_tools.is_empty() {
            chat_req = chat_req.with_tools(genai_tools);
        }

        let genai_options = to_genai_options(&options);
        let model_name = Self::extract_model_name(&self.provider_id, &model_config.model);

        self.logger.info(&format!(
            "[GenaiProvider] Invoking {} model {} with {} tools",
            self.provider_id,
            model_name,
            options.tool_count()
        ));

        let chat_stream = client
            .exec_chat_stream(model_name, chat_req, Some(&genai_options))
            .await
            .map_err(|e| ProviderError::api_error(&self.provider_id, e.to_string()))?;

        let logger = Arc::clone(&self.logger);
        let provider_id = self.provider_id.clone();

        let stream = chat_stream
            .stream
            .map(move |result| {
                if cancel_token.is_cancelled() {
                    logger.info("[GenaiProvider] Stream cancelled");
                    return vec![Err(ProviderError::Cancelled)];
                }

                match result {
                    Ok(event) => {
                        if let ChatStreamEvent::End(_) = &event {
                            logger.debug("[GenaiProvider] Stream event: End");
                        }
                        from_genai_event(event)
                    }
                    Err(e) => {
                        logger.error(&format!("[GenaiProvider] Stream error: {}", e));
                        vec![Err(ProviderError::api_error(&provider_id, e.to_string()))]
                    }
                }
            })
            .flat_map(stream::iter);

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_extract_model_name() {
        assert_eq!(GenaiProvider::extract_model_name("openai", "openai/gpt-4"), "gpt-4");
        assert_eq!(GenaiProvider::extract_model_name("gemini", "gemini-2.5-flash"), "gemini-2.5-flash");
    }

    #[test]
    fn test_extract_model_name_keeps_vendor_namespace() {
        assert_eq!(
            GenaiProvider::extract_model_name("openrouter", "anthropic/claude-3.5-sonnet"),
            "anthropic/claude-3.5-sonnet"
        );
        assert_eq!(
            GenaiProvider::extract_model_name("openrouter", "openrouter/meta-llama/llama-3.1-70b"),
            "meta-llama/llama-3.1-70b"
        );
        assert_eq!(GenaiProvider::extract_model_name("OpenRouter", "openrouter/x-ai/grok-2"), "x-ai/grok-2");
    }

    #[test]
    fn test_supports() {
        assert!(GenaiProvider::supports("gemini"));
        assert!(GenaiProvider::supports("azure"));
        assert!(!GenaiProvider::supports("unknown_provider"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_request() {
        let provider = GenaiProvider::new(
            "gemini",
            Arc::new(MemorySecretStore::new()),
            Arc::new(NoOpLogger::new()),
        );

        let result = provider
            .stream_chat(
                vec![ChatMessage::user("hello")],
                ProviderModelConfig::new("gemini-2.5-flash"),
                StreamChatOptions::new(),
                CancellationToken::new(),
            )
            .await;

        match result {
            Err(ProviderError::MissingApiKey { provider }) => assert_eq!(provider, "gemini"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected a missing key error"),
        }
    }
}
