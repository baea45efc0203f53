//! Model API boundary
//!
//! ## Architecture
//!
//! Real models go through the `genai` crate, which handles streaming, the
//! provider-specific protocols and tool-call capture. Providers not native to
//! genai (Azure, OpenRouter, Mistral) are routed through its
//! `ServiceTargetResolver` using the OpenAI-compatible protocol.
//!
//! The host always dispatches tools itself: requested calls come back as
//! `StreamChunk::ToolCall` and are never executed model-side.
//!
//! `MockProvider` gives deterministic replies for tests and offline runs.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{
    collect_reply, LlmProvider, ModelReply, ProviderModelConfig, StreamChatOptions, StreamResponse,
};
pub use error::{ProviderError, ProviderResult};

pub use genai_provider::GenaiProvider;
pub use genai_adapter::{is_genai_native, is_genai_supported, requires_api_key, resolve_api_key};

pub use mock::{MockConfig, MockMode, MockProvider, MockReply, MockRequest};

use std::sync::Arc;

use crate::logging::Logger;
use crate::secrets::SecretStore;

/// Shared handle to a model provider
pub type SharedLlmProvider = Arc<dyn LlmProvider>;

/// Create the provider named by `provider_id`.
///
/// `mock` selects the echoing `MockProvider`; anything else goes through
/// `GenaiProvider`, which also covers custom OpenAI-compatible endpoints.
pub fn create_provider(
    provider_id: &str,
    secrets: Arc<dyn SecretStore>,
    logger: Arc<dyn Logger>,
) -> SharedLlmProvider {
    match provider_id.to_lowercase().as_str() {
        "mock" => Arc::new(MockProvider::echo(logger)),
        _ => {
            if !GenaiProvider::supports(provider_id) {
                logger.warn(&format!(
                    "Provider '{}' is not known to genai; treating it as OpenAI-compatible (known: {})",
                    provider_id,
                    supported_providers().join(", ")
                ));
            }
            Arc::new(GenaiProvider::new(provider_id, secrets, logger))
        }
    }
}

/// List all supported provider IDs
pub fn supported_providers() -> Vec<&'static str> {
    vec![
        "gemini",
        "openai",
        "anthropic",
        "ollama",
        "groq",
        "xai",
        "deepseek",
        "cohere",
        "fireworks",
        "together",
        "azure",
        "openrouter",
        "mistral",
        "mock",
    ]
}
