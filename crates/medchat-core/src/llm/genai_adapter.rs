//! Adapter between medchat-core types and genai types
//!
//! Conversation turns, tool bundles and options are converted here so the
//! provider itself only deals with request plumbing.
//!
//! Auth flows through our `SecretStore`, not genai's default env var lookup.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatRole as GenaiRole,
    ChatStreamEvent, MessageContent as GenaiContent, Tool as GenaiTool, ToolCall as GenaiToolCall,
    ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::json;

use crate::secrets::SecretStore;
use crate::types::{
    ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk, Tool, ToolBundle, ToolCall,
};

use super::error::ProviderResult;
use super::traits::StreamChatOptions;

// ============================================================================
// Message Conversion: medchat -> genai
// ============================================================================

/// Convert a MessageRole to a genai ChatRole
pub fn to_genai_role(role: MessageRole) -> GenaiRole {
    match role {
        MessageRole::System => GenaiRole::System,
        MessageRole::User => GenaiRole::User,
        MessageRole::Assistant => GenaiRole::Assistant,
        MessageRole::Tool => GenaiRole::Tool,
    }
}

fn text_message(role: MessageRole, text: String) -> GenaiMessage {
    let content = GenaiContent::from(text);
    match role {
        MessageRole::System => GenaiMessage::system(content),
        MessageRole::User | MessageRole::Tool => GenaiMessage::user(content),
        MessageRole::Assistant => GenaiMessage::assistant(content),
    }
}

/// genai may carry provider-specific extras on a tool call; building it
/// through serde leaves those at their defaults.
fn to_genai_tool_call(
    id: &str,
    name: &str,
    input: &serde_json::Value,
    native: Option<&serde_json::Value>,
) -> ProviderResult<GenaiToolCall> {
    if let Some(native) = native {
        return Ok(serde_json::from_value(native.clone())?);
    }
    Ok(serde_json::from_value(json!({
        "call_id": id,
        "fn_name": name,
        "fn_arguments": input,
    }))?)
}

/// Convert one turn. A turn with tool parts expands to several genai messages:
/// the assistant text (if any) followed by its tool calls, or one tool
/// response per result.
pub fn to_genai_message(msg: ChatMessage) -> ProviderResult<Vec<GenaiMessage>> {
    let parts = match msg.content {
        MessageContent::Text(text) => return Ok(vec![text_message(msg.role, text)]),
        MessageContent::Parts(parts) => parts,
    };

    let mut converted = Vec::new();
    let mut text = String::new();
    let mut calls = Vec::new();

    for part in parts {
        match part {
            ContentPart::Text { text: t } => text.push_str(&t),
            ContentPart::ToolUse { id, name, input, native } => {
                calls.push(to_genai_tool_call(&id, &name, &input, native.as_ref())?);
            }
            ContentPart::ToolResult { tool_use_id, content, .. } => {
                converted.push(GenaiMessage::from(GenaiToolResponse::new(
                    tool_use_id,
                    content.to_string(),
                )));
            }
        }
    }

    if !text.is_empty() {
        converted.insert(0, text_message(msg.role, text));
    }
    if !calls.is_empty() {
        converted.push(GenaiMessage::from(calls));
    }
    Ok(converted)
}

/// Convert the whole conversation, preserving turn order
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> ProviderResult<Vec<GenaiMessage>> {
    let mut converted = Vec::with_capacity(messages.len());
    for msg in messages {
        converted.extend(to_genai_message(msg)?);
    }
    Ok(converted)
}

// ============================================================================
// Tool Conversion: medchat -> genai
// ============================================================================

/// Convert a Tool declaration to a genai Tool
pub fn to_genai_tool(tool: &Tool) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(&tool.name).with_description(&tool.description);

    if let Some(schema) = &tool.input_schema {
        genai_tool = genai_tool.with_schema(schema.clone());
    }

    genai_tool
}

/// genai takes a flat tool list; bundles are flattened in registration order
pub fn to_genai_tools(bundles: &[ToolBundle]) -> Vec<GenaiTool> {
    bundles
        .iter()
        .flat_map(|bundle| bundle.tools.iter().map(to_genai_tool))
        .collect()
}

// ============================================================================
// Options Conversion
// ============================================================================

/// Convert StreamChatOptions to genai ChatOptions
pub fn to_genai_options(options: &StreamChatOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    // Calls are only captured, never executed model-side
    genai_opts.with_capture_tool_calls(true)
}

// ============================================================================
// Response Conversion: genai -> medchat
// ============================================================================

/// Convert a genai ToolCall
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    let call = ToolCall::new(tc.call_id.clone(), tc.fn_name.clone(), tc.fn_arguments.clone());
    match serde_json::to_value(tc) {
        Ok(native) => call.with_native(native),
        Err(_) => call,
    }
}

/// Convert a genai stream event into zero or more chunks.
///
/// Tool calls are taken from the end event once fully assembled; partial
/// tool-call chunks are dropped. Thought signatures travel inside each
/// captured call's native form, so the standalone signature chunks are
/// skipped.
pub fn from_genai_event(event: ChatStreamEvent) -> Vec<ProviderResult<StreamChunk>> {
    match event {
        ChatStreamEvent::Chunk(chunk) if !chunk.content.is_empty() => {
            vec![Ok(StreamChunk::text(chunk.content))]
        }
        ChatStreamEvent::End(end) => end
            .captured_tool_calls()
            .map(|calls| {
                calls
                    .iter()
                    .map(|tc| Ok(StreamChunk::tool_call(from_genai_tool_call(tc))))
                    .collect()
            })
            .unwrap_or_default(),
        ChatStreamEvent::Chunk(_)
        | ChatStreamEvent::Start
        | ChatStreamEvent::ToolCallChunk(_)
        | ChatStreamEvent::ReasoningChunk(_)
        | ChatStreamEvent::ThoughtSignatureChunk(_) => Vec::new(),
    }
}

// ============================================================================
// Auth
// ============================================================================

/// Whether a provider refuses requests without a key
pub fn requires_api_key(provider: &str) -> bool {
    !matches!(provider.to_lowercase().as_str(), "ollama" | "mock")
}

/// Explicit key first, then the secret store under the provider's name
pub fn resolve_api_key(
    provider: &str,
    explicit: Option<&str>,
    secrets: &dyn SecretStore,
) -> Option<String> {
    explicit
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| secrets.get(provider))
}

// ============================================================================
// Client Creation with Custom Auth
// ============================================================================

/// Routing data for one client
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier (e.g., "gemini", "azure", "openrouter")
    pub provider: String,
    /// Resolved API key
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

/// Create a genai Client with our auth and endpoint resolution
pub fn create_client(config: &ProviderConfig) -> Client {
    let auth_key = config.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = auth_key.clone();
            // None lets genai handle providers that work without auth
            Box::pin(async move { Ok(key.map(AuthData::from_single)) })
        },
    );

    let target_provider = config.provider.to_lowercase();
    let target_api_base = config.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let base = |default: &'static str| {
                target_api_base
                    .as_ref()
                    .map(|u| Endpoint::from_owned(u.clone()))
                    .unwrap_or_else(|| Endpoint::from_static(default))
            };

            // OpenAI-compatible providers; native genai providers resolve normally
            let endpoint = match target_provider.as_str() {
                "azure" => base("https://your-resource.openai.azure.com/"),
                "openrouter" => base("https://openrouter.ai/api/v1/"),
                "mistral" => base("https://api.mistral.ai/v1/"),
                _ => match &target_api_base {
                    Some(url) => Endpoint::from_owned(url.clone()),
                    None => return Ok(target),
                },
            };

            let adapter_kind = match target_provider.as_str() {
                "azure" | "openrouter" | "mistral" => AdapterKind::OpenAI,
                _ => target.model.adapter_kind,
            };

            Ok(ServiceTarget {
                endpoint,
                auth: target.auth,
                model: ModelIden::new(adapter_kind, target.model.model_name.clone()),
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

/// Check if a provider is natively supported by genai
pub fn is_genai_native(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai"
            | "anthropic"
            | "gemini"
            | "ollama"
            | "groq"
            | "xai"
            | "deepseek"
            | "cohere"
            | "fireworks"
            | "together"
    )
}

/// Check if a provider can be handled by genai (native or via OpenAI-compat)
pub fn is_genai_supported(provider: &str) -> bool {
    is_genai_native(provider)
        || matches!(provider.to_lowercase().as_str(), "azure" | "openrouter" | "mistral")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;
    use crate::types::ToolResult;
    use serde_json::json;

    #[test]
    fn test_role_conversion() {
        assert!(matches!(to_genai_role(MessageRole::System), GenaiRole::System));
        assert!(matches!(to_genai_role(MessageRole::User), GenaiRole::User));
        assert!(matches!(to_genai_role(MessageRole::Assistant), GenaiRole::Assistant));
        assert!(matches!(to_genai_role(MessageRole::Tool), GenaiRole::Tool));
    }

    #[test]
    fn test_text_message_conversion() {
        let converted = to_genai_message(ChatMessage::user("Any trials for asthma?")).unwrap();
        assert_eq!(converted.len(), 1);
        assert!(matches!(converted[0].role, GenaiRole::User));
    }

    #[test]
    fn test_tool_turns_conversion() {
        let call = ToolCall::new("c1", "search_trials", json!({"condition": "asthma"}));
        let messages = vec![
            ChatMessage::user("Any trials for asthma?"),
            ChatMessage::assistant_tool_calls("Checking.", &[call]),
            ChatMessage::tool_result(&ToolResult::success("c1", "search_trials", json!("3 trials"))),
        ];

        let converted = to_genai_messages(messages).unwrap();
        assert_eq!(converted.len(), 4);
        assert!(matches!(converted[1].role, GenaiRole::Assistant));
        assert!(matches!(converted[2].role, GenaiRole::Assistant));
        assert!(matches!(converted[3].role, GenaiRole::Tool));
    }

    #[test]
    fn test_tool_bundles_flatten_in_order() {
        let mut fda = ToolBundle::new("openFDA");
        fda.tools.push(Tool::new("get_drug_label", "Drug label lookup"));
        let mut pdb = ToolBundle::new("pdb");
        pdb.tools.push(
            Tool::new("get_structure", "Fetch a PDB entry")
                .with_schema(json!({"type": "object", "properties": {"pdb_id": {"type": "string"}}})),
        );

        let tools = to_genai_tools(&[fda, pdb]);
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "get_drug_label");
        assert_eq!(tools[1].name, "get_structure");
    }

    #[test]
    fn test_from_genai_tool_call() {
        let genai_call = to_genai_tool_call("c7", "get_structure", &json!({"pdb_id": "1ABC"}), None).unwrap();
        let call = from_genai_tool_call(&genai_call);
        assert_eq!(call.id, "c7");
        assert_eq!(call.name, "get_structure");
        assert_eq!(call.get_arg_str("pdb_id"), Some("1ABC"));
        assert!(call.native.is_some());
    }

    #[test]
    fn test_captured_call_replays_in_native_form() {
        let genai_call = to_genai_tool_call("c7", "get_structure", &json!({"pdb_id": "1ABC"}), None).unwrap();
        let captured = from_genai_tool_call(&genai_call);

        // The assistant turn keeps the native form through the conversation
        let turn = ChatMessage::assistant_tool_calls("", &[captured.clone()]);
        let stored = turn.tool_uses();
        assert_eq!(stored[0].native, captured.native);

        let replayed = to_genai_tool_call("ignored", "ignored", &json!({}), stored[0].native.as_ref()).unwrap();
        assert_eq!(
            serde_json::to_value(&replayed).unwrap(),
            serde_json::to_value(&genai_call).unwrap()
        );
        assert_eq!(replayed.call_id, "c7");
    }

    #[test]
    fn test_resolve_api_key_prefers_explicit() {
        let secrets = MemorySecretStore::new();
        secrets.insert("gemini", "from-store");

        assert_eq!(
            resolve_api_key("gemini", Some("explicit"), &secrets),
            Some("explicit".to_string())
        );
        assert_eq!(resolve_api_key("gemini", Some(""), &secrets), Some("from-store".to_string()));
        assert_eq!(resolve_api_key("gemini", None, &secrets), Some("from-store".to_string()));
        assert_eq!(resolve_api_key("openai", None, &secrets), None);
    }

    #[test]
    fn test_provider_detection() {
        assert!(is_genai_native("gemini"));
        assert!(!is_genai_native("azure"));
        assert!(is_genai_supported("openrouter"));
        assert!(is_genai_supported("mistral"));
        assert!(!is_genai_supported("unknown_provider"));

        assert!(requires_api_key("gemini"));
        assert!(!requires_api_key("ollama"));
    }
}
