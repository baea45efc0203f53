//! Chat loop settings

use serde::{Deserialize, Serialize};

/// Which of the model's requested tool calls are executed per cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchPolicy {
    /// Only the first requested call is executed
    #[default]
    First,
    /// Every requested call is executed, in order, before the model is invoked again
    All,
}

impl std::str::FromStr for DispatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(DispatchPolicy::First),
            "all" => Ok(DispatchPolicy::All),
            other => Err(format!("unknown dispatch policy '{}' (expected 'first' or 'all')", other)),
        }
    }
}

/// Settings for the model side of the chat loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatSettings {
    /// LLM provider id (e.g. "gemini", "openai", "mock")
    pub provider: String,
    /// Model name as used by the provider's API
    pub model: String,
    /// Cap on generated tokens per model invocation
    pub max_output_tokens: u32,
    /// API key; resolved from the secret store when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub dispatch: DispatchPolicy,
    /// Per tool call time limit; unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_timeout_secs: Option<u64>,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            max_output_tokens: 2048,
            api_key: None,
            api_base: None,
            temperature: None,
            dispatch: DispatchPolicy::First,
            tool_timeout_secs: None,
        }
    }
}

impl ChatSettings {
    /// Set the provider and model
    pub fn with_model(mut self, provider: impl Into<String>, model: impl Into<String>) -> Self {
        self.provider = provider.into();
        self.model = model.into();
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchPolicy) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_tool_timeout(mut self, secs: u64) -> Self {
        self.tool_timeout_secs = Some(secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ChatSettings::default();
        assert_eq!(settings.provider, "gemini");
        assert_eq!(settings.max_output_tokens, 2048);
        assert_eq!(settings.dispatch, DispatchPolicy::First);
        assert!(settings.tool_timeout_secs.is_none());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let settings: ChatSettings =
            serde_json::from_str(r#"{"model": "gemini-2.0-flash", "dispatch": "all"}"#).unwrap();
        assert_eq!(settings.provider, "gemini");
        assert_eq!(settings.model, "gemini-2.0-flash");
        assert_eq!(settings.dispatch, DispatchPolicy::All);
        assert_eq!(settings.max_output_tokens, 2048);
    }

    #[test]
    fn test_dispatch_from_str() {
        assert_eq!("ALL".parse::<DispatchPolicy>(), Ok(DispatchPolicy::All));
        assert_eq!("first".parse::<DispatchPolicy>(), Ok(DispatchPolicy::First));
        assert!("some".parse::<DispatchPolicy>().is_err());
    }
}
