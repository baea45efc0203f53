//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Tool declaration as presented to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (function name)
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters, already cleaned for the model API
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl Tool {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// The declarations of one tool provider, sent to the model as one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolBundle {
    /// Name of the provider that owns these tools
    pub provider: String,
    /// Declarations in the order the provider listed them
    pub tools: Vec<Tool>,
}

impl ToolBundle {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            tools: Vec::new(),
        }
    }
}

/// Tool call from the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Input arguments for the tool
    pub input: Value,
    /// The model API's own form of this call. Gemini thinking models attach
    /// thought signatures here and reject a follow-up turn that drops them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<Value>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
            native: None,
        }
    }

    /// Keep the model API's form of the call for replay
    pub fn with_native(mut self, native: Value) -> Self {
        self.native = Some(native);
        self
    }

    /// Get an input argument by key
    pub fn get_arg(&self, key: &str) -> Option<&Value> {
        self.input.get(key)
    }

    /// Get an input argument as a string
    pub fn get_arg_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(|v| v.as_str())
    }

    /// Get an input argument as an i64
    pub fn get_arg_i64(&self, key: &str) -> Option<i64> {
        self.input.get(key).and_then(|v| v.as_i64())
    }
}

/// Tool result to send back to LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is responding to
    #[serde(rename = "callId")]
    pub call_id: String,
    /// Name of the tool that was called
    pub name: String,
    /// Provider output on success, error message on failure
    pub content: Value,
    /// Whether this result represents an error
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(call_id: impl Into<String>, name: impl Into<String>, content: Value) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            content,
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(call_id: impl Into<String>, name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            content: Value::String(error.into()),
            is_error: true,
        }
    }

    /// The structured payload appended to the conversation
    pub fn payload(&self) -> Value {
        if self.is_error {
            json!({ "error": self.content })
        } else {
            json!({ "result": self.content })
        }
    }
}

/// Tool choice option for requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide whether to request tools
    #[default]
    Auto,
    /// Don't use tools
    None,
    /// Force a tool request
    Required,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_creation() {
        let tool = Tool::new("get_drug_label", "Look up an FDA drug label")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "drug_name": { "type": "string" }
                },
                "required": ["drug_name"]
            }));

        assert_eq!(tool.name, "get_drug_label");
        assert!(tool.input_schema.is_some());
    }

    #[test]
    fn test_tool_call_args() {
        let call = ToolCall::new(
            "call_123",
            "search_trials",
            json!({
                "condition": "asthma",
                "max_results": 5
            }),
        );

        assert_eq!(call.get_arg_str("condition"), Some("asthma"));
        assert_eq!(call.get_arg_i64("max_results"), Some(5));
        assert_eq!(call.get_arg_str("nonexistent"), None);
    }

    #[test]
    fn test_tool_result_payload() {
        let success = ToolResult::success("call_123", "get_structure", json!("1ABC: lysozyme"));
        assert!(!success.is_error);
        assert_eq!(success.payload(), json!({"result": "1ABC: lysozyme"}));

        let error = ToolResult::error("call_456", "get_structure", "PDB id not found");
        assert!(error.is_error);
        assert_eq!(error.payload(), json!({"error": "PDB id not found"}));
    }
}
