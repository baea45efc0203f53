//! Tool registry for routing model-issued tool calls
//!
//! The ToolRegistry is the central component for:
//! - Aggregating the declarations of every connected provider
//! - Presenting them to the LLM as one bundle per provider
//! - Resolving a tool name to the provider that owns it
//! - Executing tool calls and turning every outcome into a `ToolResult`
//!
//! Registration happens once at startup; afterwards the registry is shared
//! read-only between concurrent chat turns.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::logging::Logger;
use crate::types::{ToolBundle, ToolCall, ToolResult};

use super::error::ToolError;
use super::provider::SharedToolProvider;

/// Registry of the tools exposed by all connected providers
pub struct ToolRegistry {
    /// Tool name → owning provider
    routes: HashMap<String, SharedToolProvider>,
    /// Per-provider declarations in registration order
    bundles: Vec<ToolBundle>,
    /// Optional limit for a single tool call
    call_timeout: Option<Duration>,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            routes: HashMap::new(),
            bundles: Vec::new(),
            call_timeout: None,
            logger,
        }
    }

    /// Bound every tool call by `timeout`
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Register every tool a provider declares.
    ///
    /// On a name collision the later provider wins. The shadowed declaration is
    /// removed from the earlier bundle so the model is never offered a tool the
    /// routes would send elsewhere.
    pub fn register(&mut self, provider: SharedToolProvider) {
        let mut bundle = ToolBundle::new(provider.name());

        for tool in provider.tools() {
            if let Some(previous) = self.routes.insert(tool.name.clone(), Arc::clone(&provider)) {
                self.logger.warn(&format!(
                    "[ToolRegistry] Tool '{}' from '{}' replaces the one from '{}'",
                    tool.name,
                    provider.name(),
                    previous.name()
                ));
                for earlier in &mut self.bundles {
                    earlier.tools.retain(|t| t.name != tool.name);
                }
                bundle.tools.retain(|t| t.name != tool.name);
            }
            bundle.tools.push(tool.clone());
        }

        self.logger.info(&format!(
            "[ToolRegistry] Registered {} tools from '{}'",
            bundle.tools.len(),
            provider.name()
        ));
        self.bundles.push(bundle);
    }

    /// Find the provider that owns `name`
    pub fn resolve(&self, name: &str) -> Result<SharedToolProvider, ToolError> {
        self.routes
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Tool bundles for every model request, one per registered provider
    pub fn bundles(&self) -> &[ToolBundle] {
        &self.bundles
    }

    /// Execute a tool call from an LLM response.
    ///
    /// Never fails: unknown tools, provider errors and timeouts become error
    /// results the model can react to.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let outcome = match self.resolve(&call.name) {
            Ok(provider) => {
                self.logger.info(&format!(
                    "[ToolRegistry] Calling tool {} on '{}' with args {}",
                    call.name,
                    provider.name(),
                    call.input
                ));
                let pending = provider.call_tool(&call.name, call.input.clone());
                match self.call_timeout {
                    Some(limit) => tokio::time::timeout(limit, pending).await.unwrap_or_else(|_| {
                        Err(ToolError::Timeout {
                            tool: call.name.clone(),
                            secs: limit.as_secs(),
                        })
                    }),
                    None => pending.await,
                }
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(content) => ToolResult::success(call.id.clone(), call.name.clone(), content),
            Err(e) => {
                self.logger.warn(&format!("[ToolRegistry] {}", e));
                ToolResult::error(call.id.clone(), call.name.clone(), e.to_string())
            }
        }
    }

    /// Number of routable tool names
    pub fn tool_count(&self) -> usize {
        self.routes.len()
    }

    /// Routable tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.routes.keys().cloned().collect();
        names.sort();
        names
    }
}
