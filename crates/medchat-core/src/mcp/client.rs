//! MCP connection using the official rmcp SDK
//!
//! Launches a provider over stdio or attaches over HTTP, performs the
//! `initialize` handshake and lists the provider's tools once.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rmcp::{
    model::{
        CallToolRequestParams, ClientCapabilities, ClientInfo, Content, Implementation, RawContent,
    },
    service::{Peer, RunningService},
    transport::{ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess},
    RoleClient, ServiceExt,
};
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;

use crate::config::ServerConfig;
use crate::logging::Logger;
use crate::tools::{ToolCallResult, ToolError, ToolProvider};
use crate::types::Tool;

use super::schema::clean_schema;
use super::McpTool;

/// MCP connection errors
#[derive(Error, Debug)]
pub enum McpError {
    /// Launch, handshake or tool listing failed
    #[error("Provider {server} unreachable: {reason}")]
    Unreachable { server: String, reason: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection to {0} is closed")]
    Closed(String),
}

impl McpError {
    fn unreachable(server: &str, reason: impl std::fmt::Display) -> Self {
        Self::Unreachable {
            server: server.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;

type ClientService = RunningService<RoleClient, ClientInfo>;

/// One live connection to a tool-provider process
pub struct McpConnection {
    /// Provider name from the descriptor
    name: String,
    /// Tools listed at connect time, schemas cleaned
    tools: Vec<Tool>,
    /// Request handle; rmcp multiplexes concurrent requests by id
    peer: Peer<RoleClient>,
    /// Owned transport, taken exactly once by `close`
    service: Mutex<Option<ClientService>>,
    logger: Arc<dyn Logger>,
}

impl McpConnection {
    /// Launch or attach to a provider, handshake, and list its tools
    pub async fn connect(
        name: &str,
        config: &ServerConfig,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        let service = match config {
            ServerConfig::Stdio { command, args, env, cwd } => {
                Self::spawn_stdio(name, command, args, env, cwd.as_ref(), &logger).await?
            }
            ServerConfig::Http { url } => Self::attach_http(name, url, &logger).await?,
        };

        let peer = service.peer().clone();
        let listed = match peer.list_all_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                // Release the half-open transport before reporting
                if let Err(cancel_err) = service.cancel().await {
                    logger.warn(&format!("[McpConnection] {}: teardown failed: {}", name, cancel_err));
                }
                return Err(McpError::unreachable(name, format!("tools/list failed: {}", e)));
            }
        };

        let tools: Vec<Tool> = listed.into_iter().map(tool_from_mcp).collect();
        logger.info(&format!(
            "[McpConnection] Connected to {} with tools: {:?}",
            name,
            tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
        ));

        Ok(Self {
            name: name.to_string(),
            tools,
            peer,
            service: Mutex::new(Some(service)),
            logger,
        })
    }

    async fn spawn_stdio(
        name: &str,
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
        cwd: Option<&PathBuf>,
        logger: &Arc<dyn Logger>,
    ) -> McpResult<ClientService> {
        logger.info(&format!("[McpConnection] Launching {}: {} {:?}", name, command, args));

        let transport = TokioChildProcess::new(Command::new(command).configure(|cmd| {
            cmd.args(args).envs(env);
            if let Some(dir) = cwd {
                cmd.current_dir(dir);
            }
        }))
        .map_err(|e| McpError::unreachable(name, format!("launch failed: {}", e)))?;

        client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::unreachable(name, format!("handshake failed: {}", e)))
    }

    async fn attach_http(
        name: &str,
        url: &str,
        logger: &Arc<dyn Logger>,
    ) -> McpResult<ClientService> {
        logger.info(&format!("[McpConnection] Connecting to {} over HTTP: {}", name, url));

        let transport = StreamableHttpClientTransport::from_uri(url.to_string());

        client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::unreachable(name, format!("handshake failed: {}", e)))
    }

    /// Whether `close` already ran
    pub fn is_closed(&self) -> bool {
        self.service.lock().is_none()
    }
}

#[async_trait]
impl ToolProvider for McpConnection {
    fn name(&self) -> &str {
        &self.name
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolCallResult {
        if self.is_closed() {
            return Err(ToolError::execution(name, McpError::Closed(self.name.clone()).to_string()));
        }

        self.logger.debug(&format!("[McpConnection] {}: tools/call {}", self.name, name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        let result = self
            .peer
            .call_tool(params)
            .await
            .map_err(|e| ToolError::execution(name, McpError::Protocol(e.to_string()).to_string()))?;

        let content = result_content(&result.content);
        if result.is_error.unwrap_or(false) {
            let message = match content {
                Value::String(text) => text,
                other => other.to_string(),
            };
            return Err(ToolError::execution(name, message));
        }
        Ok(content)
    }

    async fn close(&self) {
        let service = self.service.lock().take();
        if let Some(service) = service {
            self.logger.info(&format!("[McpConnection] Closing connection to {}", self.name));
            if let Err(e) = service.cancel().await {
                self.logger.warn(&format!("[McpConnection] {}: teardown failed: {}", self.name, e));
            }
        }
    }
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "medchat".to_string(),
            title: Some("MedChat Host".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

/// Convert an rmcp declaration, cleaning its input schema
fn tool_from_mcp(tool: McpTool) -> Tool {
    let schema = Value::Object(tool.input_schema.as_ref().clone());
    Tool {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
        input_schema: Some(clean_schema(&schema)),
    }
}

/// Text-only results collapse to one string; anything else stays structured
fn result_content(content: &[Content]) -> Value {
    let texts: Vec<&str> = content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect();

    if !texts.is_empty() && texts.len() == content.len() {
        Value::String(texts.join("\n"))
    } else {
        serde_json::to_value(content).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    #[test]
    fn test_tool_from_mcp_cleans_schema() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "additionalProperties": false,
            "properties": { "pdb_id": { "type": "string" } }
        });
        let object = schema.as_object().cloned().unwrap();
        let tool = tool_from_mcp(McpTool::new("get_structure", "Fetch a PDB entry", Arc::new(object)));

        assert_eq!(tool.name, "get_structure");
        assert_eq!(tool.description, "Fetch a PDB entry");
        assert_eq!(
            tool.input_schema,
            Some(json!({"type": "object", "properties": { "pdb_id": { "type": "string" } }}))
        );
    }

    #[test]
    fn test_result_content_joins_text() {
        let content = vec![Content::text("NCT0001: Asthma study"), Content::text("NCT0002: Flu study")];
        assert_eq!(
            result_content(&content),
            json!("NCT0001: Asthma study\nNCT0002: Flu study")
        );
    }

    #[test]
    fn test_result_content_empty_is_structured() {
        assert_eq!(result_content(&[]), json!([]));
    }

    #[tokio::test]
    async fn test_connect_unlaunchable_provider_is_unreachable() {
        let server = ServerConfig::stdio("/nonexistent/medchat-provider-binary", vec![]);
        let result = McpConnection::connect("ghost", &server, Arc::new(NoOpLogger::new())).await;

        match result {
            Err(McpError::Unreachable { server, .. }) => assert_eq!(server, "ghost"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("connecting to a missing binary should fail"),
        }
    }
}
