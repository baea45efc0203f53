//! MCP (Model Context Protocol) tool-provider connections
//!
//! Uses the official rmcp SDK. Each configured server gets one
//! `McpConnection`, launched as a child process (stdio) or attached over
//! streamable HTTP.
//!
//! # Example
//!
//! ```rust,ignore
//! use medchat_core::config::ServerConfig;
//! use medchat_core::mcp::McpConnection;
//!
//! let server = ServerConfig::stdio("uv", vec!["run".into(), "openFDA_server.py".into()]);
//! let connection = McpConnection::connect("openFDA", &server, logger).await?;
//!
//! // Declarations with cleaned schemas
//! for tool in connection.tools() {
//!     println!("{}", tool.name);
//! }
//!
//! let result = connection.call_tool("get_drug_label", json!({"drug_name": "aspirin"})).await;
//! connection.close().await;
//! ```

mod client;
mod schema;

pub use client::{McpConnection, McpError, McpResult};
pub use schema::{clean_schema, STRIPPED_KEYS};

// Re-export rmcp types that consumers might need
pub use rmcp::model::Tool as McpTool;
