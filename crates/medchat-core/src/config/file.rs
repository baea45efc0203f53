//! Host descriptor file (JSON or YAML)
//!
//! Uses the standard MCP host layout:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "openFDA": { "command": "uv", "args": ["run", "openFDA_server.py"] },
//!     "pdb": { "url": "http://localhost:8001/mcp" }
//!   },
//!   "chat": { "model": "gemini-2.5-flash", "maxOutputTokens": 2048 }
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::settings::ChatSettings;

/// Launch/attach parameters for one tool provider.
///
/// Values are passed through to the transport unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerConfig {
    /// Spawn a child process and speak MCP over its stdio
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        env: HashMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<PathBuf>,
    },
    /// Attach to a running provider over streamable HTTP
    Http { url: String },
}

impl ServerConfig {
    /// A stdio provider with no extra environment
    pub fn stdio(command: impl Into<String>, args: Vec<String>) -> Self {
        ServerConfig::Stdio {
            command: command.into(),
            args,
            env: HashMap::new(),
            cwd: None,
        }
    }

    pub fn http(url: impl Into<String>) -> Self {
        ServerConfig::Http { url: url.into() }
    }
}

/// The complete host descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Named tool providers, in file order
    #[serde(rename = "mcpServers", default)]
    pub mcp_servers: IndexMap<String, ServerConfig>,

    #[serde(default)]
    pub chat: ChatSettings,
}

impl HostConfig {
    /// Load a descriptor; `.yaml`/`.yml` files are parsed as YAML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))
            }
            _ => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Default descriptor location (~/.config/medchat/server_config.json on Linux)
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("medchat").join("server_config.json")
    }

    /// Add a provider (builder style, used by embedders and tests)
    pub fn with_server(mut self, name: impl Into<String>, server: ServerConfig) -> Self {
        self.mcp_servers.insert(name.into(), server);
        self
    }
}
