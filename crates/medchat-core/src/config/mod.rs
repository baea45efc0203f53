//! Host configuration
//!
//! The descriptor names every tool provider (MCP server) and optionally tunes
//! the chat loop:
//! - `HostConfig`: the whole descriptor, loaded from JSON or YAML
//! - `ServerConfig`: how to launch or reach one provider
//! - `ChatSettings`: model selection, output cap, dispatch policy

mod error;
mod file;
mod settings;

pub use error::{ConfigError, ConfigResult};
pub use file::{HostConfig, ServerConfig};
pub use settings::{ChatSettings, DispatchPolicy};
