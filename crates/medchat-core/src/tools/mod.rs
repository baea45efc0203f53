//! Tool registry and the provider seam
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  ToolRegistry                                │
//! │                                              │
//! │  - name → provider map (last write wins)     │
//! │  - one bundle per provider, sent to the LLM  │
//! │  - dispatch(): tool call → ToolResult value  │
//! └──────────────────────────────────────────────┘
//!           │
//!           │ ToolProvider::call_tool
//!           ▼
//! ┌──────────────────────────────────────────────┐
//! │  McpConnection (one per MCP server process)  │
//! │    openFDA, clinicaltrials, pdb, ...         │
//! └──────────────────────────────────────────────┘
//! ```

mod error;
mod provider;
mod registry;

pub use error::{ToolError, ToolCallResult};
pub use provider::{ToolProvider, SharedToolProvider};
pub use registry::ToolRegistry;
