//! Orchestration loop and response emitter
//!
//! - `ToolLoop`: drives one query through model invocations and tool
//!   dispatches until the model answers without requesting tools
//! - `chat_stream`: wraps a loop as a lazy stream of `ChatEvent`s
//! - sinks (`collect_answer`, `write_to`, `text_stream`) adapt that stream to
//!   batch, console and transport delivery
//!
//! ```rust,ignore
//! let tool_loop = ToolLoop::new(query, model, registry, &settings, logger);
//! let answer = collect_answer(chat_stream(tool_loop, EmitMode::Batch)).await?;
//! ```

mod conversation;
mod emitter;
mod error;
mod tool_loop;

pub use conversation::ConversationState;
pub use emitter::{chat_stream, collect_answer, text_stream, write_to, ChatEvent, ChatStream, EmitMode};
pub use error::{ChatError, ChatResult};
pub use tool_loop::{LoopState, ToolLoop};
