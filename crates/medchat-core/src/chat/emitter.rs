//! Response emitter
//!
//! A chat turn is produced once, as a lazy stream of `ChatEvent`s. Sinks
//! decide what to do with it: buffer the answer, print it, or hand plain-text
//! units to a transport that flushes each one.

use std::fmt;
use std::io::Write;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use serde_json::Value;

use crate::types::ToolCall;

use super::error::ChatResult;
use super::tool_loop::{LoopState, ToolLoop};

/// One unit of turn output
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// A tool is about to be called
    ToolCall { name: String, arguments: Value },
    /// A piece of the final answer
    Text(String),
}

impl ChatEvent {
    pub fn announce(call: &ToolCall) -> Self {
        ChatEvent::ToolCall {
            name: call.name.clone(),
            arguments: call.input.clone(),
        }
    }
}

impl fmt::Display for ChatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatEvent::ToolCall { name, arguments } => {
                writeln!(f, "[CALLING TOOL: {} with args {}]", name, arguments)
            }
            ChatEvent::Text(text) => f.write_str(text),
        }
    }
}

/// How the final answer is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitMode {
    /// The answer arrives as one unit once the loop is done
    #[default]
    Batch,
    /// One unit per character, yielding to the runtime after each
    Streaming,
}

pub type ChatStream = Pin<Box<dyn Stream<Item = ChatResult<ChatEvent>> + Send>>;

/// Run `tool_loop` lazily, announcing each tool call before it is dispatched.
///
/// An empty final answer produces no text events. A failed step ends the
/// stream with that error.
pub fn chat_stream(mut tool_loop: ToolLoop, mode: EmitMode) -> ChatStream {
    Box::pin(async_stream::stream! {
        loop {
            match tool_loop.state() {
                LoopState::Done => break,
                LoopState::DispatchingTool => {
                    let announcement = tool_loop.next_call().map(ChatEvent::announce);
                    if let Some(event) = announcement {
                        yield Ok(event);
                    }
                }
                LoopState::AwaitingModel => {}
            }

            if let Err(e) = tool_loop.step().await {
                yield Err(e);
                return;
            }
        }

        let answer = tool_loop.answer().unwrap_or_default().to_string();
        match mode {
            EmitMode::Batch => {
                if !answer.is_empty() {
                    yield Ok(ChatEvent::Text(answer));
                }
            }
            EmitMode::Streaming => {
                for unit in answer.chars() {
                    yield Ok(ChatEvent::Text(unit.to_string()));
                    tokio::task::yield_now().await;
                }
            }
        }
    })
}

/// Buffer sink: the concatenated answer text, announcements dropped
pub async fn collect_answer(mut stream: ChatStream) -> ChatResult<String> {
    let mut answer = String::new();
    while let Some(event) = stream.next().await {
        if let ChatEvent::Text(text) = event? {
            answer.push_str(&text);
        }
    }
    Ok(answer)
}

/// Print sink: renders every event to `out`, flushing after each.
///
/// Returns the answer text.
pub async fn write_to<W: Write>(mut stream: ChatStream, out: &mut W) -> ChatResult<String> {
    let mut answer = String::new();
    while let Some(event) = stream.next().await {
        let event = event?;
        write!(out, "{}", event)?;
        out.flush()?;
        if let ChatEvent::Text(text) = event {
            answer.push_str(&text);
        }
    }
    Ok(answer)
}

/// Transport sink: every event rendered as a plain-text unit
pub fn text_stream(stream: ChatStream) -> Pin<Box<dyn Stream<Item = ChatResult<String>> + Send>> {
    Box::pin(stream.map(|event| event.map(|e| e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatError;
    use crate::config::ChatSettings;
    use crate::llm::{MockProvider, MockReply};
    use crate::logging::{Logger, NoOpLogger};
    use crate::test_support::FakeToolProvider;
    use crate::tools::ToolRegistry;
    use serde_json::json;
    use std::sync::Arc;

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    fn turn(replies: Vec<MockReply>, mode: EmitMode) -> ChatStream {
        let mut registry = ToolRegistry::new(logger());
        registry.register(Arc::new(FakeToolProvider::new("pdb", &["get_structure"])));
        let tool_loop = ToolLoop::new(
            "query",
            Arc::new(MockProvider::scripted(replies, logger())),
            Arc::new(registry),
            &ChatSettings::default(),
            logger(),
        );
        chat_stream(tool_loop, mode)
    }

    async fn events(stream: ChatStream) -> Vec<ChatResult<ChatEvent>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_streaming_emits_one_event_per_character() {
        let answer = "Hémoglobine 🧬 binds O2";
        let events = events(turn(vec![MockReply::text(answer)], EmitMode::Streaming)).await;

        assert_eq!(events.len(), answer.chars().count());
        let joined: String = events
            .into_iter()
            .map(|e| match e.unwrap() {
                ChatEvent::Text(t) => t,
                other => panic!("unexpected event: {:?}", other),
            })
            .collect();
        assert_eq!(joined, answer);
    }

    #[tokio::test]
    async fn test_batch_emits_answer_once() {
        let events = events(turn(vec![MockReply::text("Final answer.")], EmitMode::Batch)).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), &ChatEvent::Text("Final answer.".to_string()));
    }

    #[tokio::test]
    async fn test_empty_answer_emits_nothing() {
        assert!(events(turn(vec![MockReply::text("")], EmitMode::Streaming)).await.is_empty());
        assert!(events(turn(vec![MockReply::text("")], EmitMode::Batch)).await.is_empty());
    }

    #[tokio::test]
    async fn test_tool_call_announced_before_answer() {
        let stream = turn(
            vec![
                MockReply::call("c1", "get_structure", json!({"pdb_id": "1ABC"})),
                MockReply::text("ok"),
            ],
            EmitMode::Streaming,
        );
        let rendered: Vec<String> = text_stream(stream)
            .map(|unit| unit.unwrap())
            .collect()
            .await;

        assert_eq!(
            rendered,
            vec![
                "[CALLING TOOL: get_structure with args {\"pdb_id\":\"1ABC\"}]\n".to_string(),
                "o".to_string(),
                "k".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_model_error_ends_the_stream() {
        let events = events(turn(vec![MockReply::Fail("boom".into())], EmitMode::Streaming)).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(ChatError::ModelInvocation(_))));
    }

    #[tokio::test]
    async fn test_collect_answer_drops_announcements() {
        let stream = turn(
            vec![
                MockReply::call("c1", "get_structure", json!({})),
                MockReply::text("Resolution 2.1 Å"),
            ],
            EmitMode::Streaming,
        );
        assert_eq!(collect_answer(stream).await.unwrap(), "Resolution 2.1 Å");
    }

    #[tokio::test]
    async fn test_write_to_prints_everything() {
        let stream = turn(
            vec![MockReply::call("c1", "get_structure", json!({})), MockReply::text("done")],
            EmitMode::Batch,
        );
        let mut out = Vec::new();
        let answer = write_to(stream, &mut out).await.unwrap();

        assert_eq!(answer, "done");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[CALLING TOOL: get_structure with args {}]\ndone"
        );
    }
}
