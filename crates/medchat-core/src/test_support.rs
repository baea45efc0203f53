//! Shared fakes for unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::tools::{ToolCallResult, ToolError, ToolProvider};
use crate::types::Tool;

/// In-process tool provider that answers `"<tool> ok"` and records calls
pub struct FakeToolProvider {
    name: String,
    tools: Vec<Tool>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, Value)>>,
    closes: AtomicUsize,
}

impl FakeToolProvider {
    pub fn new(name: &str, tools: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            tools: tools
                .iter()
                .map(|t| {
                    Tool::new(*t, format!("{} tool", t))
                        .with_schema(json!({"type": "object", "properties": {}}))
                })
                .collect(),
            failure: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
        }
    }

    /// Every call fails with `message`
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolProvider for FakeToolProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolCallResult {
        self.calls.lock().push((name.to_string(), arguments));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(message) => Err(ToolError::execution(name, message.clone())),
            None => Ok(json!(format!("{} ok", name))),
        }
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
