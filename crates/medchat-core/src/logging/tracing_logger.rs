//! Logger backed by the `tracing` crate

use super::traits::Logger;

/// Forwards log calls to `tracing` events under the `medchat` target
///
/// The binary installs a `tracing-subscriber` formatter; library code stays
/// unaware of which subscriber is active.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "medchat", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "medchat", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "medchat", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "medchat", "{}", message);
    }
}
