//! Logging abstractions for runtime-agnostic logging
//!
//! Components take an `Arc<dyn Logger>`; the host picks the backend.

mod traits;
mod noop;
mod console;
mod tracing_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use tracing_logger::TracingLogger;
