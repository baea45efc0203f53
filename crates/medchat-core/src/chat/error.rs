//! Chat turn errors

use thiserror::Error;

use crate::llm::ProviderError;

/// Errors that end a chat turn.
///
/// Tool failures never appear here; they are handed to the model as error
/// payloads instead.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The model call itself failed
    #[error("Model invocation failed: {0}")]
    ModelInvocation(#[from] ProviderError),

    /// The caller cancelled the turn
    #[error("Turn cancelled")]
    Cancelled,

    /// Writing output to a sink failed
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;
