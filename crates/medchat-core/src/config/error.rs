//! Configuration errors

use std::path::PathBuf;

/// Errors raised while loading the host descriptor. All of them are fatal to startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Server configuration not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
