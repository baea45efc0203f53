//! Chat host: the explicit context object
//!
//! Built once at startup, it owns the tool registry, every provider
//! connection and the model client. Turns borrow it; `shutdown` is the single
//! teardown path.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use indexmap::IndexMap;
use thiserror::Error;

use crate::chat::{chat_stream, ChatStream, EmitMode, ToolLoop};
use crate::config::{ChatSettings, ConfigError, HostConfig, ServerConfig};
use crate::llm::{create_provider, SharedLlmProvider};
use crate::logging::Logger;
use crate::mcp::{McpConnection, McpError, McpResult};
use crate::secrets::SecretStore;
use crate::tools::{SharedToolProvider, ToolRegistry};
use crate::types::CancellationToken;

/// Host startup errors
#[derive(Error, Debug)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type HostResult<T> = Result<T, HostError>;

/// Connect every configured server concurrently.
///
/// A server that fails is logged and left out; the others are returned in
/// descriptor order.
pub async fn connect_providers<F, Fut>(
    servers: &IndexMap<String, ServerConfig>,
    connect: F,
    logger: &Arc<dyn Logger>,
) -> Vec<SharedToolProvider>
where
    F: Fn(String, ServerConfig) -> Fut,
    Fut: Future<Output = McpResult<SharedToolProvider>>,
{
    let attempts = servers
        .iter()
        .map(|(name, server)| connect(name.clone(), server.clone()));
    let outcomes = join_all(attempts).await;

    let mut connected = Vec::with_capacity(outcomes.len());
    for (name, outcome) in servers.keys().zip(outcomes) {
        match outcome {
            Ok(provider) => connected.push(provider),
            Err(e) => logger.warn(&format!("[ChatHost] Failed to connect to {}: {}", name, e)),
        }
    }
    connected
}

/// Everything a chat turn needs
pub struct ChatHost {
    registry: Arc<ToolRegistry>,
    providers: Vec<SharedToolProvider>,
    model: SharedLlmProvider,
    settings: ChatSettings,
    logger: Arc<dyn Logger>,
}

impl ChatHost {
    /// Load the descriptor at `path`, create the configured model and start
    pub async fn start_from_file(
        path: impl AsRef<Path>,
        secrets: Arc<dyn SecretStore>,
        logger: Arc<dyn Logger>,
    ) -> HostResult<Self> {
        let config = HostConfig::load(path)?;
        let model = create_provider(&config.chat.provider, secrets, Arc::clone(&logger));
        Ok(Self::start(config, model, logger).await)
    }

    /// Connect to every MCP server in `config` and register their tools
    pub async fn start(config: HostConfig, model: SharedLlmProvider, logger: Arc<dyn Logger>) -> Self {
        let connect_logger = Arc::clone(&logger);
        let providers = connect_providers(
            &config.mcp_servers,
            |name, server| {
                let logger = Arc::clone(&connect_logger);
                async move {
                    let connection = McpConnection::connect(&name, &server, logger).await?;
                    Ok::<_, McpError>(Arc::new(connection) as SharedToolProvider)
                }
            },
            &logger,
        )
        .await;

        Self::from_providers(providers, model, config.chat, logger)
    }

    /// Build a host around already connected providers
    pub fn from_providers(
        providers: Vec<SharedToolProvider>,
        model: SharedLlmProvider,
        settings: ChatSettings,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let mut registry = ToolRegistry::new(Arc::clone(&logger));
        if let Some(secs) = settings.tool_timeout_secs {
            registry = registry.with_call_timeout(Duration::from_secs(secs));
        }
        for provider in &providers {
            registry.register(Arc::clone(provider));
        }

        logger.info(&format!(
            "[ChatHost] Ready: {} providers, {} tools, model {}/{}",
            providers.len(),
            registry.tool_count(),
            settings.provider,
            settings.model
        ));

        Self {
            registry: Arc::new(registry),
            providers,
            model,
            settings,
            logger,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Names of the providers that connected
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// A fresh loop for `query`; nothing carries over from earlier turns
    pub fn turn(&self, query: impl Into<String>) -> ToolLoop {
        ToolLoop::new(
            query,
            Arc::clone(&self.model),
            Arc::clone(&self.registry),
            &self.settings,
            Arc::clone(&self.logger),
        )
    }

    /// Run `query` as a lazy event stream
    pub fn process_query(
        &self,
        query: impl Into<String>,
        mode: EmitMode,
        cancel: CancellationToken,
    ) -> ChatStream {
        chat_stream(self.turn(query).with_cancel(cancel), mode)
    }

    /// Close every connection. Consumes the host, so this runs once.
    pub async fn shutdown(self) {
        self.logger.info(&format!(
            "[ChatHost] Shutting down {} connections",
            self.providers.len()
        ));
        join_all(self.providers.iter().map(|p| p.close())).await;
    }
}
