//! Interactive terminal host for MedChat.
//!
//! ```bash
//! medchat --config server_config.json --stream
//! ```
//!
//! Connects to every MCP server in the descriptor, then answers queries read
//! from stdin until `quit`. Ctrl-C cancels the query in flight.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use medchat_core::chat::{write_to, ChatError, ChatStream, EmitMode};
use medchat_core::config::{DispatchPolicy, HostConfig};
use medchat_core::llm::create_provider;
use medchat_core::logging::{Logger, TracingLogger};
use medchat_core::secrets::{EnvSecretStore, SecretStore};
use medchat_core::{CancellationToken, ChatHost};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "medchat", version)]
#[command(about = "Chat with an LLM that can call MCP tool providers")]
struct Cli {
    /// Server descriptor (JSON or YAML); defaults to the user config directory
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Model provider (gemini, openai, anthropic, ollama, mock, ...)
    #[arg(long)]
    provider: Option<String>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Stream the answer character by character
    #[arg(long)]
    stream: bool,

    /// Which requested tool calls to dispatch per model turn (first, all)
    #[arg(long)]
    dispatch: Option<DispatchPolicy>,

    /// Debug logging for medchat
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn emit_mode(&self) -> EmitMode {
        if self.stream {
            EmitMode::Streaming
        } else {
            EmitMode::Batch
        }
    }

    /// Command-line values take precedence over the descriptor's chat section
    fn apply_overrides(&self, config: &mut HostConfig) {
        if let Some(provider) = &self.provider {
            config.chat.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.chat.model = model.clone();
        }
        if let Some(dispatch) = self.dispatch {
            config.chat.dispatch = dispatch;
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "medchat=debug" } else { "medchat=info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // A missing .env is fine; keys may already be in the environment
    let _ = dotenvy::dotenv();
    init_tracing(cli.verbose);

    let path = cli.config.clone().unwrap_or_else(HostConfig::default_path);
    let mut config = HostConfig::load(&path)
        .with_context(|| format!("failed to load server descriptor {}", path.display()))?;
    cli.apply_overrides(&mut config);

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());
    let secrets: Arc<dyn SecretStore> = Arc::new(EnvSecretStore::new());
    let model = create_provider(&config.chat.provider, secrets, Arc::clone(&logger));

    let host = ChatHost::start(config, model, logger).await;

    println!("\nMedChat started!");
    println!(
        "Connected providers: {}",
        if host.provider_names().is_empty() {
            "none".to_string()
        } else {
            host.provider_names().join(", ")
        }
    );
    let tools = host.registry().tool_names();
    println!(
        "Available tools: {}",
        if tools.is_empty() { "none".to_string() } else { tools.join(", ") }
    );
    println!("Type your queries or 'quit' to exit.");

    let result = chat_loop(&host, cli.emit_mode()).await;
    host.shutdown().await;
    result
}

/// Forward every Ctrl-C for the rest of the process to the returned receiver
fn forward_interrupts() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

async fn chat_loop(host: &ChatHost, mode: EmitMode) -> Result<()> {
    let mut interrupts = forward_interrupts();
    let lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    run_session(lines, &mut interrupts, &mut stdout, |query, cancel| {
        host.process_query(query, mode, cancel)
    })
    .await
}

/// Answer queries from `lines` until `quit`, end of input, or Ctrl-C at the
/// prompt. Ctrl-C while a query runs cancels only that query.
async fn run_session<R, W, F>(
    mut lines: Lines<R>,
    interrupts: &mut mpsc::UnboundedReceiver<()>,
    out: &mut W,
    mut answer: F,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    F: FnMut(&str, CancellationToken) -> ChatStream,
{
    loop {
        write!(out, "\nQuery: ")?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            Some(()) = interrupts.recv() => {
                writeln!(out)?;
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("quit") {
            break;
        }

        writeln!(out)?;
        let cancel = CancellationToken::new();
        let outcome = tokio::select! {
            outcome = write_to(answer(query, cancel.clone()), &mut *out) => outcome,
            Some(()) = interrupts.recv() => {
                cancel.cancel();
                Err(ChatError::Cancelled)
            }
        };

        match outcome {
            Ok(_) => writeln!(out)?,
            Err(ChatError::Cancelled) => writeln!(out, "\n[cancelled]")?,
            Err(e) => writeln!(out, "\nError: {}", e)?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use medchat_core::config::ChatSettings;
    use medchat_core::llm::MockProvider;
    use medchat_core::logging::NoOpLogger;
    use std::time::Duration;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "medchat", "--config", "servers.yaml", "--provider", "mock", "--stream", "--dispatch", "all",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("servers.yaml")));
        assert_eq!(cli.emit_mode(), EmitMode::Streaming);
        assert_eq!(cli.dispatch, Some(DispatchPolicy::All));
    }

    #[test]
    fn test_overrides_replace_descriptor_values() {
        let cli = Cli::parse_from(["medchat", "--model", "gemini-2.0-flash", "--dispatch", "all"]);
        let mut config = HostConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.chat.provider, "gemini");
        assert_eq!(config.chat.model, "gemini-2.0-flash");
        assert_eq!(config.chat.dispatch, DispatchPolicy::All);
    }

    #[test]
    fn test_defaults_to_batch() {
        let cli = Cli::parse_from(["medchat"]);
        assert_eq!(cli.emit_mode(), EmitMode::Batch);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_rejects_unknown_dispatch_policy() {
        assert!(Cli::try_parse_from(["medchat", "--dispatch", "some"]).is_err());
    }

    fn host_with(model: MockProvider) -> ChatHost {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger::new());
        ChatHost::from_providers(Vec::new(), Arc::new(model), ChatSettings::default(), logger)
    }

    async fn session(host: &ChatHost, input: &'static [u8], interrupts: &mut mpsc::UnboundedReceiver<()>) -> String {
        let mut out = Vec::new();
        run_session(input.lines(), interrupts, &mut out, |query, cancel| {
            host.process_query(query, EmitMode::Batch, cancel)
        })
        .await
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_session_answers_until_quit() {
        let host = host_with(MockProvider::fixed("No recalls found.", Arc::new(NoOpLogger::new())));
        let (_tx, mut rx) = mpsc::unbounded_channel();

        let out = session(&host, b"any aspirin recalls?\nquit\nnever asked\n", &mut rx).await;

        assert_eq!(out.matches("Query: ").count(), 2);
        assert!(out.contains("No recalls found."));
        host.shutdown().await;
    }

    #[tokio::test]
    async fn test_interrupt_at_prompt_ends_session() {
        let host = host_with(MockProvider::echo(Arc::new(NoOpLogger::new())));
        let (tx, mut rx) = mpsc::unbounded_channel();
        // Keep the writer open so the prompt waits for input
        let (_writer, reader) = tokio::io::duplex(64);
        tx.send(()).unwrap();

        let mut out = Vec::new();
        run_session(BufReader::new(reader).lines(), &mut rx, &mut out, |query, cancel| {
            host.process_query(query, EmitMode::Batch, cancel)
        })
        .await
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "\nQuery: \n");
        host.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_during_query_cancels_only_that_query() {
        let model = MockProvider::chunked(
            vec!["Three ".to_string(), "trials.".to_string()],
            1_000,
            Arc::new(NoOpLogger::new()),
        );
        let host = host_with(model);
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            tx.send(()).unwrap();
        });

        let out = session(&host, b"asthma trials?\nquit\n", &mut rx).await;

        assert!(out.contains("[cancelled]"));
        assert!(!out.contains("trials."));
        assert_eq!(out.matches("Query: ").count(), 2);
        host.shutdown().await;
    }
}
