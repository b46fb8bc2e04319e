mod input;
mod terminal;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use client::{ClientConfig, ClientError, Command, HttpTransport, SessionRunner};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::terminal::TerminalView;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed with status {0}")]
    Unhealthy(u16),
    #[error("reading input failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session runner failed: {0}")]
    Runner(#[from] tokio::task::JoinError),
}

#[derive(Parser, Debug)]
#[command(name = "chat-cli", about = "Terminal client for the long-poll chat")]
struct Cli {
    /// Overrides `CHAT_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Check that the server is up.
    Ping,
    /// Interactive chat on stdin/stdout (the default).
    Chat {
        /// Join immediately under this name.
        #[arg(long, env = "CHAT_NAME")]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }

    match cli.command.unwrap_or(CliCommand::Chat { name: None }) {
        CliCommand::Ping => run_ping(&config).await,
        CliCommand::Chat { name } => run_chat(&config, name).await,
    }
}

async fn run_ping(config: &ClientConfig) -> Result<(), CliError> {
    let url = format!("{}/healthz", config.base_url);
    let status = reqwest::get(url).await?.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

async fn run_chat(config: &ClientConfig, name: Option<String>) -> Result<(), CliError> {
    let transport = Arc::new(HttpTransport::new(config)?);
    println!("chatting at {}", transport.endpoint());
    println!("{}", input::USAGE);

    let runner = SessionRunner::new(transport, TerminalView::new(std::io::stdout()));
    let (tx, rx) = mpsc::channel(32);
    let task = tokio::spawn(runner.run(rx));

    if let Some(name) = name {
        forward(&tx, Command::Join(name)).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match input::parse_line(&line) {
            Some(Command::Quit) => break,
            Some(command) => {
                if !forward(&tx, command).await {
                    break;
                }
            }
            None => println!("{}", input::USAGE),
        }
    }

    // Leaving while not joined is a no-op in the controller.
    forward(&tx, Command::Leave).await;
    forward(&tx, Command::Quit).await;
    drop(tx);
    task.await?;
    Ok(())
}

/// Hand a command to the runner. Returns `false` once the runner is gone.
async fn forward(tx: &mpsc::Sender<Command>, command: Command) -> bool {
    if tx.send(command).await.is_err() {
        debug!("session runner already stopped");
        return false;
    }
    true
}
