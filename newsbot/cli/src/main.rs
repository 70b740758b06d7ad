//! Newsbot - Terminal surface for the Newsci chat panel
//!
//! Reads questions from stdin, one per line, and renders the panel's answers
//! as they are revealed.
//!
//! # Usage
//!
//! ```bash
//! # Against a local backend
//! NEWSBOT_TOKEN=eyJraWQi... newsbot
//!
//! # Custom endpoint and config file
//! newsbot --api-url https://api.example.com --config ./newsbot.toml
//!
//! # Verbose logging (stderr)
//! RUST_LOG=debug newsbot
//! ```
//!
//! Type `/quit` to close the panel at once. On EOF the panel closes after the
//! pending answer has been shown.

mod render;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use newsbot_core::{
    default_config_path, load_config_from_path, ChatPanel, EnvTokenProvider, HttpQueryTransport,
    PanelConfig, PanelMessage, Phase, SessionTokenProvider, StaticTokenProvider, SubmitOutcome,
    SubmitRejection,
};

use render::TerminalRenderer;

const QUIT_COMMAND: &str = "/quit";

/// Newsbot - ask the Newsci news bot about our articles
#[derive(Parser, Debug)]
#[command(name = "newsbot")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the chat API
    #[arg(short = 'u', long, value_name = "URL")]
    api_url: Option<String>,

    /// Chat resource path
    #[arg(short = 'p', long, value_name = "PATH")]
    path: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "NEWSBOT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Session token sent with every request
    #[arg(short = 't', long, env = "NEWSBOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Authorization scheme prefix (e.g. "Bearer"); the raw token is sent if unset
    #[arg(long, value_name = "SCHEME")]
    auth_scheme: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "NEWSBOT_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

/// Initialize logging with the specified level
///
/// Logs go to stderr; stdout belongs to the panel.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("newsbot={level},newsbot_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Layer CLI flags over file and environment configuration
fn build_config(args: &Args) -> Result<PanelConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    if let Some(ref url) = args.api_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(ref path) = args.path {
        config = config.with_path(path.clone());
    }
    if let Some(ref scheme) = args.auth_scheme {
        config = config.with_auth_scheme(scheme.clone());
    }

    config.validate().context("Invalid command-line overrides")?;
    Ok(config)
}

fn token_provider(args: &Args) -> Arc<dyn SessionTokenProvider> {
    match args.token {
        Some(ref token) => Arc::new(StaticTokenProvider::new(token.clone())),
        None => Arc::new(EnvTokenProvider::default()),
    }
}

/// What the user's line should do
#[derive(Debug, PartialEq, Eq)]
enum LineAction<'a> {
    Quit,
    Ask(&'a str),
    Ignore,
}

fn classify_line(line: &str) -> LineAction<'_> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.trim() == QUIT_COMMAND {
        LineAction::Quit
    } else if trimmed.is_empty() {
        LineAction::Ignore
    } else {
        LineAction::Ask(trimmed)
    }
}

/// Whether the last answer has been shown and EOF may close the panel
///
/// The cooldown only gates the next question, so it is not waited out.
fn exchange_settled(phase: Phase) -> bool {
    matches!(phase, Phase::Idle | Phase::CoolingDown)
}

fn print(out: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(out.as_bytes()).context("Failed to write to stdout")?;
    stdout.flush().context("Failed to flush stdout")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = build_config(&args)?;
    info!(url = %config.endpoint.url(), "Starting newsbot");

    let transport = HttpQueryTransport::new(config.endpoint.clone(), token_provider(&args))
        .context("Failed to create chat transport")?;

    let (tx, mut rx) = mpsc::channel(config.event_buffer);
    let panel = ChatPanel::open(transport, config, tx);
    let mut renderer = TerminalRenderer::default();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let line = line.context("Failed to read stdin")?;
                let Some(line) = line else {
                    stdin_open = false;
                    if exchange_settled(panel.phase()) {
                        panel.close();
                    } else {
                        info!("Input finished, closing once the answer is in");
                    }
                    continue;
                };

                match classify_line(&line) {
                    LineAction::Quit => {
                        stdin_open = false;
                        panel.close();
                    }
                    LineAction::Ignore => {}
                    LineAction::Ask(question) => {
                        panel.set_draft(question);
                        match panel.submit() {
                            SubmitOutcome::Started { .. } => {}
                            SubmitOutcome::Rejected(SubmitRejection::Busy(_)) => {
                                let label = panel.snapshot().submit_label;
                                print(&format!("(busy: {label})\n"))?;
                            }
                            SubmitOutcome::Rejected(rejection) => {
                                print(&format!("(not sent: {rejection})\n"))?;
                            }
                        }
                    }
                }
            }

            message = rx.recv() => {
                let Some(message) = message else { break };
                if let Some(out) = renderer.render(&message) {
                    print(&out)?;
                }
                if message == PanelMessage::Closed {
                    break;
                }
                if !stdin_open && exchange_settled(panel.phase()) {
                    panel.close();
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing panel");
                panel.close();
            }
        }
    }

    info!("Newsbot stopped");
    Ok(())
}
