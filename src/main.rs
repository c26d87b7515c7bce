// MindAura - Mental-wellness chat service
// Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::prelude::*;

use mindaura::analysis::{classify, ConversationInput};
use mindaura::config::{load_config, load_config_from, ChatProvider, Config};
use mindaura::conversation::{require_user_messages, ChatMessage};
use mindaura::errors::{conversation_input_error, wrap_error_with_suggestion, UserFriendlyError};
use mindaura::server::WellnessServer;

#[derive(Parser, Debug)]
#[command(name = "mindaura")]
#[command(about = "Mental-wellness chat service with conversation analysis", version)]
struct Args {
    /// Config file (default: ~/.mindaura/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Bind address, overrides the config file
        #[arg(long)]
        bind: Option<String>,

        /// Also append logs to this file
        #[arg(long = "log-file")]
        log_file: Option<PathBuf>,
    },
    /// Analyze a conversation read from a JSON file (or stdin) and print the result
    Analyze {
        /// JSON file with the messages; reads stdin when omitted
        file: Option<PathBuf>,
    },
}

/// Accepted shapes for a conversation file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConversationFile {
    Bare(Vec<ChatMessage>),
    Wrapped { messages: Vec<ChatMessage> },
}

impl ConversationFile {
    fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            ConversationFile::Bare(messages) => messages,
            ConversationFile::Wrapped { messages } => messages,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Serve { bind, log_file } => {
            init_tracing(log_file.as_deref())?;
            let mut config = read_config(args.config.as_deref())?;
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            run_server(config).await
        }
        Command::Analyze { file } => {
            init_tracing(None)?;
            let config = read_config(args.config.as_deref())?;
            run_analyze(file.as_deref(), &config)
        }
    }
}

fn read_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
}

/// Log to stderr, and optionally append to a file without ANSI colors
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    // Default: INFO level, can be overridden with RUST_LOG env var
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            let file = Arc::new(file);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(move || Arc::clone(&file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();

    // Bridge log crate → tracing (reqwest and friends log through it)
    tracing_log::LogTracer::init().ok();

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    if config.chat.provider == ChatProvider::Gemini && config.gemini.api_key.is_none() {
        eprintln!(
            "{}",
            wrap_error_with_suggestion(
                "Gemini provider selected without an API key; replies will be scripted",
                "set GEMINI_API_KEY or add api_key under [gemini] in the config file",
            )
        );
    }

    let server = WellnessServer::from_config(config)?;
    server.serve().await
}

fn run_analyze(file: Option<&Path>, config: &Config) -> Result<()> {
    let (raw, source) = match file {
        Some(path) => (
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            path.display().to_string(),
        ),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            (input, "stdin".to_string())
        }
    };

    let messages = serde_json::from_str::<ConversationFile>(&raw)
        .map(ConversationFile::into_messages)
        .map_err(anyhow::Error::from)
        .user_context_with_suggestion(
            &conversation_input_error(&source),
            "export the chat history as JSON and try again",
        )?;

    require_user_messages(&messages, config.analysis.min_user_messages)?;

    let result = classify(&ConversationInput::from_messages(&messages));
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
