//! Headless driver: one session per run, events in as JSON lines on stdin,
//! outcomes out as JSON lines on stdout. Logs go to stderr.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use counterpoint::adapters::ai::{MockAIProvider, OpenAIProvider};
use counterpoint::adapters::generation::LlmGenerationService;
use counterpoint::adapters::storage::FsSessionArchive;
use counterpoint::adapters::topics::JsonTopicCatalog;
use counterpoint::application::{SessionError, SessionRegistry, SessionServices};
use counterpoint::config::{self, AppConfig, ConfigError, LoggingConfig};
use counterpoint::domain::foundation::{self, SessionId, TopicId};
use counterpoint::domain::session::SessionEvent;
use counterpoint::ports::{AIError, AIProvider, CatalogError, TopicCatalog};

#[derive(Parser)]
#[command(name = "counterpoint")]
#[command(about = "Adaptive-profiling conversation engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the topics in the catalog
    Topics,
    /// Run one session on a topic, reading events from stdin
    Run {
        /// Catalog topic id
        #[arg(long)]
        topic: String,
        /// Use the offline mock provider even when an API key is configured
        #[arg(long)]
        offline: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] config::ValidationError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Provider setup failed: {0}")]
    Provider(#[from] AIError),
    #[error("Invalid topic id: {0}")]
    Topic(#[from] foundation::ValidationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Output encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

fn init_tracing(config: &LoggingConfig) {
    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Topics => list_topics(&config).await,
        Commands::Run { topic, offline } => run(&config, &topic, offline).await,
    }
}

async fn list_topics(config: &AppConfig) -> Result<(), CliError> {
    let catalog = JsonTopicCatalog::load(&config.storage.topics_file).await?;
    let mut stdout = std::io::stdout().lock();
    for topic in catalog.list().await? {
        writeln!(
            stdout,
            "{}",
            json!({
                "id": topic.id(),
                "title": topic.title(),
                "questions": topic.questions(),
            })
        )?;
    }
    Ok(())
}

fn provider(config: &AppConfig, offline: bool) -> Result<Arc<dyn AIProvider>, CliError> {
    match config.ai.openai() {
        Some(openai) if !offline => {
            tracing::info!(model = %openai.model, "Using OpenAI provider");
            Ok(Arc::new(OpenAIProvider::new(openai)?))
        }
        _ => {
            tracing::warn!("No provider configured, replies will use fallbacks");
            Ok(Arc::new(MockAIProvider::new()))
        }
    }
}

async fn run(config: &AppConfig, topic: &str, offline: bool) -> Result<(), CliError> {
    let catalog = JsonTopicCatalog::load(&config.storage.topics_file).await?;
    let generation = LlmGenerationService::new(
        provider(config, offline)?,
        config.ai.generation_settings(),
    );
    let archive = FsSessionArchive::new(config.storage.sessions_dir());
    let services = SessionServices::new(
        Arc::new(generation),
        Arc::new(archive),
        config.conversation.settings()?,
    );
    let registry = SessionRegistry::new(services, Arc::new(catalog));

    let id = registry.open(&TopicId::new(topic)?).await?;
    emit(&json!({"outcome": "opened", "session_id": id, "topic_id": topic}))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        handle_line(&registry, &id, &line).await?;
    }

    tracing::info!(session_id = %id, status = %registry.status(&id).await?, "Input closed");
    Ok(())
}

async fn handle_line(registry: &SessionRegistry, id: &SessionId, line: &str) -> Result<(), CliError> {
    let event: SessionEvent = match serde_json::from_str(line) {
        Ok(event) => event,
        Err(e) => {
            return emit(&json!({
                "outcome": "error",
                "code": "VALIDATION_FAILED",
                "message": format!("Unreadable event: {}", e),
            }));
        }
    };

    match registry.dispatch(id, event).await {
        Ok(outcome) => emit(&serde_json::to_value(&outcome)?),
        Err(err) => emit(&json!({
            "outcome": "error",
            "code": err.code().to_string(),
            "message": err.message(),
        })),
    }
}

fn emit(value: &serde_json::Value) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", value)?;
    stdout.flush()?;
    Ok(())
}
