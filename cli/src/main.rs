//! CLI entrypoint for Tutor Orchestrator
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod session;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tutor_application::{ProcessTurnInput, ProcessTurnUseCase, WorkflowObserver};
use session::Session;
use tutor_domain::{ConversationTurn, UserProfile};
use tutor_infrastructure::{
    ConfigLoader, HttpToolService, JsonlWorkflowObserver, KeywordNluGateway, TracingObserver,
};
use tutor_presentation::{Cli, ConsoleFormatter, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Tutor Orchestrator");

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        println!();
        println!("{}", toml::to_string_pretty(&file_config)?);
        return Ok(());
    }

    let issues = file_config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config error: {}", issue);
        }
        bail!("Invalid configuration ({} issue(s))", issues.len());
    }
    let config = file_config.to_orchestrator_config();

    let message = cli.message.context("--message is required")?;
    let profile_path = cli.profile.context("--profile is required")?;
    let profile: UserProfile = read_json(&profile_path)?;
    let (prior_state, saved_history) = match &cli.state {
        Some(path) => {
            let (state, history) = Session::load(path)?.restore()?;
            (Some(state), history)
        }
        None => (None, Vec::new()),
    };
    let history: Vec<ConversationTurn> = match &cli.history {
        Some(path) => read_json(path)?,
        None => saved_history,
    };

    let conversation_id = cli
        .conversation_id
        .or_else(|| prior_state.as_ref().map(|s| s.conversation_id().to_string()))
        .unwrap_or_else(|| format!("conv-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S")));

    // === Dependency Injection ===
    let base_url = cli
        .tool_service_url
        .unwrap_or_else(|| file_config.tool_service.base_url.clone());
    let nlu = Arc::new(KeywordNluGateway::new()?);
    let tools = Arc::new(HttpToolService::new(base_url));

    let observer: Arc<dyn WorkflowObserver> = match &cli.observer_log {
        Some(path) => match JsonlWorkflowObserver::new(path) {
            Some(observer) => Arc::new(observer),
            None => {
                warn!("Falling back to log output for workflow transitions");
                Arc::new(TracingObserver)
            }
        },
        None => Arc::new(TracingObserver),
    };

    let use_case = ProcessTurnUseCase::new(nlu, tools, &config).with_observer(observer);

    // Ctrl-C cancels the in-flight turn
    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling turn");
            interrupt.cancel();
        }
    });

    let input = ProcessTurnInput::new(conversation_id, message.clone(), profile)
        .with_history(history.clone())
        .with_prior_state(prior_state)
        .with_cancellation(token);

    let state = use_case.execute(input).await?;

    if let Some(path) = &cli.save_state {
        let reply = ConsoleFormatter::format_reply(&state);
        Session::after_turn(&state, history, &message, &reply).save(path)?;
        info!("Saved workflow state to {}", path.display());
    }

    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&state),
        OutputFormat::Reply => ConsoleFormatter::format_reply(&state),
        OutputFormat::Json => ConsoleFormatter::format_json(&state),
    };

    println!("{}", output);

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
