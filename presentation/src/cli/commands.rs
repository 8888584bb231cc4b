//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for a processed turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full formatted output with every stage
    Full,
    /// Only the clarification question or tool result
    Reply,
    /// Workflow snapshot as JSON
    Json,
}

/// CLI arguments for tutor-orchestrator
#[derive(Parser, Debug)]
#[command(name = "tutor-orchestrator")]
#[command(author, version, about = "Routes a learner's message to the right study tool")]
#[command(long_about = r#"
Tutor Orchestrator processes one conversational turn from a learner.

Each turn goes through:
1. Intent: pick note_maker, flashcard_generator or concept_explainer
2. Parameters: explicit values, contextual inference, history, profile defaults
3. Validation: check the tool's schema
4. Clarify or execute: ask for what is missing, or call the tool service

Configuration files are loaded from (in priority order):
1. TUTOR_* environment variables
2. --config <path>     Explicit config file
3. ./tutor.toml        Project-level config
4. ~/.config/tutor-orchestrator/config.toml   Global config

Example:
  tutor-orchestrator --profile student.json \
      --message "Create 5 flashcards on photosynthesis at medium difficulty"
  tutor-orchestrator --profile student.json --state turn1.json --save-state turn2.json \
      --message "Photosynthesis, please"
"#)]
pub struct Cli {
    /// The learner's message for this turn
    #[arg(short, long, value_name = "TEXT", required_unless_present = "show_config")]
    pub message: Option<String>,

    /// Learner profile (JSON)
    #[arg(short, long, value_name = "PATH", required_unless_present = "show_config")]
    pub profile: Option<PathBuf>,

    /// Prior conversation turns (JSON array); replaces the history saved in --state
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Session saved by --save-state (or a bare workflow snapshot)
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Write the resulting workflow snapshot and conversation history here
    #[arg(long, value_name = "PATH")]
    pub save_state: Option<PathBuf>,

    /// Conversation identifier (taken from --state when omitted)
    #[arg(long, value_name = "ID")]
    pub conversation_id: Option<String>,

    /// Base URL of the tool service (overrides configuration)
    #[arg(long, value_name = "URL")]
    pub tool_service_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Append one JSON line per workflow transition to this file
    #[arg(long, value_name = "PATH")]
    pub observer_log: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and the merged configuration, then exit
    #[arg(long)]
    pub show_config: bool,
}
