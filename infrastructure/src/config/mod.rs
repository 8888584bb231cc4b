//! Configuration file loading for tutor-orchestrator
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TUTOR_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./tutor.toml` or `./.tutor.toml`
//! 4. Global: `~/.config/tutor-orchestrator/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileClarificationConfig, FileConfig, FileHistoryConfig,
    FileRetryConfig, FileToolServiceConfig, FileValidationConfig, FileWorkflowConfig,
};
pub use loader::ConfigLoader;
