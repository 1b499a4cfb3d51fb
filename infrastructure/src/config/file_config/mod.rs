//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section is optional; missing keys take their defaults.

mod backends;
mod ollama;
mod repl;
mod server;

pub use backends::{FileBraveConfig, FileSpotifyConfig, FileWeatherConfig};
pub use ollama::{FileOllamaConfig, FileReadinessConfig};
pub use repl::FileReplConfig;
pub use server::FileServerConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("ollama.host cannot be empty")]
    EmptyOllamaHost,

    #[error("ollama.model cannot be empty")]
    EmptyModelName,

    #[error("server.port cannot be 0")]
    InvalidPort,

    #[error("readiness.max_attempts cannot be 0")]
    ZeroReadinessAttempts,

    #[error("repl.default_tool cannot be empty")]
    EmptyDefaultTool,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model host used by the classifier
    pub ollama: FileOllamaConfig,
    /// Startup readiness gate
    pub readiness: FileReadinessConfig,
    pub spotify: FileSpotifyConfig,
    pub brave: FileBraveConfig,
    pub weather: FileWeatherConfig,
    /// HTTP façade
    pub server: FileServerConfig,
    /// Interactive loop
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the configuration, returning every detected issue
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        if self.ollama.host.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyOllamaHost);
        }
        if self.ollama.model.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyModelName);
        }
        if self.server.port == 0 {
            issues.push(ConfigValidationError::InvalidPort);
        }
        if self.readiness.max_attempts == 0 {
            issues.push(ConfigValidationError::ZeroReadinessAttempts);
        }
        if self.repl.default_tool.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyDefaultTool);
        }
        issues
    }
}
