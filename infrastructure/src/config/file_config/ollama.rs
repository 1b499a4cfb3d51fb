//! Model host configuration from TOML (`[ollama]` section)

use serde::{Deserialize, Serialize};

/// Raw Ollama configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    /// Base URL of the Ollama host (env: `OLLAMA_HOST`)
    pub host: String,
    /// Model used for query classification (env: `OLLAMA_MODEL`)
    pub model: String,
    /// Per-request timeout for model calls in milliseconds; unset waits for
    /// the model however long a cold load takes
    pub request_timeout_ms: Option<u64>,
}

impl Default for FileOllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            request_timeout_ms: None,
        }
    }
}

/// Startup readiness polling (`[readiness]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReadinessConfig {
    /// Number of probes before giving up
    pub max_attempts: u32,
    /// Delay between probes in milliseconds
    pub interval_ms: u64,
}

impl Default for FileReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval_ms: 1000,
        }
    }
}
