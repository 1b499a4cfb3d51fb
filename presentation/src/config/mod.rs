//! Presentation-level configuration
//!
//! Built by the binary from the loaded file configuration, so this crate
//! never reads files itself.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Tool that receives plain input as `{query}`
    pub default_tool: String,
    /// Show progress indicators
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            default_tool: "search-track".to_string(),
            show_progress: true,
            history_file: None,
        }
    }
}

impl ReplConfig {
    /// Configured history file, else `$XDG_DATA_HOME/toolbridge/history.txt`
    pub fn history_path(&self) -> Option<PathBuf> {
        match &self.history_file {
            Some(path) => Some(PathBuf::from(path)),
            None => dirs::data_dir().map(|p| p.join("toolbridge").join("history.txt")),
        }
    }
}

/// HTTP façade configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// `host:port` to listen on
    pub bind_address: String,
    /// Origin allowed by CORS
    pub allowed_origin: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
            allowed_origin: "http://127.0.0.1:3000".to_string(),
        }
    }
}
