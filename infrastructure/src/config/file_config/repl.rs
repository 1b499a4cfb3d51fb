//! REPL configuration from TOML (`[repl]` section)

use serde::{Deserialize, Serialize};

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Tool that receives plain (non-command) input as `{query}`
    pub default_tool: String,
    /// Show a spinner while a call is running
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            default_tool: "search-track".to_string(),
            show_progress: true,
            history_file: None,
        }
    }
}
