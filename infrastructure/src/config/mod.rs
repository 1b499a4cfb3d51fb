//! Configuration file loading for toolbridge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TOOLBRIDGE_*` environment variables (`__` separates sections)
//! 2. Well-known variables: `OLLAMA_HOST`, `OLLAMA_MODEL`, `SPOTIFY_CLIENT_ID`,
//!    `SPOTIFY_CLIENT_SECRET`, `BRAVE_API_KEY`
//! 3. `--config <path>` specified file
//! 4. Project root: `./toolbridge.toml` or `./.toolbridge.toml`
//! 5. XDG config: `$XDG_CONFIG_HOME/toolbridge/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBraveConfig, FileConfig, FileOllamaConfig, FileReadinessConfig,
    FileReplConfig, FileServerConfig, FileSpotifyConfig, FileWeatherConfig,
};
pub use loader::{ConfigError, ConfigLoader};
