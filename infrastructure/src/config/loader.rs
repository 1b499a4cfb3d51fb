//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

const PROJECT_FILES: [&str; 2] = ["toolbridge.toml", ".toolbridge.toml"];

/// Environment variables read without the `TOOLBRIDGE_` prefix
const WELL_KNOWN_ENV: [(&str, &str); 5] = [
    ("OLLAMA_HOST", "ollama.host"),
    ("OLLAMA_MODEL", "ollama.model"),
    ("SPOTIFY_CLIENT_ID", "spotify.client_id"),
    ("SPOTIFY_CLIENT_SECRET", "spotify.client_secret"),
    ("BRAVE_API_KEY", "brave.api_key"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `TOOLBRIDGE_*` environment variables
    /// 2. Well-known environment variables (`OLLAMA_HOST`, ...)
    /// 3. Explicit config path (if provided)
    /// 4. Project root: `./toolbridge.toml` or `./.toolbridge.toml`
    /// 5. XDG config: `$XDG_CONFIG_HOME/toolbridge/config.toml`
    /// 6. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        Self::extract(Self::with_env(figment))
    }

    /// Defaults plus environment only (for --no-config)
    pub fn load_defaults() -> Result<FileConfig, ConfigError> {
        let figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        Self::extract(Self::with_env(figment))
    }

    fn with_env(figment: Figment) -> Figment {
        figment
            .merge(Self::well_known_env())
            .merge(Env::prefixed("TOOLBRIDGE_").split("__"))
    }

    fn well_known_env() -> Env {
        let names: Vec<&str> = WELL_KNOWN_ENV.iter().map(|(name, _)| *name).collect();
        Env::raw().only(&names).map(|key| {
            WELL_KNOWN_ENV
                .iter()
                .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                .map(|(_, path)| (*path).into())
                .unwrap_or_else(|| key.as_str().into())
        })
    }

    fn extract(figment: Figment) -> Result<FileConfig, ConfigError> {
        figment.extract().map_err(|e| ConfigError::Extract(Box::new(e)))
    }

    /// Render the effective configuration as TOML (for --print-config)
    pub fn to_toml(config: &FileConfig) -> Result<String, ConfigError> {
        let mut redacted = config.clone();
        for secret in [
            &mut redacted.spotify.client_secret,
            &mut redacted.brave.api_key,
        ] {
            if secret.is_some() {
                *secret = Some("********".to_string());
            }
        }
        Ok(toml::to_string_pretty(&redacted)?)
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("toolbridge").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Env:     TOOLBRIDGE_<SECTION>__<KEY>");

        for (name, path) in WELL_KNOWN_ENV {
            let marker = if std::env::var_os(name).is_some() {
                "FOUND"
            } else {
                "     "
            };
            println!("  [{}] Env:     {} -> {}", marker, name, path);
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./toolbridge.toml or ./.toolbridge.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}
