//! Infrastructure layer for toolbridge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the in-process tool federation, the tool
//! backends, the Ollama client and configuration file loading.

pub mod backends;
pub mod config;
pub mod federation;
pub mod ollama;

// Re-export commonly used types
pub use backends::{ProviderSet, SpotifyClient, http_client};
pub use config::{ConfigError, ConfigLoader, ConfigValidationError, FileConfig};
pub use federation::{
    FederationError, RegistryCloseError, RegistryStats, ToolClient, ToolProvider, ToolRegistry,
    ToolServer,
};
pub use ollama::OllamaClient;
