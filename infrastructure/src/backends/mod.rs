//! Tool backends
//!
//! Each submodule builds one [`ToolServer`] around a thin I/O wrapper:
//!
//! | Provider | Tools | Upstream |
//! |----------|-------|----------|
//! | `time` | `get-current-time` | local clock |
//! | `weather` | `get-weather` | JMA forecast JSON |
//! | `spotify` | `search-track`, `search-spotify` | Spotify Web API |
//! | `brave` | `brave-search` | Brave Search API |
//! | `classifier` | `classify-query` | Ollama |
//!
//! [`ProviderSet::build`] wires them together. The Spotify provider reaches
//! the classifier through a private [`ToolClient`] over its own channel, so
//! classification goes through the same protocol as every other call.

pub mod brave;
pub mod classifier;
pub mod spotify;
pub mod time;
pub mod weather;

use std::sync::Arc;
use std::time::Duration;

use toolbridge_application::LanguageModel;
use tracing::{debug, warn};

use crate::config::FileConfig;
use crate::federation::{
    ServerConnection, ToolClient, ToolProvider, connect_client, error::Result,
};

pub use spotify::SpotifyClient;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client for every backend
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("toolbridge/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// The providers handed to the registry, plus the private classifier link
/// used by the Spotify provider
pub struct ProviderSet {
    providers: Vec<Arc<dyn ToolProvider>>,
    classifier_link: (Arc<ToolClient>, ServerConnection),
}

impl ProviderSet {
    /// Build every provider in federation order
    pub async fn build(config: &FileConfig, model: Arc<dyn LanguageModel>) -> Result<Self> {
        let http = http_client();

        let classifier: Arc<dyn ToolProvider> = Arc::new(classifier::classifier_server(model)?);
        let (client, connection) =
            connect_client(Arc::clone(&classifier), "spotify-classifier").await?;
        let client = Arc::new(client);

        let spotify = SpotifyClient::new(http.clone(), config.spotify.clone());
        let providers: Vec<Arc<dyn ToolProvider>> = vec![
            Arc::new(time::time_server()?),
            Arc::new(weather::weather_server(http.clone(), config.weather.clone())?),
            Arc::new(spotify::spotify_server(Arc::new(spotify), client.clone())?),
            Arc::new(brave::brave_server(http, config.brave.clone())?),
            classifier,
        ];
        debug!(count = providers.len(), "Built providers");

        Ok(Self {
            providers,
            classifier_link: (client, connection),
        })
    }

    pub fn providers(&self) -> Vec<Arc<dyn ToolProvider>> {
        self.providers.clone()
    }

    /// Close the private classifier link
    pub async fn shutdown(self) -> Result<()> {
        let (client, connection) = self.classifier_link;
        client.close().await?;
        connection.join().await.map(|_| ())
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("ProviderSet").field("providers", &names).finish()
    }
}
