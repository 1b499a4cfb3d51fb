//! Third-party API configuration (`[spotify]`, `[brave]`, `[weather]` sections)
//!
//! Secrets are optional: a missing credential disables the matching tool,
//! which then answers with a "not configured" error result.

use serde::{Deserialize, Serialize};

/// Spotify Web API (client-credentials grant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSpotifyConfig {
    /// env: `SPOTIFY_CLIENT_ID`
    pub client_id: Option<String>,
    /// env: `SPOTIFY_CLIENT_SECRET`
    pub client_secret: Option<String>,
    /// Token endpoint
    pub accounts_url: String,
    /// Web API base URL
    pub api_url: String,
    /// Items requested per search
    pub result_limit: u32,
}

impl Default for FileSpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            accounts_url: "https://accounts.spotify.com/api/token".to_string(),
            api_url: "https://api.spotify.com/v1".to_string(),
            result_limit: 3,
        }
    }
}

/// Brave Search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBraveConfig {
    /// env: `BRAVE_API_KEY`
    pub api_key: Option<String>,
    pub endpoint: String,
    /// Result country code
    pub country: String,
    /// Results shown per query
    pub result_limit: usize,
}

impl Default for FileBraveConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.search.brave.com/res/v1/web/search".to_string(),
            country: "JP".to_string(),
            result_limit: 3,
        }
    }
}

/// Japan Meteorological Agency forecast feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWeatherConfig {
    /// Base URL; `{office_code}.json` is appended
    pub endpoint: String,
}

impl Default for FileWeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.jma.go.jp/bosai/forecast/data/forecast".to_string(),
        }
    }
}
