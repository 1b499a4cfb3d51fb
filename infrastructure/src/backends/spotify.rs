//! Spotify catalog search.
//!
//! [`SpotifyClient`] implements [`MusicSearchPort`] with the
//! client-credentials grant; the provider built by [`spotify_server`]
//! exposes two tools on top of it:
//!
//! - `search-track` `{query}`: the full classify-then-search pipeline
//! - `search-spotify` `{type, keyword}`: one pre-classified search
//!
//! A token is requested per query; nothing is cached.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use toolbridge_application::{
    AccessToken, BackendError, MusicSearchPort, SearchMusicError, SearchMusicUseCase,
    ToolCatalogPort,
};
use toolbridge_domain::intent::{Intent, MusicItem, RawIntent, SearchType};
use toolbridge_domain::tool::{
    CallToolResult, IntentArgs, QueryArgs, SchemaProperty, ToolDescriptor, typed_handler,
};
use tracing::{debug, warn};

use crate::config::FileSpotifyConfig;
use crate::federation::{ToolServer, error::Result};

pub const SEARCH_TRACK: &str = "search-track";
pub const SEARCH_SPOTIFY: &str = "search-spotify";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Spotify Web API client
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    config: FileSpotifyConfig,
}

impl SpotifyClient {
    pub fn new(http: reqwest::Client, config: FileSpotifyConfig) -> Self {
        Self { http, config }
    }

    fn credentials(&self) -> std::result::Result<(&str, &str), BackendError> {
        match (
            self.config.client_id.as_deref(),
            self.config.client_secret.as_deref(),
        ) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok((id, secret)),
            _ => Err(BackendError::NotConfigured(
                "Spotify (SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET)".to_string(),
            )),
        }
    }
}

async fn check_status(response: reqwest::Response) -> std::result::Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl MusicSearchPort for SpotifyClient {
    async fn authorize(&self) -> std::result::Result<AccessToken, BackendError> {
        let (id, secret) = self.credentials()?;
        let response = self
            .http
            .post(&self.config.accounts_url)
            .basic_auth(id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        let token: TokenResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(AccessToken::new(token.access_token))
    }

    async fn search(
        &self,
        token: &AccessToken,
        intent: &Intent,
    ) -> std::result::Result<Vec<MusicItem>, BackendError> {
        debug!(search_type = %intent.search_type, keyword = %intent.keyword, "Spotify search");
        let limit = self.config.result_limit.to_string();
        let response = self
            .http
            .get(format!("{}/search", self.config.api_url.trim_end_matches('/')))
            .bearer_auth(token.as_str())
            .query(&[
                ("q", intent.keyword.as_str()),
                ("type", intent.search_type.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        let body: Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(parse_items(&body, intent.search_type))
    }
}

/// Extract catalog items from a `/v1/search` response.
///
/// Reads `{collection}.items`; null or nameless entries are skipped.
pub fn parse_items(body: &Value, kind: SearchType) -> Vec<MusicItem> {
    let Some(items) = body[kind.collection_key()]["items"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let name = item["name"].as_str()?;
            let mut music = MusicItem::new(kind, name);
            if let Some(artists) = item["artists"].as_array() {
                for artist in artists.iter().filter_map(|a| a["name"].as_str()) {
                    music = music.with_artist(artist);
                }
            }
            if let Some(url) = item["external_urls"]["spotify"].as_str() {
                music = music.with_url(url);
            }
            Some(music)
        })
        .collect()
}

pub fn search_track_definition() -> ToolDescriptor {
    ToolDescriptor::new(
        SEARCH_TRACK,
        "Search Spotify with a free-text query (classified automatically)",
    )
    .with_property(SchemaProperty::required("query", "Free-text music query"))
}

pub fn search_spotify_definition() -> ToolDescriptor {
    ToolDescriptor::new(SEARCH_SPOTIFY, "Search Spotify for one type and keyword")
        .with_property(SchemaProperty::required(
            "type",
            "track, artist, album or playlist",
        ))
        .with_property(SchemaProperty::required("keyword", "Search keyword"))
}

/// Run one `{type, keyword}` search and render its line
pub async fn execute_search_spotify<S: MusicSearchPort + ?Sized>(
    search: &S,
    args: IntentArgs,
) -> CallToolResult {
    let intent = RawIntent::new(args.search_type, args.keyword).validate();
    if intent.keyword.trim().is_empty() {
        return CallToolResult::error("keyword is required");
    }

    let result = match search.authorize().await {
        Ok(token) => search.search(&token, &intent).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(items) => CallToolResult::text(intent.render_line(&items)),
        Err(e) => {
            warn!(error = %e, "Spotify search failed");
            CallToolResult::error(format!("Spotify search failed: {}", e))
        }
    }
}

fn pipeline_result(result: std::result::Result<String, SearchMusicError>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::text(text),
        Err(SearchMusicError::EmptyQuery) => CallToolResult::error("query is required"),
        Err(e) => CallToolResult::error(e.to_string()),
    }
}

/// Build the Spotify provider.
///
/// `classifier` is the catalog that answers `classify-query`.
pub fn spotify_server<S>(search: Arc<S>, classifier: Arc<dyn ToolCatalogPort>) -> Result<ToolServer>
where
    S: MusicSearchPort + 'static,
{
    let pipeline = Arc::new(SearchMusicUseCase::new(classifier, Arc::clone(&search)));

    ToolServer::new("spotify", env!("CARGO_PKG_VERSION"))
        .with_tool(
            search_track_definition(),
            typed_handler(move |args: QueryArgs| {
                let pipeline = Arc::clone(&pipeline);
                async move {
                    let result = pipeline.execute(&args.query).await.map(|out| out.render());
                    pipeline_result(result)
                }
            }),
        )?
        .with_tool(
            search_spotify_definition(),
            typed_handler(move |args: IntentArgs| {
                let search = Arc::clone(&search);
                async move { execute_search_spotify(search.as_ref(), args).await }
            }),
        )
}
