//! `brave-search` tool: web search through the Brave Search API.
//!
//! Requires an API key (`BRAVE_API_KEY` or `brave.api_key`). Without one the
//! tool still registers but every call answers with a "not configured"
//! error result.
//!
//! # Output Format
//!
//! Top results, numbered and separated by a blank line:
//!
//! ```text
//! 1. Title
//!    - URL: https://example.com
//!    - Summary: description
//! ```
//!
//! # Parameters
//!
//! | Name | Type | Required | Description |
//! |------|------|:---:|-------------|
//! | `query` | string | Yes | The search query |

use serde_json::Value;
use toolbridge_domain::tool::{
    CallToolResult, QueryArgs, SchemaProperty, ToolDescriptor, typed_handler,
};
use tracing::{debug, warn};

use crate::config::FileBraveConfig;
use crate::federation::{ToolServer, error::Result};

/// Canonical tool name for the web search tool.
pub const BRAVE_SEARCH: &str = "brave-search";

pub const NO_RESULTS: &str = "No search results found.";

pub fn brave_search_definition() -> ToolDescriptor {
    ToolDescriptor::new(BRAVE_SEARCH, "Search the web with Brave Search")
        .with_property(SchemaProperty::required("query", "The search query"))
}

/// Format a Brave `web.results` payload.
///
/// Shows at most `limit` results; entries without a title are skipped.
pub fn format_search_results(data: &Value, limit: usize) -> String {
    let Some(results) = data["web"]["results"].as_array() else {
        return NO_RESULTS.to_string();
    };

    let entries: Vec<String> = results
        .iter()
        .filter(|r| r["title"].as_str().is_some_and(|t| !t.is_empty()))
        .take(limit)
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {}\n   - URL: {}\n   - Summary: {}",
                i + 1,
                r["title"].as_str().unwrap_or_default(),
                r["url"].as_str().unwrap_or_default(),
                r["description"].as_str().unwrap_or_default()
            )
        })
        .collect();

    if entries.is_empty() {
        NO_RESULTS.to_string()
    } else {
        entries.join("\n\n")
    }
}

/// Execute `brave-search`
pub async fn execute_brave_search(
    client: &reqwest::Client,
    config: &FileBraveConfig,
    args: QueryArgs,
) -> CallToolResult {
    let Some(api_key) = config.api_key.as_deref().filter(|k| !k.is_empty()) else {
        return CallToolResult::error("Brave Search is not configured (set BRAVE_API_KEY)");
    };
    let query = args.query.trim();
    if query.is_empty() {
        return CallToolResult::error("query is required");
    }

    debug!(query, "Brave search");
    let response = match client
        .get(&config.endpoint)
        .query(&[("q", query), ("country", config.country.as_str())])
        .header("X-Subscription-Token", api_key)
        .header("Accept", "application/json")
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "Brave search request failed");
            return CallToolResult::error(format!("Search request failed: {}", e));
        }
    };

    if !response.status().is_success() {
        return CallToolResult::error(format!(
            "Search API returned error: {}",
            response.status()
        ));
    }

    match response.json::<Value>().await {
        Ok(body) => CallToolResult::text(format_search_results(&body, config.result_limit)),
        Err(e) => CallToolResult::error(format!("Failed to parse search results: {}", e)),
    }
}

/// Build the Brave provider
pub fn brave_server(client: reqwest::Client, config: FileBraveConfig) -> Result<ToolServer> {
    if config.api_key.is_none() {
        warn!("BRAVE_API_KEY is not set; brave-search will report an error");
    }
    ToolServer::new("brave", env!("CARGO_PKG_VERSION")).with_tool(
        brave_search_definition(),
        typed_handler(move |args: QueryArgs| {
            let client = client.clone();
            let config = config.clone();
            async move { execute_brave_search(&client, &config, args).await }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_top_results() {
        let data = json!({"web": {"results": [
            {"title": "Rust", "url": "https://www.rust-lang.org", "description": "A language"},
            {"title": "", "url": "https://skip.me", "description": "untitled"},
            {"title": "Tokio", "url": "https://tokio.rs", "description": "Async runtime"},
            {"title": "Serde", "url": "https://serde.rs", "description": "Serialization"},
            {"title": "Axum", "url": "https://docs.rs/axum", "description": "Web framework"}
        ]}});

        let text = format_search_results(&data, 3);
        assert_eq!(
            text,
            "1. Rust\n   - URL: https://www.rust-lang.org\n   - Summary: A language\n\n\
             2. Tokio\n   - URL: https://tokio.rs\n   - Summary: Async runtime\n\n\
             3. Serde\n   - URL: https://serde.rs\n   - Summary: Serialization"
        );
    }

    #[test]
    fn test_format_no_results() {
        assert_eq!(format_search_results(&json!({}), 3), NO_RESULTS);
        assert_eq!(
            format_search_results(&json!({"web": {"results": []}}), 3),
            NO_RESULTS
        );
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let result = execute_brave_search(
            &reqwest::Client::new(),
            &FileBraveConfig::default(),
            QueryArgs::new("rust"),
        )
        .await;
        assert!(result.is_error());
        assert!(result.text_content().contains("not configured"));
    }
}
