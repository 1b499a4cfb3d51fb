//! `get-weather` tool: short-range forecast from the Japan Meteorological Agency.
//!
//! Place names (Japanese or English) resolve to a JMA forecast office code;
//! the office's forecast JSON is fetched from `{endpoint}/{code}.json`.
//!
//! # Parameters
//!
//! | Name | Type | Required | Description |
//! |------|------|:---:|-------------|
//! | `name` | string | Yes | City name, e.g. 東京, 大阪, Tokyo |

use serde_json::Value;
use toolbridge_domain::tool::{
    CallToolResult, SchemaProperty, ToolDescriptor, WeatherArgs, typed_handler,
};
use tracing::debug;

use crate::config::FileWeatherConfig;
use crate::federation::{ToolServer, error::Result};

/// Canonical tool name for the weather tool.
pub const GET_WEATHER: &str = "get-weather";

/// Forecast entries shown per answer
const MAX_FORECASTS: usize = 3;

/// (office code, aliases)
const OFFICES: &[(&str, &[&str])] = &[
    ("016000", &["札幌", "北海道", "sapporo", "hokkaido"]),
    ("040000", &["仙台", "宮城", "sendai", "miyagi"]),
    ("130000", &["東京", "東京都", "tokyo"]),
    ("140000", &["横浜", "神奈川", "yokohama", "kanagawa"]),
    ("230000", &["名古屋", "愛知", "nagoya", "aichi"]),
    ("260000", &["京都", "京都府", "kyoto"]),
    ("270000", &["大阪", "大阪府", "osaka"]),
    ("280000", &["神戸", "兵庫", "kobe", "hyogo"]),
    ("340000", &["広島", "hiroshima"]),
    ("400000", &["福岡", "fukuoka"]),
    ("471000", &["那覇", "沖縄", "naha", "okinawa"]),
];

pub fn get_weather_definition() -> ToolDescriptor {
    ToolDescriptor::new(GET_WEATHER, "Get the weather forecast for a city in Japan")
        .with_property(SchemaProperty::required(
            "name",
            "City name (e.g. 東京, 大阪, Tokyo)",
        ))
}

/// Resolve a place name to a JMA office code
pub fn office_code(name: &str) -> Option<&'static str> {
    let needle = name.trim().to_lowercase();
    OFFICES
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| *alias == needle))
        .map(|(code, _)| *code)
}

/// Format the first time series of a JMA forecast document.
///
/// Returns `None` when the document has no usable weather entries.
pub fn format_forecast(place: &str, data: &Value) -> Option<String> {
    let series = &data[0]["timeSeries"][0];
    let area = &series["areas"][0];
    let times = series["timeDefines"].as_array()?;
    let weathers = area["weathers"].as_array()?;

    let lines: Vec<String> = times
        .iter()
        .zip(weathers)
        .filter_map(|(time, weather)| {
            let date = time.as_str()?.get(..10)?;
            let text = weather.as_str()?.split_whitespace().collect::<Vec<_>>().join(" ");
            Some(format!("- {}: {}", date, text))
        })
        .take(MAX_FORECASTS)
        .collect();

    if lines.is_empty() {
        return None;
    }

    let header = match area["area"]["name"].as_str() {
        Some(area_name) => format!("天気予報: {} ({})", place, area_name),
        None => format!("天気予報: {}", place),
    };
    Some(format!("{}\n{}", header, lines.join("\n")))
}

/// Execute `get-weather` against the configured endpoint
pub async fn execute_get_weather(
    client: &reqwest::Client,
    config: &FileWeatherConfig,
    args: WeatherArgs,
) -> CallToolResult {
    let place = args.name.trim();
    if place.is_empty() {
        return CallToolResult::error("name is required");
    }
    let Some(code) = office_code(place) else {
        return CallToolResult::error(format!("Unknown location: {}", place));
    };

    let url = format!("{}/{}.json", config.endpoint.trim_end_matches('/'), code);
    debug!(place, code, "Fetching forecast");

    let response = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => return CallToolResult::error(format!("Weather request failed: {}", e)),
    };
    if !response.status().is_success() {
        return CallToolResult::error(format!(
            "Weather API returned error: {}",
            response.status()
        ));
    }
    let body: Value = match response.json().await {
        Ok(j) => j,
        Err(e) => {
            return CallToolResult::error(format!("Failed to parse forecast: {}", e));
        }
    };

    match format_forecast(place, &body) {
        Some(text) => CallToolResult::text(text),
        None => CallToolResult::error(format!("No forecast available for {}", place)),
    }
}

/// Build the weather provider
pub fn weather_server(client: reqwest::Client, config: FileWeatherConfig) -> Result<ToolServer> {
    ToolServer::new("weather", env!("CARGO_PKG_VERSION")).with_tool(
        get_weather_definition(),
        typed_handler(move |args: WeatherArgs| {
            let client = client.clone();
            let config = config.clone();
            async move { execute_get_weather(&client, &config, args).await }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_office_code_aliases() {
        assert_eq!(office_code("東京"), Some("130000"));
        assert_eq!(office_code(" Tokyo "), Some("130000"));
        assert_eq!(office_code("OSAKA"), Some("270000"));
        assert_eq!(office_code("大阪"), Some("270000"));
        assert_eq!(office_code("Atlantis"), None);
    }

    #[test]
    fn test_format_forecast() {
        let data = json!([{
            "timeSeries": [{
                "timeDefines": [
                    "2025-06-01T11:00:00+09:00",
                    "2025-06-02T00:00:00+09:00",
                    "2025-06-03T00:00:00+09:00",
                    "2025-06-04T00:00:00+09:00"
                ],
                "areas": [{
                    "area": {"name": "東京地方", "code": "130010"},
                    "weathers": ["晴れ　時々　くもり", "くもり", "雨", "晴れ"]
                }]
            }]
        }]);

        let text = format_forecast("東京", &data).unwrap();
        assert_eq!(
            text,
            "天気予報: 東京 (東京地方)\n- 2025-06-01: 晴れ 時々 くもり\n- 2025-06-02: くもり\n- 2025-06-03: 雨"
        );
    }

    #[test]
    fn test_format_forecast_without_entries() {
        assert_eq!(format_forecast("東京", &json!([])), None);
        assert_eq!(format_forecast("東京", &json!({"unexpected": true})), None);
    }

    #[tokio::test]
    async fn test_unknown_place_is_error_result() {
        let result = execute_get_weather(
            &reqwest::Client::new(),
            &FileWeatherConfig::default(),
            WeatherArgs {
                name: "Atlantis".into(),
            },
        )
        .await;
        assert!(result.is_error());
        assert_eq!(result.text_content(), "Unknown location: Atlantis");
    }

    #[tokio::test]
    async fn test_missing_name_is_rejected_before_handler() {
        let server = weather_server(reqwest::Client::new(), FileWeatherConfig::default()).unwrap();
        let result = server
            .call(GET_WEATHER, Default::default())
            .await
            .unwrap();
        assert!(result.is_error());
    }

    #[tokio::test]
    async fn test_blank_name_is_error_result() {
        let result = execute_get_weather(
            &reqwest::Client::new(),
            &FileWeatherConfig::default(),
            WeatherArgs { name: "  ".into() },
        )
        .await;
        assert_eq!(result.text_content(), "name is required");
    }
}
