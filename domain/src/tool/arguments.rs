//! Typed arguments, one struct per tool shape.
//!
//! Arguments cross the transport as a JSON object and are decoded into
//! these structs at the handler boundary (after schema validation), so
//! handler bodies never probe a raw map.

use serde::{Deserialize, Serialize};

/// Tools that take no input (e.g. `get-current-time`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

/// `{query}`: free-text search and classification tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryArgs {
    pub query: String,
}

impl QueryArgs {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// `{name}`: weather lookup by free-text place name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherArgs {
    pub name: String,
}

/// `{type, keyword}`: a pre-classified music search.
///
/// `type` stays a string here; unknown values are coerced downstream
/// instead of being rejected at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentArgs {
    #[serde(rename = "type")]
    pub search_type: String,
    pub keyword: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::handler::parse_arguments;
    use serde_json::json;

    #[test]
    fn test_intent_args_rename() {
        let args: IntentArgs = parse_arguments(
            json!({"type": "album", "keyword": "STRAY SHEEP"})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(args.search_type, "album");
        assert_eq!(args.keyword, "STRAY SHEEP");
    }

    #[test]
    fn test_no_args_rejects_extra_fields() {
        let result: Result<NoArgs, _> =
            parse_arguments(json!({"x": 1}).as_object().cloned().unwrap());
        assert!(result.is_err());
    }
}
