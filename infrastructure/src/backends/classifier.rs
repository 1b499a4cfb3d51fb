//! `classify-query` tool: asks the language model to split a free-text music
//! query into `{type, keyword}` intents.
//!
//! The tool returns the model's raw text. Parsing and the `{track, query}`
//! fallback happen in the query pipeline, so a misbehaving model never
//! fails the call.

use std::sync::Arc;

use toolbridge_application::{CLASSIFY_TOOL, LanguageModel};
use toolbridge_domain::tool::{
    CallToolResult, QueryArgs, SchemaProperty, ToolDescriptor, typed_handler,
};
use tracing::warn;

use crate::federation::{ToolServer, error::Result};

const PROMPT_HEADER: &str = r#"あなたはSpotify検索用の分類アシスタントです。
ユーザーの入力に応じて、検索タイプを以下のカテゴリに分類してください:
- "track"（曲）
- "artist"（アーティスト）
- "album"（アルバム）
- "playlist"（プレイリスト）

出力は必ず JSON 形式のみで、以下のキーを持たせてください:
{
  "type": <カテゴリ>,
  "keyword": <検索に使うキーワード>
}
入力に複数の検索対象が含まれる場合は、オブジェクトの JSON 配列で出力してください。

例をいくつか示します:

入力: "Lemon"
出力: {"type": "track", "keyword": "Lemon"}

入力: "米津玄師"
出力: {"type": "artist", "keyword": "米津玄師"}

入力: "Lemon 米津玄師"
出力: {"type": "track", "keyword": "Lemon 米津玄師"}

入力: "アルバム STRAY SHEEP"
出力: {"type": "album", "keyword": "STRAY SHEEP"}

入力: "宇多田ヒカル First Love"
出力: {"type": "album", "keyword": "First Love"}

入力: "作業用BGM"
出力: {"type": "playlist", "keyword": "作業用BGM"}
"#;

pub fn classify_query_definition() -> ToolDescriptor {
    ToolDescriptor::new(CLASSIFY_TOOL, "Classify a music search query for Spotify")
        .with_property(SchemaProperty::required("query", "Free-text music query"))
}

/// Few-shot classification prompt for one query
pub fn classification_prompt(query: &str) -> String {
    let escaped = query.replace('"', "\\\"");
    format!("{}\n入力: \"{}\"\n出力:\n", PROMPT_HEADER, escaped.trim())
}

/// Build the classifier provider
pub fn classifier_server(model: Arc<dyn LanguageModel>) -> Result<ToolServer> {
    ToolServer::new("classifier", env!("CARGO_PKG_VERSION")).with_tool(
        classify_query_definition(),
        typed_handler(move |args: QueryArgs| {
            let model = Arc::clone(&model);
            async move {
                match model.generate(&classification_prompt(&args.query)).await {
                    Ok(raw) => CallToolResult::text(raw),
                    Err(e) => {
                        warn!(error = %e, "Classification model call failed");
                        CallToolResult::error(format!("Classification failed: {}", e))
                    }
                }
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use toolbridge_application::ModelError;
    use toolbridge_domain::tool::to_arguments;

    struct RecordingModel {
        reply: std::result::Result<String, ModelError>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        async fn generate(&self, prompt: &str) -> std::result::Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    #[test]
    fn test_prompt_ends_with_query() {
        let prompt = classification_prompt("  Lemon ");
        assert!(prompt.contains("\"playlist\""));
        assert!(prompt.ends_with("入力: \"Lemon\"\n出力:\n"));
    }

    #[test]
    fn test_prompt_escapes_quotes() {
        let prompt = classification_prompt(r#"say "hi""#);
        assert!(prompt.contains(r#"入力: "say \"hi\"""#));
    }

    #[tokio::test]
    async fn test_returns_raw_model_text() {
        let model = Arc::new(RecordingModel {
            reply: Ok("```json\n{\"type\":\"artist\",\"keyword\":\"YOASOBI\"}\n```".into()),
            prompts: Mutex::new(Vec::new()),
        });
        let server = classifier_server(model.clone()).unwrap();

        let result = server
            .call(CLASSIFY_TOOL, to_arguments(&QueryArgs::new("YOASOBI")))
            .await
            .unwrap();

        assert!(!result.is_error());
        assert!(result.text_content().starts_with("```json"));
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_is_error_result() {
        let model = Arc::new(RecordingModel {
            reply: Err(ModelError::Unreachable("connection refused".into())),
            prompts: Mutex::new(Vec::new()),
        });
        let server = classifier_server(model).unwrap();

        let result = server
            .call(CLASSIFY_TOOL, to_arguments(&QueryArgs::new("Lemon")))
            .await
            .unwrap();

        assert!(result.is_error());
        assert!(result.text_content().contains("connection refused"));
    }
}
