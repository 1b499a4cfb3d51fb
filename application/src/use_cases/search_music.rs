//! Search Music use case
//!
//! The query pipeline behind `search-track`:
//!
//! 1. **Classify**: call the `classify-query` tool and parse its output,
//!    falling back to one `{track, query}` intent on any failure
//! 2. **Validate**: coerce unknown types, cap the intent count
//! 3. **Fan-out**: one catalog search per intent, all in flight at once,
//!    each failure isolated to its own line
//! 4. **Reduce**: one line per intent, in classification order

use crate::ports::music_search::{BackendError, MusicSearchPort};
use crate::ports::tool_catalog::ToolCatalogPort;
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use toolbridge_domain::intent::{Classification, ClassificationParseError, Intent, classify_output};
use toolbridge_domain::tool::{arguments::QueryArgs, handler::to_arguments};
use tracing::{debug, info, warn};

/// Name of the classification tool
pub const CLASSIFY_TOOL: &str = "classify-query";

/// Upper bound on intents searched for one query.
///
/// Each intent costs one Spotify request, and a rambling model reply can
/// produce dozens. Intents past the bound are not searched; the output
/// records how many were omitted and renders a closing note for them.
pub const MAX_INTENTS: usize = 5;

/// Errors that can occur during a music search
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchMusicError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Music search backend unavailable: {0}")]
    BackendUnavailable(BackendError),
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMusicOutput {
    /// Intents that were searched, in order
    pub intents: Vec<Intent>,
    /// One rendered line per intent, index-aligned with `intents`
    pub lines: Vec<String>,
    /// Whether classification fell back to the default intent
    pub fallback: bool,
    /// Classified intents dropped by [`MAX_INTENTS`]
    pub omitted: usize,
}

impl SearchMusicOutput {
    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        if self.omitted > 0 {
            text.push_str(&format!(
                "\n({} more intents omitted; at most {} are searched)",
                self.omitted, MAX_INTENTS
            ));
        }
        text
    }
}

/// Use case for classifying and searching a free-text music query
pub struct SearchMusicUseCase<C: ToolCatalogPort + ?Sized, S: MusicSearchPort + ?Sized> {
    classifier: Arc<C>,
    search: Arc<S>,
}

impl<C: ToolCatalogPort + ?Sized, S: MusicSearchPort + ?Sized> SearchMusicUseCase<C, S> {
    pub fn new(classifier: Arc<C>, search: Arc<S>) -> Self {
        Self { classifier, search }
    }

    /// Execute the pipeline for one query
    pub async fn execute(&self, query: &str) -> Result<SearchMusicOutput, SearchMusicError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchMusicError::EmptyQuery);
        }

        let (intents, fallback, omitted) = self.classify(query).await;
        info!(
            intent_count = intents.len(),
            omitted,
            fallback,
            "Classified music query"
        );

        let token = self
            .search
            .authorize()
            .await
            .map_err(SearchMusicError::BackendUnavailable)?;

        let searches = intents
            .iter()
            .map(|intent| self.search.search(&token, intent));
        let results = join_all(searches).await;

        if let Some(err) = total_failure(&results) {
            return Err(SearchMusicError::BackendUnavailable(err));
        }

        let lines = intents
            .iter()
            .zip(results)
            .map(|(intent, result)| match result {
                Ok(items) => intent.render_line(&items),
                Err(e) => {
                    warn!(
                        search_type = %intent.search_type,
                        keyword = %intent.keyword,
                        error = %e,
                        "Search failed; rendering placeholder"
                    );
                    intent.render_line(&[])
                }
            })
            .collect();

        Ok(SearchMusicOutput {
            intents,
            lines,
            fallback,
            omitted,
        })
    }

    /// Classify a query into validated intents, never failing
    async fn classify(&self, query: &str) -> (Vec<Intent>, bool, usize) {
        let classification = match self
            .classifier
            .call_tool(CLASSIFY_TOOL, to_arguments(&QueryArgs::new(query)))
            .await
        {
            Ok(result) if !result.is_error() => classify_output(&result.text_content(), query),
            Ok(result) => {
                warn!(error = %result.text_content(), "Classifier reported an error");
                Classification::fallback(query, ClassificationParseError::Empty)
            }
            Err(e) => {
                warn!(error = %e, "Classifier call failed");
                Classification::fallback(query, ClassificationParseError::Empty)
            }
        };

        if let Some(reason) = &classification.fallback_reason {
            debug!(%reason, "Using fallback intent");
        }
        let fallback = classification.is_fallback();

        let mut intents: Vec<Intent> = classification
            .intents
            .into_iter()
            .map(|raw| {
                if raw.needs_coercion() {
                    debug!(type_name = %raw.type_name, keyword = %raw.keyword, "Coercing unknown search type");
                }
                raw.validate()
            })
            .collect();

        let omitted = intents.len().saturating_sub(MAX_INTENTS);
        if omitted > 0 {
            warn!(omitted, "Too many intents; truncating");
            intents.truncate(MAX_INTENTS);
        }

        (intents, fallback, omitted)
    }
}

/// Every search failed because the backend could not be reached
fn total_failure<T>(results: &[Result<T, BackendError>]) -> Option<BackendError> {
    let mut first = None;
    for result in results {
        match result {
            Err(e) if e.is_unreachable() => {
                first.get_or_insert_with(|| e.clone());
            }
            _ => return None,
        }
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::music_search::AccessToken;
    use crate::ports::tool_catalog::CatalogError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;
    use toolbridge_domain::intent::{MusicItem, SearchType};
    use toolbridge_domain::tool::{ToolArguments, ToolDescriptor, value_objects::CallToolResult};

    /// Classifier catalog answering every call with a fixed result
    struct MockClassifier {
        reply: Result<CallToolResult, CatalogError>,
        queries: Mutex<Vec<String>>,
    }

    impl MockClassifier {
        fn text(text: &str) -> Arc<Self> {
            Self::reply(Ok(CallToolResult::text(text)))
        }

        fn reply(reply: Result<CallToolResult, CatalogError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ToolCatalogPort for MockClassifier {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, CatalogError> {
            Ok(vec![ToolDescriptor::new(CLASSIFY_TOOL, "classify")])
        }

        async fn call_tool(
            &self,
            name: &str,
            arguments: ToolArguments,
        ) -> Result<CallToolResult, CatalogError> {
            assert_eq!(name, CLASSIFY_TOOL);
            let query = arguments["query"].as_str().unwrap_or_default().to_string();
            self.queries.lock().unwrap().push(query);
            self.reply.clone()
        }
    }

    /// Catalog returning one item named after the keyword, failing for the
    /// configured keywords
    #[derive(Default)]
    struct MockSearch {
        failing: Vec<(&'static str, BackendError)>,
        authorize_error: Option<BackendError>,
        authorize_calls: AtomicUsize,
        barrier: Option<Barrier>,
    }

    impl MockSearch {
        fn failing(keyword: &'static str, error: BackendError) -> Self {
            Self {
                failing: vec![(keyword, error)],
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl MusicSearchPort for MockSearch {
        async fn authorize(&self) -> Result<AccessToken, BackendError> {
            self.authorize_calls.fetch_add(1, Ordering::SeqCst);
            match &self.authorize_error {
                Some(e) => Err(e.clone()),
                None => Ok(AccessToken::new("token")),
            }
        }

        async fn search(
            &self,
            token: &AccessToken,
            intent: &Intent,
        ) -> Result<Vec<MusicItem>, BackendError> {
            assert_eq!(token.as_str(), "token");
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            if let Some((_, e)) = self
                .failing
                .iter()
                .find(|(k, _)| *k == "*" || *k == intent.keyword)
            {
                return Err(e.clone());
            }
            if intent.keyword == "nothing" {
                return Ok(vec![]);
            }
            Ok(vec![MusicItem::new(intent.search_type, intent.keyword.clone())])
        }
    }

    fn use_case(
        classifier: Arc<MockClassifier>,
        search: MockSearch,
    ) -> SearchMusicUseCase<MockClassifier, MockSearch> {
        SearchMusicUseCase::new(classifier, Arc::new(search))
    }

    #[tokio::test]
    async fn test_failed_search_becomes_placeholder_in_order() {
        let classifier = MockClassifier::text(
            r#"[{"type":"track","keyword":"Lemon"},{"type":"artist","keyword":"Ado"},{"type":"album","keyword":"BOOTLEG"}]"#,
        );
        let search = MockSearch::failing(
            "Ado",
            BackendError::Status {
                status: 500,
                body: "oops".into(),
            },
        );

        let output = use_case(classifier, search).execute("query").await.unwrap();

        assert_eq!(
            output.lines,
            vec![
                "[track] Lemon: Lemon",
                "[artist] Ado: not found",
                "[album] BOOTLEG: Album: BOOTLEG",
            ]
        );
        assert!(!output.fallback);
    }

    #[tokio::test]
    async fn test_malformed_classification_falls_back() {
        let classifier = MockClassifier::text("I cannot classify this");
        let output = use_case(classifier.clone(), MockSearch::default())
            .execute("  Lemon 米津玄師 ")
            .await
            .unwrap();

        assert!(output.fallback);
        assert_eq!(
            output.intents,
            vec![Intent::new(SearchType::Track, "Lemon 米津玄師")]
        );
        assert_eq!(
            classifier.queries.lock().unwrap().as_slice(),
            ["Lemon 米津玄師"]
        );
    }

    #[tokio::test]
    async fn test_classifier_error_result_falls_back() {
        let classifier = MockClassifier::reply(Ok(CallToolResult::error("model down")));
        let output = use_case(classifier, MockSearch::default())
            .execute("Idol")
            .await
            .unwrap();

        assert!(output.fallback);
        assert_eq!(output.lines, vec!["[track] Idol: Idol"]);
    }

    #[tokio::test]
    async fn test_classifier_transport_error_falls_back() {
        let classifier = MockClassifier::reply(Err(CatalogError::TransportClosed));
        let output = use_case(classifier, MockSearch::default())
            .execute("Idol")
            .await
            .unwrap();

        assert!(output.fallback);
        assert_eq!(output.intents.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_type_coerced_to_playlist() {
        let classifier = MockClassifier::text(r#"{"type":"podcast","keyword":"作業用BGM"}"#);
        let output = use_case(classifier, MockSearch::default())
            .execute("作業用BGM")
            .await
            .unwrap();

        assert_eq!(
            output.intents,
            vec![Intent::new(SearchType::Playlist, "作業用BGM")]
        );
        assert_eq!(output.lines, vec!["[playlist] 作業用BGM: Playlist: 作業用BGM"]);
    }

    #[tokio::test]
    async fn test_empty_results_render_not_found() {
        let classifier = MockClassifier::text(r#"{"type":"album","keyword":"nothing"}"#);
        let output = use_case(classifier, MockSearch::default())
            .execute("nothing")
            .await
            .unwrap();
        assert_eq!(output.render(), "[album] nothing: not found");
    }

    #[tokio::test]
    async fn test_intents_capped() {
        let intents: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"type":"track","keyword":"k{}"}}"#, i))
            .collect();
        let classifier = MockClassifier::text(&format!("[{}]", intents.join(",")));

        let output = use_case(classifier, MockSearch::default())
            .execute("many")
            .await
            .unwrap();
        assert_eq!(output.lines.len(), MAX_INTENTS);
        assert_eq!(output.intents[4].keyword, "k4");
        assert_eq!(output.omitted, 3);

        let rendered = output.render();
        assert_eq!(rendered.lines().count(), MAX_INTENTS + 1);
        assert!(rendered.ends_with("(3 more intents omitted; at most 5 are searched)"));
    }

    #[tokio::test]
    async fn test_render_has_no_note_within_cap() {
        let classifier = MockClassifier::text(r#"[{"type":"track","keyword":"Lemon"}]"#);
        let output = use_case(classifier, MockSearch::default())
            .execute("Lemon")
            .await
            .unwrap();
        assert_eq!(output.omitted, 0);
        assert!(!output.render().contains("omitted"));
    }

    #[tokio::test]
    async fn test_searches_run_concurrently_and_authorize_once() {
        let classifier = MockClassifier::text(
            r#"[{"type":"track","keyword":"a"},{"type":"track","keyword":"b"},{"type":"track","keyword":"c"}]"#,
        );
        let search = Arc::new(MockSearch {
            barrier: Some(Barrier::new(3)),
            ..Default::default()
        });
        let use_case = SearchMusicUseCase::new(classifier, search.clone());

        // Each search waits until all three are in flight
        let output = tokio::time::timeout(Duration::from_secs(5), use_case.execute("abc"))
            .await
            .expect("searches were not concurrent")
            .unwrap();

        assert_eq!(output.lines.len(), 3);
        assert_eq!(search.authorize_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_authorize_failure_is_total_failure() {
        let classifier = MockClassifier::text(r#"{"type":"track","keyword":"Lemon"}"#);
        let search = MockSearch {
            authorize_error: Some(BackendError::NotConfigured("Spotify".into())),
            ..Default::default()
        };

        let err = use_case(classifier, search).execute("Lemon").await.unwrap_err();
        assert_eq!(
            err,
            SearchMusicError::BackendUnavailable(BackendError::NotConfigured("Spotify".into()))
        );
    }

    #[tokio::test]
    async fn test_all_searches_unreachable_is_total_failure() {
        let classifier = MockClassifier::text(
            r#"[{"type":"track","keyword":"a"},{"type":"artist","keyword":"b"}]"#,
        );
        let search = MockSearch::failing("*", BackendError::Unreachable("dns".into()));

        let err = use_case(classifier, search).execute("ab").await.unwrap_err();
        assert!(matches!(err, SearchMusicError::BackendUnavailable(BackendError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let classifier = MockClassifier::text("[]");
        let err = use_case(classifier, MockSearch::default())
            .execute("   ")
            .await
            .unwrap_err();
        assert_eq!(err, SearchMusicError::EmptyQuery);
    }
}
