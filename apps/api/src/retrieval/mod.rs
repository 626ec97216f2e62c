//! The retrieval tool — the one external capability registered with the
//! model. Wraps the user's question in a contextual retrieval query,
//! applies the optional category filter, and renders the top matches as
//! delimiter-joined candidate blocks.

pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::ToolSpec;
use crate::models::candidate::CandidateRecord;
use crate::tools::ToolHandler;
use store::{CandidateStore, RetrievalError};

/// Tool identifier as registered with the model provider.
pub const TOOL_NAME: &str = "get_relevant_docs";

/// Top-K for every similarity search. Fewer results are valid when the
/// (filtered) collection is smaller.
pub const SEARCH_LIMIT: usize = 5;

/// Block separator in the tool's output. The orchestrator and the model
/// depend on stable block delineation — do not change.
pub const CANDIDATE_DELIMITER: &str = "\n---KANDIDAT:\n";

/// Sentinel the model passes when no category is identifiable.
const CATEGORY_SENTINEL: &str = "NONE";

/// Retrieval query template. Replace `{query}` before embedding.
/// Pure string templating — never shown to the end user.
const CONTEXTUAL_QUERY_TEMPLATE: &str = "Carikan contoh resume, CV, dan kriteria kandidat \
    yang paling relevan untuk pertanyaan ini: {query}";

/// Tool description shown to the model.
const TOOL_DESCRIPTION: &str = "Cari relevan resume dari database berdasarkan deskripsi \
    posisi pekerjaan atau pertanyaan terkait jabatan kerja atau perbandingan antar dua \
    posisi pekerjaan, dengan opsi category_filter. Gunakan category_filter saat Anda \
    mengidentifikasi KATEGORI/INDUSTRI dari pertanyaan pengguna (misalnya: 'HR', 'IT', \
    'SALES').";

/// Arguments of a `get_relevant_docs` call as emitted by the model.
#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(default)]
    pub category_filter: Option<String>,
}

/// Wraps the raw query in the fixed retrieval template.
pub fn contextual_query(query: &str) -> String {
    CONTEXTUAL_QUERY_TEMPLATE.replace("{query}", query)
}

/// Normalizes the model-supplied category filter: absent, blank, or the
/// `NONE` sentinel (case-insensitive) means full-collection search;
/// anything else becomes an upper-cased exact-match value.
pub fn normalize_category(filter: Option<&str>) -> Option<String> {
    let raw = filter?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(CATEGORY_SENTINEL) {
        return None;
    }
    Some(raw.to_uppercase())
}

/// Renders records as `Category: …\nResume: …` blocks joined by the
/// candidate delimiter.
pub fn format_candidates(records: &[CandidateRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "Category: {}\nResume: {}",
                r.category.as_deref().unwrap_or("N/A"),
                r.resume_text
            )
        })
        .collect::<Vec<_>>()
        .join(CANDIDATE_DELIMITER)
}

/// The tool's public contract: contextual query → normalized filter →
/// top-K similarity search → formatted candidate blocks. Errors from the
/// store propagate; there is no retry at this level.
pub async fn search_candidates(
    store: &dyn CandidateStore,
    query: &str,
    category_filter: Option<&str>,
) -> Result<String, RetrievalError> {
    let contextual = contextual_query(query);
    let category = normalize_category(category_filter);

    info!(
        "candidate search (filter: {})",
        category.as_deref().unwrap_or("none")
    );

    let records = store
        .similarity_search(&contextual, category.as_deref(), SEARCH_LIMIT)
        .await?;

    Ok(format_candidates(&records))
}

/// `get_relevant_docs` as a registrable tool handler.
pub struct CandidateSearch {
    store: Arc<dyn CandidateStore>,
}

impl CandidateSearch {
    pub fn new(store: Arc<dyn CandidateStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolHandler for CandidateSearch {
    fn spec(&self) -> ToolSpec {
        ToolSpec::function(
            TOOL_NAME,
            TOOL_DESCRIPTION,
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Pertanyaan atau deskripsi posisi yang ingin dicari"
                    },
                    "category_filter": {
                        "type": "string",
                        "description": "Kategori/industri utama dari pertanyaan \
                            (contoh: 'HR', 'IT', 'SALES'); 'NONE' jika tidak teridentifikasi"
                    }
                },
                "required": ["query"]
            }),
        )
    }

    async fn invoke(&self, arguments: &str) -> Result<String, AppError> {
        let args: SearchArgs = serde_json::from_str(arguments).map_err(|e| {
            AppError::Llm(format!("malformed arguments for '{TOOL_NAME}': {e}"))
        })?;

        let output =
            search_candidates(self.store.as_ref(), &args.query, args.category_filter.as_deref())
                .await?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the arguments of every search and serves canned records.
    struct FakeStore {
        calls: Mutex<Vec<(String, Option<String>, usize)>>,
        records: Vec<CandidateRecord>,
    }

    impl FakeStore {
        fn with_records(records: Vec<CandidateRecord>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                records,
            }
        }

        fn calls(&self) -> Vec<(String, Option<String>, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CandidateStore for FakeStore {
        async fn similarity_search(
            &self,
            query: &str,
            category: Option<&str>,
            limit: usize,
        ) -> Result<Vec<CandidateRecord>, RetrievalError> {
            self.calls.lock().unwrap().push((
                query.to_string(),
                category.map(|s| s.to_string()),
                limit,
            ));
            // Honor the filter the way the backing store would
            let records = self
                .records
                .iter()
                .filter(|r| match category {
                    Some(c) => r.category.as_deref() == Some(c),
                    None => true,
                })
                .take(limit)
                .cloned()
                .collect();
            Ok(records)
        }
    }

    fn record(category: &str, text: &str) -> CandidateRecord {
        CandidateRecord {
            category: Some(category.to_string()),
            resume_text: text.to_string(),
        }
    }

    #[test]
    fn test_normalize_category_absent_and_sentinel() {
        assert_eq!(normalize_category(None), None);
        assert_eq!(normalize_category(Some("NONE")), None);
        assert_eq!(normalize_category(Some("none")), None);
        assert_eq!(normalize_category(Some("None")), None);
        assert_eq!(normalize_category(Some("  ")), None);
    }

    #[test]
    fn test_normalize_category_uppercases() {
        assert_eq!(normalize_category(Some("hr")), Some("HR".to_string()));
        assert_eq!(normalize_category(Some(" it ")), Some("IT".to_string()));
        assert_eq!(normalize_category(Some("Sales")), Some("SALES".to_string()));
    }

    #[test]
    fn test_contextual_query_embeds_literal_query() {
        let q = contextual_query("Apa kriteria HR Manager?");
        assert!(q.ends_with("Apa kriteria HR Manager?"));
        assert!(q.starts_with("Carikan contoh resume"));
    }

    #[test]
    fn test_format_candidates_exact_output() {
        let records = vec![record("IT", "A"), record("HR", "B")];
        assert_eq!(
            format_candidates(&records),
            "Category: IT\nResume: A\n---KANDIDAT:\nCategory: HR\nResume: B"
        );
    }

    #[test]
    fn test_format_candidates_missing_category_renders_na() {
        let records = vec![CandidateRecord {
            category: None,
            resume_text: "C".to_string(),
        }];
        assert_eq!(format_candidates(&records), "Category: N/A\nResume: C");
    }

    #[test]
    fn test_format_candidates_empty() {
        assert_eq!(format_candidates(&[]), "");
    }

    #[tokio::test]
    async fn test_search_without_filter_is_unfiltered_top_5() {
        let store = FakeStore::with_records(vec![
            record("IT", "A"),
            record("HR", "B"),
            record("SALES", "C"),
            record("IT", "D"),
            record("HR", "E"),
            record("IT", "F"),
        ]);
        search_candidates(&store, "kandidat terbaik", None)
            .await
            .unwrap();

        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, None);
        assert_eq!(calls[0].2, SEARCH_LIMIT);
    }

    #[tokio::test]
    async fn test_search_with_filter_passes_uppercased_category() {
        let store = FakeStore::with_records(vec![record("HR", "B"), record("IT", "A")]);
        let output = search_candidates(&store, "kriteria HR Manager", Some("hr"))
            .await
            .unwrap();

        let calls = store.calls();
        assert_eq!(calls[0].1.as_deref(), Some("HR"));
        // Every returned record matches the filter the store enforced
        assert_eq!(output, "Category: HR\nResume: B");
    }

    #[tokio::test]
    async fn test_search_sentinel_filter_searches_full_collection() {
        let store = FakeStore::with_records(vec![record("IT", "A")]);
        search_candidates(&store, "kandidat", Some("none"))
            .await
            .unwrap();
        assert_eq!(store.calls()[0].1, None);
    }

    #[tokio::test]
    async fn test_search_query_is_contextualized_before_store_call() {
        let store = FakeStore::with_records(vec![]);
        search_candidates(&store, "Apa kriteria HR Manager?", None)
            .await
            .unwrap();
        let (query, _, _) = &store.calls()[0];
        assert_eq!(query, &contextual_query("Apa kriteria HR Manager?"));
    }

    #[test]
    fn test_search_args_parse_without_filter() {
        let args: SearchArgs = serde_json::from_str(r#"{"query": "Halo"}"#).unwrap();
        assert_eq!(args.query, "Halo");
        assert!(args.category_filter.is_none());
    }

    #[test]
    fn test_search_args_parse_null_filter() {
        let args: SearchArgs =
            serde_json::from_str(r#"{"query": "Halo", "category_filter": null}"#).unwrap();
        assert!(args.category_filter.is_none());
    }

    #[tokio::test]
    async fn test_tool_handler_rejects_malformed_arguments() {
        let handler = CandidateSearch::new(Arc::new(FakeStore::with_records(vec![])));
        let err = handler.invoke("not json").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_tool_handler_spec_name_matches_registry_contract() {
        let handler = CandidateSearch::new(Arc::new(FakeStore::with_records(vec![])));
        assert_eq!(handler.spec().function.name, TOOL_NAME);
    }
}
