//! Candidate store backends for similarity search.
//!
//! `QdrantStore` is the production backend: it embeds the query through
//! the provider client, then runs a filtered nearest-neighbour query
//! against the Qdrant REST API. Tests fake the trait instead.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::candidate::CandidateRecord;

const STORE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("query embedding failed: {0}")]
    Embedding(#[from] LlmError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vector store error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Similarity search over the externally ingested resume collection.
///
/// `category` is the already-normalized exact-match filter value, or
/// `None` for a full-collection search. Implementations own the mapping
/// from query text to an embedding; results are relevance-ranked and may
/// number fewer than `limit`.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn similarity_search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, RetrievalError>;
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a [f32],
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
    limit: usize,
    with_payload: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    result: QueryResult,
}

#[derive(Deserialize)]
struct QueryResult {
    #[serde(default)]
    points: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    #[serde(default)]
    payload: serde_json::Value,
}

/// Read-only Qdrant REST client. No internal retry — retry policy, if
/// any, belongs to the caller.
pub struct QdrantStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    payload_key: String,
    embedder: LlmClient,
}

impl QdrantStore {
    pub fn new(embedder: LlmClient, config: &Config) -> Result<Self> {
        anyhow::ensure!(
            config.qdrant_url.starts_with("http://") || config.qdrant_url.starts_with("https://"),
            "QDRANT_URL must be an http(s) URL"
        );

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "api-key",
            HeaderValue::from_str(config.qdrant_api_key.trim())
                .context("invalid Qdrant API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(STORE_TIMEOUT)
            .default_headers(headers)
            .build()
            .context("failed to build Qdrant HTTP client")?;

        Ok(Self {
            client,
            base_url: config.qdrant_url.trim_end_matches('/').to_string(),
            collection: config.qdrant_collection.clone(),
            payload_key: config.resume_payload_key.clone(),
            embedder,
        })
    }

    /// Projects a scored point's payload into a `CandidateRecord` using
    /// the configured resume-text payload key. Points without usable text
    /// are dropped.
    fn project(&self, point: ScoredPoint) -> Option<CandidateRecord> {
        let resume_text = point
            .payload
            .get(&self.payload_key)
            .and_then(|v| v.as_str())?
            .to_string();
        let category = point
            .payload
            .get("category")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        Some(CandidateRecord {
            category,
            resume_text,
        })
    }
}

#[async_trait]
impl CandidateStore for QdrantStore {
    async fn similarity_search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, RetrievalError> {
        let vector = self.embedder.embed(query).await?;

        let filter = category.map(|value| {
            serde_json::json!({
                "must": [{"key": "category", "match": {"value": value}}]
            })
        });

        let url = format!(
            "{}/collections/{}/points/query",
            self.base_url, self.collection
        );
        let request = QueryRequest {
            query: &vector,
            filter,
            limit,
            with_payload: true,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: QueryResponse = response.json().await?;
        let records: Vec<CandidateRecord> = payload
            .result
            .points
            .into_iter()
            .filter_map(|p| self.project(p))
            .collect();

        debug!(
            "similarity search returned {} record(s) (category: {:?})",
            records.len(),
            category
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_omits_filter_when_none() {
        let vector = vec![0.1_f32, 0.2];
        let request = QueryRequest {
            query: &vector,
            filter: None,
            limit: 5,
            with_payload: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("filter").is_none());
        assert_eq!(json["limit"], 5);
        assert_eq!(json["with_payload"], true);
    }

    #[test]
    fn test_query_response_parses_payloads() {
        let json = r#"{
            "result": {"points": [
                {"id": 7, "score": 0.91, "payload": {"category": "HR", "resume_text": "A"}}
            ]},
            "status": "ok",
            "time": 0.002
        }"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.result.points.len(), 1);
        assert_eq!(response.result.points[0].payload["category"], "HR");
    }
}
