//! HTTP client for a namespace-style profile index.
//!
//! Speaks the turbopuffer-style query API: one `POST /v1/namespaces/{ns}/query`
//! endpoint where `rank_by` selects ANN-over-vector or BM25-over-text ranking,
//! and `filters` supports id equality for point lookups.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::errors::{Result, TalentSearchError};
use crate::index::{IndexRow, ProfileIndex};

/// Attributes requested with every query; everything a
/// [`crate::profiles::CandidateProfile`] is built from.
const INCLUDE_ATTRIBUTES: &[&str] = &["id", "name", "email", "location", "summary"];

/// HTTP implementation of [`ProfileIndex`].
pub struct HttpProfileIndex {
    client: reqwest::Client,
    base_url: String,
    namespace: String,
    api_key: String,
    /// Embedding dimension, needed to build the dummy vector for id lookups.
    dim: usize,
}

impl HttpProfileIndex {
    /// Create a new index client.
    ///
    /// # Errors
    /// Returns [`TalentSearchError::Configuration`] if the HTTP client cannot
    /// be constructed (invalid timeout, TLS backend unavailable).
    pub fn new(
        base_url: impl Into<String>,
        namespace: impl Into<String>,
        api_key: impl Into<String>,
        dim: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TalentSearchError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            namespace: namespace.into(),
            api_key: api_key.into(),
            dim,
        })
    }

    fn query_url(&self) -> String {
        format!("{}/v1/namespaces/{}/query", self.base_url, self.namespace)
    }

    /// Issue one query request and parse the `rows` array.
    async fn query(&self, body: serde_json::Value) -> Result<Vec<IndexRow>> {
        let response = self
            .client
            .post(self.query_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TalentSearchError::Index(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TalentSearchError::Index(format!(
                "index query failed: HTTP {status}: {text}"
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TalentSearchError::Index(e.to_string()))?;

        let rows = payload["rows"]
            .as_array()
            .ok_or_else(|| TalentSearchError::Index("response missing rows array".to_string()))?;

        let parsed = rows
            .iter()
            .filter_map(|row| {
                let id = row["id"].as_str()?.to_string();
                let mut attributes = row.as_object().cloned().unwrap_or_default();
                attributes.remove("id");
                Some(IndexRow { id, attributes })
            })
            .collect::<Vec<_>>();

        debug!(rows = parsed.len(), "index query returned");
        Ok(parsed)
    }
}

#[async_trait]
impl ProfileIndex for HttpProfileIndex {
    async fn query_vector(&self, embedding: &[f32], top_k: usize) -> Result<Vec<IndexRow>> {
        self.query(json!({
            "rank_by": ["vector", "ANN", embedding],
            "top_k": top_k,
            "include_attributes": INCLUDE_ATTRIBUTES,
        }))
        .await
    }

    async fn query_text(&self, keyword: &str, top_k: usize) -> Result<Vec<IndexRow>> {
        self.query(json!({
            "rank_by": ["summary", "BM25", keyword],
            "top_k": top_k,
            "include_attributes": INCLUDE_ATTRIBUTES,
        }))
        .await
    }

    async fn fetch(&self, id: &str) -> Result<Option<IndexRow>> {
        // The API has no dedicated get-by-id; an ANN query over a zero vector
        // with an id equality filter serves as the point lookup.
        let dummy_vector = vec![0.0_f32; self.dim];
        let rows = self
            .query(json!({
                "rank_by": ["vector", "ANN", dummy_vector],
                "top_k": 1,
                "filters": ["id", "Eq", id],
                "include_attributes": INCLUDE_ATTRIBUTES,
            }))
            .await?;

        Ok(rows.into_iter().next())
    }
}
