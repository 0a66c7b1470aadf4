//! Profile index abstraction.
//!
//! The engine is a client of one external namespace-style index that serves
//! both retrieval modes: approximate-nearest-neighbor queries over embedding
//! vectors and BM25 ranked queries over the summary text. Rows are converted
//! to [`CandidateProfile`] here, at the retrieval boundary, and nowhere else.
//!
//! Implementations do not retry; the retrieval layer decides how failures
//! degrade. Retrying here would amplify across parallel sub-queries.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::profiles::CandidateProfile;

/// One row returned by an index query: an identity plus whatever attributes
/// the index stores for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRow {
    pub id: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl IndexRow {
    fn attr(&self, key: &str) -> Option<String> {
        self.attributes
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Convert an index row into a typed profile. The summary attribute is
    /// stored as `summary` on newer namespaces and `rerank_summary` on older
    /// ones; both are accepted.
    pub fn into_profile(self) -> CandidateProfile {
        let name = self.attr("name").unwrap_or_default();
        let email = self.attr("email");
        let location = self.attr("location").or_else(|| self.attr("country"));
        let summary = self.attr("summary").or_else(|| self.attr("rerank_summary"));
        CandidateProfile {
            id: self.id,
            name,
            email,
            location,
            summary,
        }
    }
}

/// Trait for the external profile index backend.
#[async_trait]
pub trait ProfileIndex: Send + Sync {
    /// ANN query: rows ranked by vector similarity, descending.
    async fn query_vector(&self, embedding: &[f32], top_k: usize) -> Result<Vec<IndexRow>>;

    /// BM25 query over the summary field: rows ranked by relevance, descending.
    async fn query_text(&self, keyword: &str, top_k: usize) -> Result<Vec<IndexRow>>;

    /// Point lookup by id, used to hydrate full profiles after aggregation.
    async fn fetch(&self, id: &str) -> Result<Option<IndexRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str, attrs: serde_json::Value) -> IndexRow {
        IndexRow {
            id: id.to_string(),
            attributes: attrs.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_into_profile_maps_attributes() {
        let profile = row(
            "c1",
            json!({
                "name": "Alice",
                "email": "alice@example.com",
                "location": "Boston",
                "summary": "MD physician"
            }),
        )
        .into_profile();

        assert_eq!(profile.id, "c1");
        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.email.as_deref(), Some("alice@example.com"));
        assert_eq!(profile.location.as_deref(), Some("Boston"));
        assert_eq!(profile.summary.as_deref(), Some("MD physician"));
    }

    #[test]
    fn test_into_profile_accepts_legacy_summary_attribute() {
        let profile = row("c2", json!({"name": "Bob", "rerank_summary": "tax lawyer"}))
            .into_profile();
        assert_eq!(profile.summary.as_deref(), Some("tax lawyer"));
    }

    #[test]
    fn test_into_profile_with_missing_attributes() {
        let profile = row("c3", json!({})).into_profile();
        assert_eq!(profile.id, "c3");
        assert!(profile.name.is_empty());
        assert!(profile.email.is_none());
        assert!(profile.summary.is_none());
    }

    #[test]
    fn test_empty_string_attributes_become_none() {
        let profile = row("c4", json!({"name": "Carol", "email": ""})).into_profile();
        assert!(profile.email.is_none());
    }
}
