//! Retrieval backends: vector (ANN over embeddings) and text (BM25 over
//! summaries).
//!
//! Both retrievers fan sub-queries out through
//! [`bounded_join_all`](crate::utils::bounded_join_all) and absorb individual
//! failures: a failed sub-query contributes nothing, it never fails the
//! search. The caller learns how much of the fan-out survived from the
//! `attempted`/`succeeded` counters and decides whether the whole search
//! degraded to nothing.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::embedder::EmbedderClient;
use crate::index::{IndexRow, ProfileIndex};
use crate::profiles::CandidateProfile;
use crate::utils::{bounded_join_all, sanitize_keyword};

/// Vector retrieval output: one ranked batch per query variant, in variant
/// order. Failed variants yield empty batches.
#[derive(Debug, Default)]
pub struct VectorRetrieval {
    pub batches: Vec<Vec<CandidateProfile>>,
    pub attempted: usize,
    pub succeeded: usize,
}

/// Text retrieval output: one merged, deduplicated ranked list.
#[derive(Debug, Default)]
pub struct TextRetrieval {
    pub profiles: Vec<CandidateProfile>,
    pub attempted: usize,
    pub succeeded: usize,
}

/// Retrieves candidates by embedding query variants and running ANN queries.
pub struct VectorRetriever {
    embedder: Arc<dyn EmbedderClient>,
    index: Arc<dyn ProfileIndex>,
}

impl VectorRetriever {
    pub fn new(embedder: Arc<dyn EmbedderClient>, index: Arc<dyn ProfileIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embed all `variants` in one batch call, then query the index once per
    /// variant concurrently. Per-batch row order is the index's ranking and
    /// is preserved; rows are not deduplicated across variants here, since the
    /// aggregator needs every (variant, rank) occurrence for scoring.
    ///
    /// An embedding failure takes the whole vector side down (there is
    /// nothing to query with); a failed index sub-query only empties its own
    /// batch.
    pub async fn retrieve(
        &self,
        variants: &[String],
        top_k: usize,
        pool_cap: usize,
        deadline: Option<Duration>,
    ) -> VectorRetrieval {
        let attempted = variants.len();
        if attempted == 0 {
            return VectorRetrieval::default();
        }

        let texts: Vec<&str> = variants.iter().map(String::as_str).collect();
        let embeddings = match self.embedder.embed_batch(&texts).await {
            Ok(embeddings) if embeddings.len() == attempted => embeddings,
            Ok(embeddings) => {
                warn!(
                    expected = attempted,
                    got = embeddings.len(),
                    "embedding batch size mismatch, skipping vector retrieval"
                );
                return VectorRetrieval {
                    batches: vec![Vec::new(); attempted],
                    attempted,
                    succeeded: 0,
                };
            }
            Err(e) => {
                warn!(error = %e, "embedding failed, skipping vector retrieval");
                return VectorRetrieval {
                    batches: vec![Vec::new(); attempted],
                    attempted,
                    succeeded: 0,
                };
            }
        };

        let futures: Vec<_> = embeddings
            .into_iter()
            .map(|embedding| {
                let index = Arc::clone(&self.index);
                async move { index.query_vector(&embedding, top_k).await }
            })
            .collect();

        let results = bounded_join_all(futures, pool_cap, deadline).await;

        let mut succeeded = 0;
        let batches = results
            .into_iter()
            .enumerate()
            .map(|(variant, result)| match result {
                Ok(rows) => {
                    succeeded += 1;
                    rows.into_iter().map(IndexRow::into_profile).collect()
                }
                Err(e) => {
                    warn!(variant, error = %e, "vector sub-query failed");
                    Vec::new()
                }
            })
            .collect();

        debug!(attempted, succeeded, "vector retrieval complete");
        VectorRetrieval {
            batches,
            attempted,
            succeeded,
        }
    }
}

/// Retrieves candidates by running one BM25 query per keyword.
pub struct TextRetriever {
    index: Arc<dyn ProfileIndex>,
}

impl TextRetriever {
    pub fn new(index: Arc<dyn ProfileIndex>) -> Self {
        Self { index }
    }

    /// Query the index once per keyword concurrently, splitting the `top_k`
    /// budget evenly across keywords (at least 1 each), then merge the
    /// batches in keyword order, dropping ids already seen. The merged
    /// position is the rank the aggregator scores against; the merged list
    /// never exceeds `top_k`.
    pub async fn retrieve(
        &self,
        keywords: &[String],
        top_k: usize,
        pool_cap: usize,
        deadline: Option<Duration>,
    ) -> TextRetrieval {
        let attempted = keywords.len();
        if attempted == 0 {
            return TextRetrieval::default();
        }

        let per_keyword = (top_k / attempted).max(1);

        let futures: Vec<_> = keywords
            .iter()
            .map(|keyword| {
                let keyword = sanitize_keyword(keyword);
                let index = Arc::clone(&self.index);
                async move { index.query_text(&keyword, per_keyword).await }
            })
            .collect();

        let results = bounded_join_all(futures, pool_cap, deadline).await;

        let mut succeeded = 0;
        let mut seen: HashSet<String> = HashSet::new();
        let mut profiles = Vec::new();

        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(rows) => {
                    succeeded += 1;
                    for row in rows {
                        if seen.insert(row.id.clone()) {
                            profiles.push(row.into_profile());
                        }
                    }
                }
                Err(e) => {
                    warn!(keyword = %keywords[i], error = %e, "text sub-query failed");
                }
            }
        }

        // The per-keyword floor of 1 can overshoot the overall budget when
        // there are more keywords than slots.
        profiles.truncate(top_k);

        debug!(
            attempted,
            succeeded,
            merged = profiles.len(),
            "text retrieval complete"
        );
        TextRetrieval {
            profiles,
            attempted,
            succeeded,
        }
    }
}
