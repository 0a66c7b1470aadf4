//! Candidate profile data model.
//!
//! Profiles are constructed once at the retrieval boundary (from index rows)
//! and flow through the pipeline immutably. Downstream code never branches on
//! representation; everything it needs is a typed field here.

use serde::{Deserialize, Serialize};

/// A candidate profile as returned by a retrieval backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// Opaque backend identity, the merge key across all retrieval strategies.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Free-text summary used for filtering and reranking digests.
    #[serde(default)]
    pub summary: Option<String>,
}

impl CandidateProfile {
    /// Lowercased name + summary, the haystack for filter predicates.
    pub fn searchable_text(&self) -> String {
        let summary = self.summary.as_deref().unwrap_or("");
        format!("{} {}", self.name, summary).to_lowercase()
    }

    /// Whether the profile text contains `keyword` (case-insensitive).
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.searchable_text().contains(&keyword.to_lowercase())
    }
}

/// Retrieval strategy selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    VectorOnly,
    TextOnly,
    Hybrid,
    /// Hybrid retrieval followed by an LLM rerank pass.
    LlmEnhanced,
}

/// A single search request. Immutable once built.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query_text: String,
    /// Category identifier, e.g. `"tax_lawyer"` (a trailing `.yml` is tolerated).
    pub category: String,
    pub strategy: SearchStrategy,
    pub max_candidates: usize,
    /// Overrides the catalog's filter spec for this call when set.
    pub filters: Option<FilterSpec>,
}

impl SearchQuery {
    pub fn new(query_text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            category: category.into(),
            strategy: SearchStrategy::Hybrid,
            max_candidates: 100,
            filters: None,
        }
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Category name with separators and config suffix stripped,
    /// e.g. `"tax_lawyer.yml"` → `"tax lawyer"`.
    pub fn category_name(&self) -> String {
        self.category.replace('_', " ").replace(".yml", "")
    }
}

/// Hard and soft filter predicates for one category.
///
/// All matching is case-insensitive substring against
/// [`CandidateProfile::searchable_text`]. Empty lists are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Conjunctive: every term must appear.
    #[serde(default)]
    pub must_have: Vec<String>,
    /// Disjunctive: any match rejects the candidate.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Soft: each match contributes to the soft-filter score component.
    #[serde(default)]
    pub preferred: Vec<String>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.must_have.is_empty() && self.exclude.is_empty() && self.preferred.is_empty()
    }
}

/// Per-candidate score accumulator.
///
/// Components are accumulated additively while retrieval results are folded
/// in; [`CandidateScore::combine`] must be the last write, `combined` is not
/// meaningful before it runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub candidate_id: String,
    pub vector: f64,
    pub text: f64,
    pub soft_filter: f64,
    pub combined: f64,
}

impl CandidateScore {
    pub fn new(candidate_id: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            vector: 0.0,
            text: 0.0,
            soft_filter: 0.0,
            combined: 0.0,
        }
    }

    /// Fold the components into `combined` using the given weights.
    pub fn combine(&mut self, vector_weight: f64, text_weight: f64, soft_weight: f64) -> f64 {
        self.combined = self.vector * vector_weight
            + self.text * text_weight
            + self.soft_filter * soft_weight;
        self.combined
    }
}

/// Which backends contributed to a search, and how the pipeline degraded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Query variants issued to the vector backend.
    pub vector_variants: usize,
    /// Vector variants that returned results.
    pub vector_succeeded: usize,
    /// Keywords issued to the text backend.
    pub text_keywords: usize,
    /// Keyword sub-queries that returned results.
    pub text_succeeded: usize,
    /// True when the LLM rerank pass actually reordered the results.
    pub reranked: bool,
    /// True when every retrieval backend failed; the result set is empty for
    /// that reason rather than because nothing matched.
    pub all_backends_failed: bool,
}

/// Final ordered output of a search call.
#[derive(Debug, Clone, Default)]
pub struct RankedResult {
    pub entries: Vec<(CandidateProfile, CandidateScore)>,
    pub report: SearchReport,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|(p, _)| p.id.as_str()).collect()
    }
}
