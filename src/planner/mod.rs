//! Query planning: turn a category and free-text query into the concrete
//! retrieval inputs (vector query variants, BM25 keywords, filter spec).
//!
//! Planning never fails a search. Catalog lookups are infallible, and the
//! optional LLM expansion degrades to the catalog-derived plan when the model
//! is unavailable or answers garbage.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::catalog::CategoryCatalog;
use crate::llm_client::{openai::OpenAiLlmClient, LlmClient, Message};
use crate::profiles::FilterSpec;
use crate::prompts;

/// Number of query variants requested from the LLM when the catalog has no
/// domain expansions for a category.
const DEFAULT_EXPANSION_COUNT: usize = 3;

/// The retrieval inputs for one search.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Query variants for vector retrieval, most authoritative first. The
    /// raw query is always variant 0.
    pub variants: Vec<String>,
    /// Keywords for BM25 text retrieval. Never empty.
    pub keywords: Vec<String>,
}

/// Shape the filter-extraction prompt asks the model to produce.
#[derive(Debug, Deserialize, JsonSchema)]
struct ExtractedFilters {
    #[serde(default)]
    must_have: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    preferred: Vec<String>,
}

impl From<ExtractedFilters> for FilterSpec {
    fn from(extracted: ExtractedFilters) -> Self {
        FilterSpec {
            must_have: extracted.must_have,
            exclude: extracted.exclude,
            preferred: extracted.preferred,
        }
    }
}

/// Builds [`QueryPlan`]s from the category catalog, with optional
/// LLM-backed expansion for categories the catalog does not cover.
pub struct QueryPlanner<L = OpenAiLlmClient> {
    catalog: Arc<CategoryCatalog>,
    llm: Option<Arc<L>>,
}

impl QueryPlanner<OpenAiLlmClient> {
    /// Planner that uses only the catalog. The concrete LLM type is a
    /// placeholder; no client is ever constructed.
    pub fn without_llm(catalog: Arc<CategoryCatalog>) -> Self {
        Self { catalog, llm: None }
    }
}

impl<L: LlmClient> QueryPlanner<L> {
    pub fn new(catalog: Arc<CategoryCatalog>, llm: Arc<L>) -> Self {
        Self {
            catalog,
            llm: Some(llm),
        }
    }

    /// Fallback query text when the caller passed an empty query: the
    /// category identifier with filename cruft stripped.
    fn category_text(category: &str) -> String {
        category.replace('_', " ").replace(".yml", "")
    }

    fn base_query(category: &str, query_text: &str) -> String {
        if query_text.trim().is_empty() {
            Self::category_text(category)
        } else {
            query_text.trim().to_string()
        }
    }

    /// Build the retrieval plan for a search.
    ///
    /// Variants are the raw query followed by the catalog's domain
    /// expansions; when the catalog has none, the LLM (if available) is
    /// asked for alternatives. Duplicates are dropped case-insensitively.
    /// The returned plan always has at least one variant and one keyword.
    pub async fn plan(&self, category: &str, query_text: &str) -> QueryPlan {
        let base = Self::base_query(category, query_text);

        let mut expansions = self.catalog.domain_queries(category);
        if expansions.is_empty() {
            expansions = self.expand_with_llm(category, &base).await;
        }

        self.assemble(category, base, expansions)
    }

    /// The plan derived from the catalog alone. This is what [`plan`] returns
    /// when the LLM is skipped, and the fallback when the planning stage is
    /// cut short by the search deadline.
    ///
    /// [`plan`]: Self::plan
    pub fn catalog_plan(&self, category: &str, query_text: &str) -> QueryPlan {
        let base = Self::base_query(category, query_text);
        let expansions = self.catalog.domain_queries(category);
        self.assemble(category, base, expansions)
    }

    fn assemble(&self, category: &str, base: String, expansions: Vec<String>) -> QueryPlan {
        let mut variants = vec![base];
        for expansion in expansions {
            let duplicate = variants
                .iter()
                .any(|v| v.eq_ignore_ascii_case(&expansion));
            if !duplicate && !expansion.trim().is_empty() {
                variants.push(expansion);
            }
        }

        let mut keywords = self.catalog.keywords(category);
        if keywords.is_empty() {
            // A blank category tokenizes to nothing; the query itself is
            // the only keyword left.
            keywords.push(variants[0].clone());
        }

        debug!(
            category,
            variants = variants.len(),
            keywords = keywords.len(),
            "built query plan"
        );
        QueryPlan { variants, keywords }
    }

    /// Resolve the filter spec for a search. Precedence: caller override,
    /// then catalog, then LLM extraction, then no filtering at all.
    pub async fn resolve_filters(
        &self,
        category: &str,
        requested: Option<FilterSpec>,
    ) -> FilterSpec {
        if let Some(spec) = requested {
            if !spec.is_empty() {
                return spec;
            }
        }

        let configured = self.catalog.filters(category);
        if !configured.is_empty() {
            return configured;
        }

        self.extract_filters_with_llm(category).await
    }

    /// Ask the LLM for query variants. Any failure, including a response
    /// that is not a JSON string array, yields no expansions.
    async fn expand_with_llm(&self, category: &str, base: &str) -> Vec<String> {
        let Some(llm) = self.llm.as_ref().filter(|l| l.is_available()) else {
            return Vec::new();
        };

        let messages = [
            Message::system(prompts::QUERY_EXPANSION_SYSTEM),
            Message::user(prompts::query_expansion_prompt(
                category,
                base,
                DEFAULT_EXPANSION_COUNT,
            )),
        ];

        let response = match llm.generate(&messages).await {
            Ok(response) => response,
            Err(e) => {
                warn!(category, error = %e, "query expansion failed, using base query only");
                return Vec::new();
            }
        };

        let Some(payload) = crate::utils::extract_json_from_response(&response) else {
            warn!(category, "expansion response had no JSON payload, using base query only");
            return Vec::new();
        };
        match serde_json::from_str::<Vec<String>>(payload) {
            Ok(expansions) => expansions
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .take(DEFAULT_EXPANSION_COUNT)
                .collect(),
            Err(e) => {
                warn!(category, error = %e, "unparseable expansion response, using base query only");
                Vec::new()
            }
        }
    }

    /// Ask the LLM for a filter spec. Failures mean no filtering, which is
    /// always a safe (if less precise) answer.
    async fn extract_filters_with_llm(&self, category: &str) -> FilterSpec {
        let Some(llm) = self.llm.as_ref().filter(|l| l.is_available()) else {
            return FilterSpec::default();
        };

        let messages = [
            Message::system(prompts::FILTER_EXTRACTION_SYSTEM),
            Message::user(prompts::filter_extraction_prompt(category)),
        ];

        match llm.generate_structured::<ExtractedFilters>(&messages).await {
            Ok(extracted) => extracted.into(),
            Err(e) => {
                warn!(category, error = %e, "filter extraction failed, searching unfiltered");
                FilterSpec::default()
            }
        }
    }
}
