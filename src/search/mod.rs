//! The search orchestrator: plans a query, fans retrieval out, aggregates,
//! filters, and optionally reranks.
//!
//! Failure policy, in one place because every stage obeys it: a sub-query
//! failure costs its contribution and nothing else; only when *every*
//! attempted backend fails does the search come back empty, flagged on the
//! report. The orchestrator itself returns `Err` only for failures that make
//! the call meaningless (it currently has none at runtime; construction can
//! fail on bad configuration).
//!
//! The per-search deadline is one shared budget. Every stage that can stall
//! on a remote service draws from the time remaining: the LLM-backed
//! planning and rerank calls as much as the index fan-outs and hydration.
//! A stage that runs out of budget degrades like any other stage failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};
use tracing::{info, instrument, warn};

use crate::catalog::CategoryCatalog;
use crate::embedder::{openai::OpenAiEmbedder, EmbedderClient};
use crate::errors::Result;
use crate::index::{http::HttpProfileIndex, ProfileIndex};
use crate::llm_client::{
    openai::{CacheConfig, OpenAiLlmClient},
    LlmClient,
};
use crate::planner::QueryPlanner;
use crate::profiles::{
    CandidateProfile, CandidateScore, RankedResult, SearchQuery, SearchReport, SearchStrategy,
};
use crate::ranking::{filters, quality, ScoreAggregator};
use crate::rerank::Reranker;
use crate::retrieval::{TextRetrieval, TextRetriever, VectorRetrieval, VectorRetriever};
use crate::types::SearchConfig;
use crate::utils::bounded_join_all;

/// HTTP timeout for individual index requests.
const INDEX_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type Entries = Vec<(CandidateProfile, CandidateScore)>;

/// Executes [`SearchQuery`]s end to end.
pub struct SearchOrchestrator<L = OpenAiLlmClient> {
    catalog: Arc<CategoryCatalog>,
    index: Arc<dyn ProfileIndex>,
    vector: VectorRetriever,
    text: TextRetriever,
    planner: QueryPlanner<L>,
    reranker: Option<Reranker<L>>,
    vector_weight: f64,
    text_weight: f64,
    soft_filter_weight: f64,
    pool_cap: usize,
    deadline: Option<Duration>,
}

impl SearchOrchestrator<OpenAiLlmClient> {
    /// Orchestrator without LLM support; [`SearchStrategy::LlmEnhanced`]
    /// degrades to plain hybrid search.
    pub fn new(
        embedder: Arc<dyn EmbedderClient>,
        index: Arc<dyn ProfileIndex>,
        catalog: Arc<CategoryCatalog>,
    ) -> Self {
        Self {
            vector: VectorRetriever::new(embedder, Arc::clone(&index)),
            text: TextRetriever::new(Arc::clone(&index)),
            planner: QueryPlanner::without_llm(Arc::clone(&catalog)),
            reranker: None,
            catalog,
            index,
            vector_weight: 0.6,
            text_weight: 0.4,
            soft_filter_weight: 0.2,
            pool_cap: 5,
            deadline: Some(Duration::from_secs(30)),
        }
    }

    /// Wire up the full stack (OpenAI embedder and LLM, HTTP index, builtin
    /// catalog) from a [`SearchConfig`].
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let embedder = Arc::new(OpenAiEmbedder::new(
            &config.openai_api_key,
            &config.embedding_model,
        ));
        let index = Arc::new(HttpProfileIndex::new(
            &config.index_url,
            &config.index_namespace,
            &config.index_api_key,
            embedder.dim(),
            INDEX_REQUEST_TIMEOUT,
        )?);
        let llm = Arc::new(OpenAiLlmClient::new(
            &config.openai_api_key,
            &config.llm_model,
            CacheConfig::default(),
        ));

        Ok(Self::new(embedder, index, Arc::new(CategoryCatalog::builtin()))
            .with_llm(llm)
            .with_weights(
                config.vector_weight,
                config.text_weight,
                config.soft_filter_weight,
            )
            .with_pool_cap(config.pool_cap)
            .with_deadline(config.deadline_secs.map(Duration::from_secs)))
    }
}

impl<L: LlmClient> SearchOrchestrator<L> {
    /// Attach an LLM client, enabling query expansion, filter extraction,
    /// and the rerank pass.
    pub fn with_llm<M: LlmClient>(self, llm: Arc<M>) -> SearchOrchestrator<M> {
        SearchOrchestrator {
            planner: QueryPlanner::new(Arc::clone(&self.catalog), Arc::clone(&llm)),
            reranker: Some(Reranker::new(llm, Arc::clone(&self.catalog))),
            catalog: self.catalog,
            index: self.index,
            vector: self.vector,
            text: self.text,
            vector_weight: self.vector_weight,
            text_weight: self.text_weight,
            soft_filter_weight: self.soft_filter_weight,
            pool_cap: self.pool_cap,
            deadline: self.deadline,
        }
    }

    pub fn with_weights(mut self, vector: f64, text: f64, soft_filter: f64) -> Self {
        self.vector_weight = vector;
        self.text_weight = text;
        self.soft_filter_weight = soft_filter;
        self
    }

    pub fn with_pool_cap(mut self, pool_cap: usize) -> Self {
        self.pool_cap = pool_cap;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Time left on the per-search budget, zero once the deadline has
    /// passed. `None` when the search has no deadline at all.
    fn remaining(&self, started: Instant) -> Option<Duration> {
        self.deadline
            .map(|limit| limit.saturating_sub(started.elapsed()))
    }

    /// Run one search.
    #[instrument(skip(self, query), fields(category = %query.category, strategy = ?query.strategy))]
    pub async fn search(&self, query: &SearchQuery) -> Result<RankedResult> {
        let started = Instant::now();

        let plan = stage_within(
            self.remaining(started),
            self.planner.plan(&query.category, &query.query_text),
            || {
                warn!(category = %query.category, "query planning timed out, using the catalog plan");
                self.planner.catalog_plan(&query.category, &query.query_text)
            },
        )
        .await;
        let filter_spec = stage_within(
            self.remaining(started),
            self.planner
                .resolve_filters(&query.category, query.filters.clone()),
            || {
                warn!(category = %query.category, "filter resolution timed out, using catalog filters");
                self.catalog.filters(&query.category)
            },
        )
        .await;

        let top_k = query.max_candidates;
        let (vector, text) = match query.strategy {
            SearchStrategy::VectorOnly => (
                self.vector
                    .retrieve(&plan.variants, top_k, self.pool_cap, self.remaining(started))
                    .await,
                TextRetrieval::default(),
            ),
            SearchStrategy::TextOnly => (
                VectorRetrieval::default(),
                self.text
                    .retrieve(&plan.keywords, top_k, self.pool_cap, self.remaining(started))
                    .await,
            ),
            SearchStrategy::Hybrid | SearchStrategy::LlmEnhanced => tokio::join!(
                self.vector
                    .retrieve(&plan.variants, top_k, self.pool_cap, self.remaining(started)),
                self.text
                    .retrieve(&plan.keywords, top_k, self.pool_cap, self.remaining(started)),
            ),
        };

        let mut report = SearchReport {
            vector_variants: vector.attempted,
            vector_succeeded: vector.succeeded,
            text_keywords: text.attempted,
            text_succeeded: text.succeeded,
            reranked: false,
            all_backends_failed: false,
        };

        let attempted = vector.attempted + text.attempted;
        if attempted > 0 && vector.succeeded == 0 && text.succeeded == 0 {
            report.all_backends_failed = true;
            info!(category = %query.category, "all retrieval backends failed");
            return Ok(RankedResult {
                entries: Vec::new(),
                report,
            });
        }

        let aggregator = ScoreAggregator::new(
            self.vector_weight,
            self.text_weight,
            self.soft_filter_weight,
        );
        let mut entries = aggregator.aggregate(&vector, &text, &filter_spec);
        entries.truncate(query.max_candidates);
        let mut entries = filters::apply_hard(entries, &filter_spec);

        self.hydrate(&mut entries, self.remaining(started)).await;

        if query.strategy == SearchStrategy::LlmEnhanced {
            if let Some(reranker) = &self.reranker {
                let unranked = entries.clone();
                let (reranked, applied) = stage_within(
                    self.remaining(started),
                    reranker.rerank(&query.category, entries),
                    move || {
                        warn!(category = %query.category, "rerank timed out, keeping score order");
                        (unranked, false)
                    },
                )
                .await;
                entries = reranked;
                report.reranked = applied;
                if applied {
                    // Page depth follows profile quality; the rerank order
                    // itself is preserved.
                    let criteria = self.catalog.criteria(&query.category);
                    entries = quality::retain_quality(entries, &criteria);
                    let depth = quality::adjusted_count(&entries, &criteria);
                    entries.truncate(depth);
                }
            }
        }

        info!(
            category = %query.category,
            results = entries.len(),
            reranked = report.reranked,
            "search complete"
        );
        Ok(RankedResult { entries, report })
    }

    /// Fill in summaries missing from retrieval rows with point lookups.
    /// Lookup failures leave the thin profile in place.
    async fn hydrate(&self, entries: &mut Entries, deadline: Option<Duration>) {
        let missing: Vec<(usize, String)> = entries
            .iter()
            .enumerate()
            .filter(|(_, (profile, _))| profile.summary.is_none())
            .map(|(slot, (profile, _))| (slot, profile.id.clone()))
            .collect();

        if missing.is_empty() {
            return;
        }

        let futures: Vec<_> = missing
            .iter()
            .map(|(_, id)| {
                let index = Arc::clone(&self.index);
                let id = id.clone();
                async move { index.fetch(&id).await }
            })
            .collect();

        let results = bounded_join_all(futures, self.pool_cap, deadline).await;

        for ((slot, _), result) in missing.into_iter().zip(results) {
            if let Ok(Some(row)) = result {
                let hydrated = row.into_profile();
                if hydrated.summary.is_some() {
                    entries[slot].0 = hydrated;
                }
            }
        }
    }
}

/// Run one pipeline stage under the remaining deadline budget. When the
/// budget elapses first the stage is cancelled and the fallback stands in
/// for its result.
async fn stage_within<T>(
    budget: Option<Duration>,
    stage: impl Future<Output = T>,
    fallback: impl FnOnce() -> T,
) -> T {
    match budget {
        Some(budget) => match timeout(budget, stage).await {
            Ok(value) => value,
            Err(_) => fallback(),
        },
        None => stage.await,
    }
}
