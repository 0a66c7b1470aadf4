//! # talent-search
//!
//! A multi-strategy retrieval and ranking engine for candidate profiles.
//! Queries fan out to a vector (ANN) backend and a BM25 text backend in
//! parallel, scores merge positionally, rule filters narrow the page, and an
//! optional LLM pass reranks the best matches.
//!
//! ## Architecture
//!
//! - **Planning**: per-category query variants and keywords, with LLM
//!   expansion for unconfigured categories
//! - **Hybrid retrieval**: ANN over embeddings + BM25 over summaries, fanned
//!   out under a bounded worker pool with a per-search deadline
//! - **Positional scoring**: weighted reciprocal-rank merge plus a
//!   soft-filter bonus
//! - **Graceful degradation**: failed sub-queries cost their contribution,
//!   never the search
//!
//! ```no_run
//! use talent_search::{SearchConfig, SearchOrchestrator, SearchQuery, SearchStrategy};
//!
//! # async fn run() -> talent_search::Result<()> {
//! let config = SearchConfig::from_env()?;
//! let orchestrator = SearchOrchestrator::from_config(&config)?;
//!
//! let query = SearchQuery::new("board-certified radiologist", "radiology")
//!     .with_strategy(SearchStrategy::LlmEnhanced)
//!     .with_max_candidates(20);
//!
//! let result = orchestrator.search(&query).await?;
//! for (profile, score) in &result.entries {
//!     println!("{} {:.3}", profile.name, score.combined);
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod errors;
pub mod profiles;
pub mod types;

pub mod embedder;
pub mod index;
pub mod llm_client;

pub mod planner;
pub mod prompts;
pub mod ranking;
pub mod rerank;
pub mod retrieval;
pub mod search;

pub mod utils;

pub use catalog::CategoryCatalog;
pub use errors::{Result, TalentSearchError};
pub use profiles::{
    CandidateProfile, CandidateScore, FilterSpec, RankedResult, SearchQuery, SearchReport,
    SearchStrategy,
};
pub use search::SearchOrchestrator;
pub use types::SearchConfig;
