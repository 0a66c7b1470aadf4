//! Shared configuration types.

use serde::{Deserialize, Serialize};
use validator::Validate;

fn validate_weight(weight: f64) -> Result<(), validator::ValidationError> {
    if !(0.0..=1.0).contains(&weight) {
        return Err(validator::ValidationError::new("weight must be in [0, 1]"));
    }
    Ok(())
}

fn validate_pool_cap(cap: usize) -> Result<(), validator::ValidationError> {
    if cap == 0 {
        return Err(validator::ValidationError::new("pool cap must be > 0"));
    }
    Ok(())
}

/// Central configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchConfig {
    /// Base URL of the profile index service.
    #[validate(length(min = 1))]
    pub index_url: String,

    /// Index namespace holding the candidate profiles.
    #[validate(length(min = 1))]
    pub index_namespace: String,

    /// API key for the profile index.
    #[validate(length(min = 1))]
    pub index_api_key: String,

    /// OpenAI API key, used for embeddings and (when present) the LLM
    /// stages. Empty means LLM-backed features are disabled.
    #[validate(length(min = 1))]
    pub openai_api_key: String,

    /// Embedding model name.
    pub embedding_model: String,

    /// Chat model used for rerank, expansion, and filter extraction.
    pub llm_model: String,

    /// Weight of the vector component in the combined score.
    #[validate(custom(function = "validate_weight"))]
    pub vector_weight: f64,

    /// Weight of the text component in the combined score.
    #[validate(custom(function = "validate_weight"))]
    pub text_weight: f64,

    /// Weight of the soft-filter component in the combined score.
    #[validate(custom(function = "validate_weight"))]
    pub soft_filter_weight: f64,

    /// Maximum concurrent retrieval sub-queries (must be > 0).
    #[validate(custom(function = "validate_pool_cap"))]
    pub pool_cap: usize,

    /// Per-search retrieval deadline in seconds; `None` disables it.
    pub deadline_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_url: "https://api.turbopuffer.com".to_string(),
            index_namespace: "candidates".to_string(),
            index_api_key: String::new(),
            openai_api_key: String::new(),
            embedding_model: "text-embedding-3-small".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
            vector_weight: 0.6,
            text_weight: 0.4,
            soft_filter_weight: 0.2,
            pool_cap: 5,
            deadline_secs: Some(30),
        }
    }
}

impl SearchConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first (non-fatal if `.env` is absent),
    /// then reads each variable from the process environment. Required
    /// variables (`TALENT_INDEX_API_KEY`, `OPENAI_API_KEY`) return a
    /// [`crate::TalentSearchError::Configuration`] error when absent.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let index_url =
            std::env::var("TALENT_INDEX_URL").unwrap_or(defaults.index_url);

        let index_namespace =
            std::env::var("TALENT_INDEX_NAMESPACE").unwrap_or(defaults.index_namespace);

        let index_api_key = std::env::var("TALENT_INDEX_API_KEY").map_err(|_| {
            crate::TalentSearchError::Configuration("TALENT_INDEX_API_KEY is required".to_string())
        })?;

        let openai_api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            crate::TalentSearchError::Configuration("OPENAI_API_KEY is required".to_string())
        })?;

        let embedding_model =
            std::env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model);

        let llm_model = std::env::var("LLM_MODEL").unwrap_or(defaults.llm_model);

        let vector_weight = env_f64("VECTOR_WEIGHT", defaults.vector_weight)?;
        let text_weight = env_f64("TEXT_WEIGHT", defaults.text_weight)?;
        let soft_filter_weight = env_f64("SOFT_FILTER_WEIGHT", defaults.soft_filter_weight)?;

        let pool_cap = match std::env::var("SEARCH_POOL_CAP") {
            Ok(val) => val.parse::<usize>().map_err(|_| {
                crate::TalentSearchError::Configuration(
                    "SEARCH_POOL_CAP must be a positive integer".to_string(),
                )
            })?,
            Err(_) => defaults.pool_cap,
        };

        let deadline_secs = match std::env::var("SEARCH_DEADLINE_SECS") {
            Ok(val) => {
                let secs = val.parse::<u64>().map_err(|_| {
                    crate::TalentSearchError::Configuration(
                        "SEARCH_DEADLINE_SECS must be a non-negative integer".to_string(),
                    )
                })?;
                // Zero disables the deadline.
                (secs > 0).then_some(secs)
            }
            Err(_) => defaults.deadline_secs,
        };

        let config = Self {
            index_url,
            index_namespace,
            index_api_key,
            openai_api_key,
            embedding_model,
            llm_model,
            vector_weight,
            text_weight,
            soft_filter_weight,
            pool_cap,
            deadline_secs,
        };

        config
            .validate()
            .map_err(|e| crate::TalentSearchError::Configuration(e.to_string()))?;

        Ok(config)
    }
}

fn env_f64(name: &str, default: f64) -> crate::Result<f64> {
    match std::env::var(name) {
        Ok(val) => val.parse::<f64>().map_err(|_| {
            crate::TalentSearchError::Configuration(format!("{name} must be a number"))
        }),
        Err(_) => Ok(default),
    }
}
