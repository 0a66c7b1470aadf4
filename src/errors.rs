//! Error types for talent-search.

/// Alias for Results returning [`TalentSearchError`].
pub type Result<T> = std::result::Result<T, TalentSearchError>;

/// Top-level error type for talent-search.
#[derive(Debug, thiserror::Error)]
pub enum TalentSearchError {
    /// Embedding service failed after retries were exhausted.
    #[error("Embedder error: {0}")]
    Embedder(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Vector store or text index returned an error.
    #[error("Index error: {0}")]
    Index(String),

    /// Missing or invalid configuration; callers fall back to defaults.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// LLM-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Rate limited")]
    RateLimit,

    #[error("Model refused to respond")]
    Refusal,

    #[error("Empty response from LLM")]
    EmptyResponse,

    #[error("Authentication failed")]
    Authentication,

    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },
}
