//! Embedder client abstraction.
//!
//! Query text becomes a fixed-dimensionality vector here before it reaches
//! the vector index. Implementations own their own transient-failure retry;
//! callers see either an embedding or an [`crate::TalentSearchError::Embedder`]
//! error after retries are exhausted.

pub mod openai;

use async_trait::async_trait;

use crate::errors::Result;

/// A vector embedding (f32 components).
pub type Embedding = Vec<f32>;

/// Trait for text-to-vector embedding clients.
#[async_trait]
pub trait EmbedderClient: Send + Sync {
    /// Generate an embedding for a single text string.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Generate embeddings for a batch of texts.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Returns the dimensionality of embeddings produced by this client.
    fn dim(&self) -> usize;
}
