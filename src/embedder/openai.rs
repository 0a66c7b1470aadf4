//! OpenAI-compatible embedding client.
//!
//! Wraps [`async_openai`] to provide [`EmbedderClient`], with chunked batch
//! support and exponential-backoff retry on transient network failures.

use async_openai::{
    config::OpenAIConfig, error::OpenAIError, types::CreateEmbeddingRequestArgs, Client,
};
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoffBuilder};
use std::time::Duration;
use tracing::debug;

use crate::embedder::{EmbedderClient, Embedding};
use crate::errors::{Result, TalentSearchError};

/// Default embedding model name.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Maximum number of inputs per embeddings API call.
const BATCH_CHUNK_SIZE: usize = 2048;

/// Return the embedding dimension for a given model name.
///
/// Falls back to 1536 (the `text-embedding-3-small` dimension) for
/// unrecognised models.
fn model_dim(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => 1536,
    }
}

/// Classify an [`OpenAIError`] as transient (should retry) or permanent.
///
/// Network-level failures (timeouts, connection refused) retry; auth and bad
/// requests do not; retrying a bad API key only burns the backoff budget.
fn classify_error(err: OpenAIError) -> backoff::Error<TalentSearchError> {
    let msg = err.to_string();
    match &err {
        OpenAIError::Reqwest(e) if e.is_timeout() || e.is_connect() => {
            backoff::Error::transient(TalentSearchError::Embedder(msg))
        }
        _ => backoff::Error::permanent(TalentSearchError::Embedder(msg)),
    }
}

/// OpenAI-compatible embedding client that implements [`EmbedderClient`].
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dim: usize,
}

impl OpenAiEmbedder {
    /// Create a new embedder.
    ///
    /// # Arguments
    /// * `api_key` – API key for the embeddings endpoint.
    /// * `model`   – Embedding model name (e.g. [`DEFAULT_MODEL`]).
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        let dim = model_dim(&model);
        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Self {
            client: Client::with_config(config),
            model,
            dim,
        }
    }

    /// Create a new embedder pointing at a custom API base URL.
    ///
    /// Used against self-hosted OpenAI-compatible embedding services, and in
    /// unit tests where a [`wiremock`] server acts as the endpoint.
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let model = model.into();
        let dim = model_dim(&model);
        let config = OpenAIConfig::new()
            .with_api_key(api_key.into())
            .with_api_base(base_url.into());
        Self {
            client: Client::with_config(config),
            model,
            dim,
        }
    }

    /// Issue a single embeddings API call for up to [`BATCH_CHUNK_SIZE`] texts.
    ///
    /// Retries transient network failures with exponential back-off
    /// (initial 500 ms, cap 10 s, total budget 30 s).
    async fn embed_chunk(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let backoff_policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(500))
            .with_max_interval(Duration::from_secs(10))
            .with_max_elapsed_time(Some(Duration::from_secs(30)))
            .build();

        // Materialise owned data before entering the retry closure.
        let input: Vec<String> = texts.iter().map(|s| (*s).to_owned()).collect();
        let model = self.model.clone();
        let client = self.client.clone();

        retry(backoff_policy, move || {
            let input = input.clone();
            let model = model.clone();
            let client = client.clone();
            async move {
                let request = CreateEmbeddingRequestArgs::default()
                    .model(model.as_str())
                    .input(input)
                    .build()
                    .map_err(|e| {
                        backoff::Error::permanent(TalentSearchError::Embedder(e.to_string()))
                    })?;

                let response = client
                    .embeddings()
                    .create(request)
                    .await
                    .map_err(classify_error)?;

                let embeddings: Vec<Embedding> = response
                    .data
                    .into_iter()
                    .map(|item| item.embedding.into_iter().map(|x| x as f32).collect())
                    .collect();

                debug!(count = embeddings.len(), "embedded query chunk");
                Ok(embeddings)
            }
        })
        .await
    }
}

#[async_trait]
impl EmbedderClient for OpenAiEmbedder {
    /// Embed a single query string.
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut embeddings = self.embed_chunk(&[text]).await?;
        embeddings.pop().ok_or_else(|| {
            TalentSearchError::Embedder("empty response from embedding API".to_string())
        })
    }

    /// Embed multiple query variants, splitting into chunks of at most
    /// [`BATCH_CHUNK_SIZE`] items to respect per-call input limits.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut result = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(BATCH_CHUNK_SIZE) {
            let chunk_embeddings = self.embed_chunk(chunk).await?;
            result.extend(chunk_embeddings);
        }
        Ok(result)
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    /// Build a JSON body mimicking a real embeddings response.
    fn make_response(count: usize, dim: usize) -> serde_json::Value {
        let data: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "object": "embedding",
                    "index": i,
                    "embedding": vec![0.1_f32; dim],
                })
            })
            .collect();
        serde_json::json!({
            "object": "list",
            "data": data,
            "model": "text-embedding-3-small",
            "usage": { "prompt_tokens": 8, "total_tokens": 8 },
        })
    }

    async fn mount_ok(server: &MockServer, count: usize, dim: usize) {
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(make_response(count, dim)))
            .mount(server)
            .await;
    }

    fn embedder(server: &MockServer) -> OpenAiEmbedder {
        OpenAiEmbedder::with_base_url("sk-test", DEFAULT_MODEL, server.uri())
    }

    #[test]
    fn dim_for_known_and_unknown_models() {
        assert_eq!(
            OpenAiEmbedder::new("key", "text-embedding-3-small").dim(),
            1536
        );
        assert_eq!(
            OpenAiEmbedder::new("key", "text-embedding-3-large").dim(),
            3072
        );
        assert_eq!(OpenAiEmbedder::new("key", "some-future-model").dim(), 1536);
    }

    #[tokio::test]
    async fn embed_returns_vector_of_correct_length() {
        let server = MockServer::start().await;
        mount_ok(&server, 1, 4).await;

        let embedding = embedder(&server)
            .embed("family medicine physician EHR")
            .await
            .unwrap();
        assert_eq!(embedding.len(), 4);
    }

    #[tokio::test]
    async fn embed_empty_data_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [],
                "model": "text-embedding-3-small",
                "usage": { "prompt_tokens": 0, "total_tokens": 0 },
            })))
            .mount(&server)
            .await;

        let result = embedder(&server).embed("test").await;
        assert!(matches!(
            result.unwrap_err(),
            TalentSearchError::Embedder(_)
        ));
    }

    #[tokio::test]
    async fn embed_batch_returns_one_embedding_per_input() {
        let server = MockServer::start().await;
        mount_ok(&server, 3, 4).await;

        let texts = ["tax attorney", "corporate lawyer", "JD degree"];
        let embeddings = embedder(&server).embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 3);
    }

    #[tokio::test]
    async fn embed_batch_empty_slice_makes_no_call() {
        let server = MockServer::start().await;
        let embeddings = embedder(&server).embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }

    #[tokio::test]
    async fn auth_error_is_permanent_embedder_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {
                    "message": "Incorrect API key provided.",
                    "type": "authentication_error",
                    "param": null,
                    "code": "invalid_api_key",
                }
            })))
            .mount(&server)
            .await;

        let result = embedder(&server).embed("test").await;
        assert!(matches!(
            result.unwrap_err(),
            TalentSearchError::Embedder(_)
        ));
    }
}
