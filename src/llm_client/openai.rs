//! OpenAI LLM client implementation.
//!
//! Uses `async-openai` for API calls, `moka` for response caching, and
//! `backoff` for exponential-backoff retry on rate limits / transient errors.

use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::errors::{LlmError, Result, TalentSearchError};

use super::{LlmClient, Message, Role};

// ── Cache configuration ───────────────────────────────────────────────────────

/// Configuration for the in-process response cache.
///
/// Rerank and query-expansion prompts repeat across search calls for the same
/// category, so even a small cache removes most duplicate round trips.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries held in memory.
    pub max_capacity: u64,
    /// How long each entry lives before eviction.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            ttl: Duration::from_secs(3_600), // 1 hour
        }
    }
}

// ── Client struct ─────────────────────────────────────────────────────────────

/// OpenAI LLM client implementing [`LlmClient`].
pub struct OpenAiLlmClient {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    available: bool,
    /// Keyed by `md5(prefix + model + messages)` → serialised response text.
    cache: Cache<String, String>,
}

impl OpenAiLlmClient {
    /// Create a new client.
    ///
    /// An empty `api_key` produces a client that reports itself unavailable
    /// instead of failing at call time; the orchestrator then skips the
    /// rerank stage rather than erroring a whole search.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        cache_config: CacheConfig,
    ) -> Self {
        let api_key = api_key.into();
        let available = !api_key.is_empty();
        let config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        let client = async_openai::Client::with_config(config);

        let cache = Cache::builder()
            .max_capacity(cache_config.max_capacity)
            .time_to_live(cache_config.ttl)
            .build();

        Self {
            client,
            model: model.into(),
            temperature: 0.1,
            max_tokens: 800,
            available,
            cache,
        }
    }

    /// Point the client at a custom API base URL (self-hosted gateways, mocks).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let config = async_openai::config::OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base(base_url.into());
        self.client = async_openai::Client::with_config(config);
        self.available = true;
        self
    }

    /// Override the sampling temperature (default `0.1`).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the max output token limit (default `800`).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Compute an MD5 cache key from prefix + model + message sequence.
    fn cache_key(&self, prefix: &str, messages: &[Message]) -> String {
        use md5::{Digest, Md5};
        let mut h = Md5::new();
        h.update(prefix.as_bytes());
        h.update(self.model.as_bytes());
        for m in messages {
            h.update(role_str(&m.role).as_bytes());
            h.update(m.content.as_bytes());
        }
        format!("{:x}", h.finalize())
    }

    /// Serialise our [`Message`] slice into the JSON array expected by the API.
    fn messages_to_json(messages: &[Message]) -> Vec<serde_json::Value> {
        messages
            .iter()
            .map(|m| {
                json!({
                    "role": role_str(&m.role),
                    "content": m.content,
                })
            })
            .collect()
    }

    /// Call the chat completions endpoint with exponential-backoff retry.
    ///
    /// Retries on [`LlmError::RateLimit`] (HTTP 429) and transient 5xx errors.
    async fn call_with_retry(&self, request: serde_json::Value) -> Result<serde_json::Value> {
        if !self.available {
            return Err(TalentSearchError::Llm(LlmError::Authentication));
        }

        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(500))
            .with_max_interval(Duration::from_secs(30))
            .with_max_elapsed_time(Some(Duration::from_secs(120)))
            .build();

        backoff::future::retry(backoff, || async {
            let outcome: std::result::Result<serde_json::Value, async_openai::error::OpenAIError> =
                self.client.chat().create_byot(request.clone()).await;

            match outcome {
                Ok(response) => Ok(response),
                Err(e) => {
                    let llm_err = map_openai_error(e);
                    match &llm_err {
                        LlmError::RateLimit => {
                            warn!("LLM rate limit hit, retrying with backoff");
                            Err(backoff::Error::transient(llm_err))
                        }
                        LlmError::Api { status, .. } if *status >= 500 => {
                            warn!(status, "transient LLM server error, retrying");
                            Err(backoff::Error::transient(llm_err))
                        }
                        _ => Err(backoff::Error::permanent(llm_err)),
                    }
                }
            }
        })
        .await
        .map_err(TalentSearchError::Llm)
    }

    /// Extract the assistant message text from a chat-completions response.
    fn extract_content(response: &serde_json::Value) -> Result<String> {
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or(TalentSearchError::Llm(LlmError::EmptyResponse))
    }
}

// ── LlmClient implementation ──────────────────────────────────────────────────

#[async_trait]
impl LlmClient for OpenAiLlmClient {
    async fn generate(&self, messages: &[Message]) -> Result<String> {
        let key = self.cache_key("text", messages);

        if let Some(cached) = self.cache.get(&key).await {
            debug!("LLM cache hit (text)");
            return Ok(cached);
        }

        let request = json!({
            "model": self.model,
            "messages": Self::messages_to_json(messages),
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let response = self.call_with_retry(request).await?;
        let content = Self::extract_content(&response)?;

        self.cache.insert(key, content.clone()).await;

        Ok(content)
    }

    async fn generate_structured<T>(&self, messages: &[Message]) -> Result<T>
    where
        T: DeserializeOwned + schemars::JsonSchema + Send,
    {
        // Include the target type name in the cache key so different T for the
        // same messages don't collide.
        let prefix = std::any::type_name::<T>();
        let key = self.cache_key(prefix, messages);

        if let Some(cached) = self.cache.get(&key).await {
            debug!("LLM cache hit (structured/{})", prefix);
            return serde_json::from_str(&cached).map_err(TalentSearchError::Serialization);
        }

        let schema = schemars::schema_for!(T);
        let schema_value = serde_json::to_value(&schema)?;

        let request = json!({
            "model": self.model,
            "messages": Self::messages_to_json(messages),
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "response",
                    "schema": schema_value,
                    "strict": true,
                }
            }
        });

        let response = self.call_with_retry(request).await?;
        let content = Self::extract_content(&response)?;

        self.cache.insert(key, content.clone()).await;

        serde_json::from_str(&content).map_err(TalentSearchError::Serialization)
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn role_str(role: &Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Map an [`async_openai::error::OpenAIError`] to our [`LlmError`] domain type.
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match err {
        OpenAIError::ApiError(api_err) => match api_err.code.as_deref() {
            Some("invalid_api_key") => LlmError::Authentication,
            Some("rate_limit_exceeded") => LlmError::RateLimit,
            _ => LlmError::Api {
                status: 0,
                message: api_err.message,
            },
        },
        other => LlmError::Api {
            status: 0,
            message: other.to_string(),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
