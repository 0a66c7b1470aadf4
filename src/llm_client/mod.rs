//! LLM client abstraction.
//!
//! The engine treats the model as an untrusted collaborator: responses are
//! plain text that downstream code JSON-parses defensively, or structured
//! output constrained by a `schemars`-derived schema.
//!
//! # Implementations
//! - [`openai::OpenAiLlmClient`]: OpenAI chat models via `async-openai`.

pub mod openai;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::Result;

/// A chat message for the LLM conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Speaker role in a chat conversation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Trait for LLM clients.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a request and return the response as plain text.
    async fn generate(&self, messages: &[Message]) -> Result<String>;

    /// Send a request and parse the response as a structured JSON type,
    /// constraining the model output with a JSON schema derived from `T`.
    async fn generate_structured<T>(&self, messages: &[Message]) -> Result<T>
    where
        T: DeserializeOwned + schemars::JsonSchema + Send;

    /// Whether the client can currently serve requests. The orchestrator
    /// skips the rerank stage when this reports false.
    fn is_available(&self) -> bool {
        true
    }
}
