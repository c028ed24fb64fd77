//! Model clients
//!
//! The runner talks to models through [`ModelClient`]; [`OpenAiClient`] is
//! the implementation for OpenAI-compatible chat completion servers (vLLM,
//! SGLang, OpenRouter, ...).

mod openai;

pub use openai::{OpenAiClient, OpenAiClientConfig};

use async_trait::async_trait;
use rgym_core::error::GymResult;
use serde::{Deserialize, Serialize};

/// A chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// A single chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl CompletionRequest {
    /// The last user message, which carries the question
    pub fn question(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
    }
}

/// Model output for a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
}

impl Completion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Source of completions
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Request one completion
    async fn complete(&self, request: &CompletionRequest) -> GymResult<Completion>;
}
