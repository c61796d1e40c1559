//! Completion service boundary
//!
//! Chat-completions client types, the `Provider` trait and the prompt
//! template layer used by every agent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use thiserror::Error;

pub mod openai;
pub mod prompt;

pub use openai::OpenAiProvider;
pub use prompt::{complete, CompletionOptions, PromptTemplate};

/// Completion service errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("REQUEST FAILED: {0}")]
    Request(#[from] reqwest::Error),

    #[error("DECODE ERROR: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API REJECTED: {0}")]
    Api(String),

    #[error("NO API KEY CONFIGURED")]
    NoApiKey,

    #[error("INVALID RESPONSE")]
    InvalidResponse,

    #[error("RATE LIMITED")]
    RateLimited,

    #[error("TIMED OUT AFTER {0} SECONDS")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: Option<String>,
    #[serde(default)]
    pub finish_reason: String,
    #[serde(default)]
    pub usage: Usage,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            finish_reason: "stop".to_string(),
            usage: Usage::default(),
        }
    }

    /// Response text, empty when the model returned none
    pub fn into_text(self) -> String {
        self.content.unwrap_or_default()
    }
}

/// Token accounting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Chat message sent to the completion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Request parameters
///
/// No function tools are ever advertised, so the service never makes
/// automatic tool calls; tool use goes through the sentinel protocol.
#[derive(Debug, Clone)]
pub struct ChatParams {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            model: String::new(),
            messages: Vec::new(),
            max_tokens: 1500,
            temperature: 0.2,
        }
    }
}

/// Chat-completions service
#[async_trait]
pub trait Provider: Send + Sync {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse>;
    fn default_model(&self) -> String;
    fn is_configured(&self) -> bool;
}
