//! OpenAI-compatible and Azure OpenAI chat-completions client

use crate::*;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, trace};

/// How requests are addressed and authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    /// `{base}/chat/completions`, bearer token
    OpenAi,
    /// `{base}/openai/deployments/{model}/chat/completions`, `api-key` header
    Azure { api_version: String },
}

/// Chat-completions provider
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    default_model: String,
    endpoint: Endpoint,
}

impl OpenAiProvider {
    /// OpenAI-compatible endpoint; defaults to api.openai.com
    pub fn new(
        api_key: impl Into<String>,
        api_base: Option<String>,
        default_model: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: api_base
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
            default_model: default_model.unwrap_or_else(|| "gpt-4-turbo".to_string()),
            endpoint: Endpoint::OpenAi,
        }
    }

    /// Azure OpenAI resource; the model passed per request is the deployment name
    pub fn azure(
        api_key: impl Into<String>,
        resource_endpoint: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: resource_endpoint.into().trim_end_matches('/').to_string(),
            default_model: deployment.into(),
            endpoint: Endpoint::Azure {
                api_version: api_version.into(),
            },
        }
    }

    fn url(&self, model: &str) -> String {
        match &self.endpoint {
            Endpoint::OpenAi => format!("{}/chat/completions", self.api_base),
            Endpoint::Azure { api_version } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.api_base, model, api_version
            ),
        }
    }

    fn build_request(&self, params: &ChatParams) -> serde_json::Value {
        let model = if params.model.is_empty() {
            self.default_model.clone()
        } else {
            params.model.clone()
        };

        json!({
            "model": model,
            "messages": params.messages,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatResponse> {
        let choice = json["choices"]
            .get(0)
            .ok_or(ProviderError::InvalidResponse)?;
        let content = choice["message"]["content"].as_str().map(|s| s.to_string());
        let finish_reason = choice["finish_reason"]
            .as_str()
            .unwrap_or("stop")
            .to_string();

        let usage = if let Some(usage) = json["usage"].as_object() {
            let count = |key: &str| usage.get(key).and_then(|v| v.as_u64()).unwrap_or(0) as u32;
            Usage {
                prompt_tokens: count("prompt_tokens"),
                completion_tokens: count("completion_tokens"),
                total_tokens: count("total_tokens"),
            }
        } else {
            Usage::default()
        };

        Ok(ChatResponse {
            content,
            finish_reason,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NoApiKey);
        }

        let model = if params.model.is_empty() {
            self.default_model.clone()
        } else {
            params.model.clone()
        };
        let url = self.url(&model);
        trace!("◆ Completion request to {}", url);

        let request = self.client.post(&url).json(&self.build_request(&params));
        let request = match self.endpoint {
            Endpoint::OpenAi => request.header("Authorization", format!("Bearer {}", self.api_key)),
            Endpoint::Azure { .. } => request.header("api-key", &self.api_key),
        };

        let response = request.send().await?;
        let status = response.status();
        let json: serde_json::Value = response.json().await?;

        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }
            let error = json["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(ProviderError::Api(error));
        }

        let response = self.parse_response(json)?;
        debug!(
            "◆ Completion finished ({}, {} tokens)",
            response.finish_reason, response.usage.total_tokens
        );
        Ok(response)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
