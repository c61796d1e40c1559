//! Configuration management for sreagent
//!
//! Loads and saves the completion endpoint, agent tuning, Azure management
//! access and pattern memory settings from `~/.sreagent/config.json`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{config_path, data_dir};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CONFIG IO ERROR: {0}")]
    Io(#[from] std::io::Error),

    #[error("CONFIG PARSE ERROR: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CONFIG NOT FOUND: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Environment variables consulted when no completion key is configured
pub const API_KEY_ENV_VARS: &[&str] = &["SREAGENT_API_KEY", "AZURE_OPENAI_API_KEY"];

/// Which flavour of chat-completions endpoint to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    /// OpenAI-compatible `/chat/completions` with bearer auth
    #[default]
    OpenAi,
    /// Azure OpenAI deployment with `api-key` auth
    Azure,
}

/// Completion service endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default)]
    pub kind: CompletionKind,
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Azure deployment name; ignored for OpenAI-compatible endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            kind: CompletionKind::default(),
            api_key: String::new(),
            api_base: None,
            deployment: None,
            api_version: default_api_version(),
        }
    }
}

fn default_api_version() -> String {
    "2024-02-01".to_string()
}

/// Agent tuning shared by the coordinator and specialists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_coordinator_temperature")]
    pub coordinator_temperature: f32,
    #[serde(default = "default_completion_timeout")]
    pub completion_timeout_secs: u64,
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            coordinator_temperature: default_coordinator_temperature(),
            completion_timeout_secs: default_completion_timeout(),
            tool_timeout_secs: default_tool_timeout(),
        }
    }
}

fn default_model() -> String {
    "gpt-4-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_coordinator_temperature() -> f32 {
    0.0
}

fn default_completion_timeout() -> u64 {
    60
}

fn default_tool_timeout() -> u64 {
    30
}

/// Azure Resource Manager access used by the built-in tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default)]
    pub subscription_id: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            subscription_id: String::new(),
            access_token: String::new(),
            management_endpoint: default_management_endpoint(),
        }
    }
}

fn default_management_endpoint() -> String {
    "https://management.azure.com".to_string()
}

/// Troubleshooting pattern memory
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MemoryConfig {
    /// JSON file of `{category: [pattern, ...]}` merged over the built-ins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns_file: Option<String>,
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from a specific location, falling back to defaults if absent
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("◆ No config at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("◆ Reading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save to the default location
    pub async fn save(&self) -> Result<()> {
        let path = config_path();
        self.save_to(&path).await
    }

    /// Save to a specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("◆ Writing config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Completion API key, from config or the environment
    pub fn api_key(&self) -> Option<String> {
        if !self.completion.api_key.is_empty() {
            return Some(self.completion.api_key.clone());
        }

        API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.is_empty())
    }

    /// Whether a completion key is available
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Completion endpoint base URL, if overridden
    pub fn api_base(&self) -> Option<String> {
        self.completion
            .api_base
            .clone()
            .filter(|base| !base.is_empty())
    }

    /// Model id, or the Azure deployment name for Azure endpoints
    pub fn model(&self) -> String {
        match (self.completion.kind, &self.completion.deployment) {
            (CompletionKind::Azure, Some(deployment)) if !deployment.is_empty() => {
                deployment.clone()
            }
            _ => self.agent.model.clone(),
        }
    }

    /// ARM subscription id, from config or `AZURE_SUBSCRIPTION_ID`
    pub fn subscription_id(&self) -> Option<String> {
        non_empty_or_env(&self.azure.subscription_id, "AZURE_SUBSCRIPTION_ID")
    }

    /// ARM bearer token, from config or `AZURE_ACCESS_TOKEN`
    pub fn access_token(&self) -> Option<String> {
        non_empty_or_env(&self.azure.access_token, "AZURE_ACCESS_TOKEN")
    }

    /// Pattern file with `~` expanded
    pub fn patterns_file(&self) -> Option<PathBuf> {
        self.memory.patterns_file.as_deref().map(expand_home)
    }
}

fn non_empty_or_env(value: &str, var: &str) -> Option<String> {
    if !value.is_empty() {
        return Some(value.to_string());
    }
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Write a default config if none exists, then load it
pub async fn init() -> Result<Config> {
    let config_path = config_path();

    if config_path.exists() {
        warn!("◆ Config already present at {:?}", config_path);
    } else {
        let config = Config::default();
        config.save().await?;
        info!("◆ Config written to {:?}", config_path);
    }

    Config::load().await
}
