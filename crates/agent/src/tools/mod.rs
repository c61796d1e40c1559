//! Tools and the tool invoker
//!
//! A tool receives one opaque argument string, exactly the text following
//! its name on a `USE_TOOL:` line, and returns text for the model.

pub mod arm;
pub mod auth;
pub mod availability;
pub mod database;
pub mod network;
pub mod performance;

pub use arm::{ArmClient, ArmError};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::AgentError;

pub type ToolError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait ToolTrait: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// Argument synopsis shown to the model, e.g. `<rg> <nsg>`
    fn usage(&self) -> &str;
    async fn execute(&self, args: &str) -> Result<String, ToolError>;
}

/// Split whitespace-separated arguments, requiring at least `min` of them
pub fn parse_args<'a>(args: &'a str, min: usize, usage: &str) -> Result<Vec<&'a str>, ToolError> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < min {
        return Err(format!("expected arguments: {}", usage).into());
    }
    Ok(parts)
}

/// The tools available to one specialization
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn ToolTrait>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: ToolTrait + 'static>(&mut self, tool: T) {
        self.tools.push(Arc::new(tool));
    }

    pub fn with<T: ToolTrait + 'static>(mut self, tool: T) -> Self {
        self.register(tool);
        self
    }

    /// Case-insensitive lookup by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolTrait>> {
        self.tools
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// One line per tool, for prompt rendering
    pub fn describe(&self) -> String {
        if self.tools.is_empty() {
            return "(no tools available)".to_string();
        }
        self.tools
            .iter()
            .map(|t| {
                if t.usage().is_empty() {
                    format!("- {}: {}", t.name(), t.description())
                } else {
                    format!("- {} {}: {}", t.name(), t.usage(), t.description())
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Runs a named tool and turns every outcome into model-readable text
#[derive(Debug, Clone)]
pub struct ToolInvoker {
    timeout: Duration,
}

impl ToolInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Never fails; errors come back as `ERROR: ...` text
    pub async fn execute(&self, name: &str, args: &str, tools: &ToolSet) -> String {
        match self.try_execute(name, args, tools).await {
            Ok(output) => output,
            Err(e) => format!("ERROR: {}", e),
        }
    }

    async fn try_execute(&self, name: &str, args: &str, tools: &ToolSet) -> crate::Result<String> {
        let tool = tools.get(name).ok_or_else(|| AgentError::ToolNotFound {
            name: name.to_string(),
            available: tools.names().join(", "),
        })?;

        info!("◆ Executing tool {} ({})", tool.name(), args);
        match tokio::time::timeout(self.timeout, tool.execute(args)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => {
                warn!("◆ Tool {} failed with args '{}': {}", name, args, e);
                Err(AgentError::ToolExecution {
                    name: name.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                warn!(
                    "◆ Tool {} timed out after {}s with args '{}'",
                    name,
                    self.timeout.as_secs(),
                    args
                );
                Err(AgentError::ToolExecution {
                    name: name.to_string(),
                    message: format!("timed out after {}s", self.timeout.as_secs()),
                })
            }
        }
    }
}

impl Default for ToolInvoker {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// Shared clients handed to the built-in tools
#[derive(Clone)]
pub struct ToolContext {
    pub arm: Arc<ArmClient>,
    pub http: reqwest::Client,
    /// Bound on a single network probe
    pub probe_timeout: Duration,
}

impl ToolContext {
    pub fn new(arm: ArmClient) -> Self {
        Self {
            arm: Arc::new(arm),
            http: reqwest::Client::new(),
            probe_timeout: Duration::from_secs(5),
        }
    }

    pub fn from_config(config: &sreagent_config::Config) -> Self {
        Self::new(ArmClient::from_config(config))
    }
}
