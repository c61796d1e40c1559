//! Lazily built, cached specialists
//!
//! One factory per [`AgentKind`]. Each keeps at most one live agent per
//! specialization for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use sreagent_provider::{CompletionOptions, Provider};

use crate::memory::PatternSource;
use crate::specialist::{AgentKind, SpecialistAgent};
use crate::specialization::SpecializationRegistry;
use crate::tools::ToolInvoker;

pub struct AgentFactory {
    kind: AgentKind,
    registry: Arc<SpecializationRegistry>,
    provider: Arc<dyn Provider>,
    memory: Arc<dyn PatternSource>,
    invoker: ToolInvoker,
    options: CompletionOptions,
    agents: Mutex<HashMap<String, Arc<SpecialistAgent>>>,
}

impl AgentFactory {
    pub fn new(
        kind: AgentKind,
        registry: Arc<SpecializationRegistry>,
        provider: Arc<dyn Provider>,
        memory: Arc<dyn PatternSource>,
        invoker: ToolInvoker,
        options: CompletionOptions,
    ) -> Self {
        Self {
            kind,
            registry,
            provider,
            memory,
            invoker,
            options,
            agents: Mutex::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Cached agent for `specialization`; unknown names share the default agent
    pub async fn get_agent(&self, specialization: &str) -> Arc<SpecialistAgent> {
        let resolved = self.registry.resolve(specialization);
        let mut agents = self.agents.lock().await;

        agents
            .entry(resolved.name().to_string())
            .or_insert_with(|| {
                info!(
                    "◆ Creating {} agent for {}",
                    self.kind,
                    resolved.name()
                );
                Arc::new(SpecialistAgent::new(
                    self.kind,
                    resolved.clone(),
                    self.provider.clone(),
                    self.memory.clone(),
                    self.invoker.clone(),
                    self.options.clone(),
                ))
            })
            .clone()
    }

    /// Number of agents created so far
    pub async fn cached_count(&self) -> usize {
        self.agents.lock().await.len()
    }
}
