//! Shared fixtures for agent integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use sreagent_agent::prompts;
use sreagent_agent::tools::{ArmClient, ToolError};
use sreagent_agent::{
    AgentFactory, AgentKind, AgentMemory, CoordinatorAgent, PatternSource, Specialization,
    SpecializationRegistry, ToolInvoker, ToolSet, ToolTrait,
};
use sreagent_provider::{
    ChatParams, ChatResponse, CompletionOptions, Provider, ProviderError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

mock! {
    pub Provider {}

    #[async_trait]
    impl Provider for Provider {
        async fn chat(&self, params: ChatParams) -> Result<ChatResponse, ProviderError>;
        fn default_model(&self) -> String;
        fn is_configured(&self) -> bool;
    }
}

/// Text of the single prompt message
pub fn prompt_of(params: &ChatParams) -> &str {
    params
        .messages
        .first()
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

/// Tool returning a canned result and recording every argument string
#[derive(Clone)]
pub struct RecordingTool {
    name: String,
    output: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingTool {
    pub fn new(name: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            output: output.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolTrait for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        "Test tool"
    }
    fn usage(&self) -> &str {
        "<args>"
    }
    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(args.to_string());
        Ok(self.output.clone())
    }
}

/// Registry with the `general` default plus networking and database using `tools`
pub fn registry_with(tools: ToolSet) -> Arc<SpecializationRegistry> {
    let mut registry = SpecializationRegistry::new(Specialization::from_guidance(
        "general",
        &prompts::GENERAL,
        ToolSet::new(),
    ));
    registry.register(Specialization::from_guidance(
        "networking",
        &prompts::NETWORKING,
        tools.clone(),
    ));
    registry.register(Specialization::from_guidance(
        "database",
        &prompts::DATABASE,
        tools,
    ));
    Arc::new(registry)
}

pub fn offline_arm() -> ArmClient {
    ArmClient::new("http://127.0.0.1:1", None, None)
}

pub fn specialist_options() -> CompletionOptions {
    CompletionOptions {
        timeout: Duration::from_secs(5),
        ..CompletionOptions::default()
    }
}

pub fn coordinator_options() -> CompletionOptions {
    CompletionOptions {
        temperature: 0.0,
        ..specialist_options()
    }
}

pub fn factory(
    kind: AgentKind,
    registry: Arc<SpecializationRegistry>,
    provider: Arc<dyn Provider>,
) -> Arc<AgentFactory> {
    let memory: Arc<dyn PatternSource> = Arc::new(AgentMemory::builtin());
    Arc::new(AgentFactory::new(
        kind,
        registry,
        provider,
        memory,
        ToolInvoker::new(Duration::from_secs(5)),
        specialist_options(),
    ))
}

pub struct Harness {
    pub coordinator: CoordinatorAgent,
    pub diagnostic: Arc<AgentFactory>,
    pub mitigation: Arc<AgentFactory>,
}

pub fn harness(provider: MockProvider, tools: ToolSet) -> Harness {
    let provider: Arc<dyn Provider> = Arc::new(provider);
    let registry = registry_with(tools);
    let diagnostic = factory(AgentKind::Diagnostic, registry.clone(), provider.clone());
    let mitigation = factory(AgentKind::Mitigation, registry.clone(), provider.clone());
    let coordinator = CoordinatorAgent::new(
        provider,
        registry,
        diagnostic.clone(),
        mitigation.clone(),
        coordinator_options(),
    );
    Harness {
        coordinator,
        diagnostic,
        mitigation,
    }
}
