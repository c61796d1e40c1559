//! Specialization registry
//!
//! A specialization is an open, string-keyed problem domain. Each entry
//! carries its diagnostic and mitigation prompts and its tool set. One entry
//! is the default that unknown names resolve to.

use std::collections::HashMap;
use std::sync::Arc;

use sreagent_provider::PromptTemplate;

use crate::prompts::{self, Guidance};
use crate::tools::auth::{CheckEndpointAuthTool, VerifyRbacPermissionsTool};
use crate::tools::availability::{GetContainerAppMetricsTool, GetContainerAppStatusTool};
use crate::tools::database::{
    CheckDatabaseConnectivityTool, UpdateDatabaseTierTool, UpdateFirewallRuleTool,
};
use crate::tools::network::{
    CheckDnsResolutionTool, CheckNsgRulesTool, NsgRuleTool, RemoveNsgRuleTool,
    TestConnectivityTool,
};
use crate::tools::performance::{CheckAppServiceMetricsTool, MeasureEndpointLatencyTool};
use crate::tools::{ToolContext, ToolSet};

pub const DEFAULT_SPECIALIZATION: &str = "general";

/// Lowercase, trimmed registry key
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug)]
pub struct Specialization {
    name: String,
    diagnostic: PromptTemplate,
    mitigation: PromptTemplate,
    tools: ToolSet,
}

impl Specialization {
    pub fn new(
        name: &str,
        diagnostic: PromptTemplate,
        mitigation: PromptTemplate,
        tools: ToolSet,
    ) -> Self {
        Self {
            name: normalize(name),
            diagnostic,
            mitigation,
            tools,
        }
    }

    pub fn from_guidance(name: &str, guidance: &Guidance, tools: ToolSet) -> Self {
        Self::new(
            name,
            prompts::diagnostic_template(guidance),
            prompts::mitigation_template(guidance),
            tools,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn diagnostic_prompt(&self) -> &PromptTemplate {
        &self.diagnostic
    }

    pub fn mitigation_prompt(&self) -> &PromptTemplate {
        &self.mitigation
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }
}

/// Name to specialization mapping with a designated default
#[derive(Debug)]
pub struct SpecializationRegistry {
    entries: HashMap<String, Arc<Specialization>>,
    order: Vec<String>,
    default: Arc<Specialization>,
}

impl SpecializationRegistry {
    /// Registry holding only `default`, which is also listed under its own name
    pub fn new(default: Specialization) -> Self {
        let default = Arc::new(default);
        let mut entries = HashMap::new();
        entries.insert(default.name().to_string(), default.clone());
        Self {
            entries,
            order: Vec::new(),
            default,
        }
    }

    /// Add or replace a specialization
    pub fn register(&mut self, specialization: Specialization) {
        let name = specialization.name().to_string();
        if !self.order.contains(&name) && name != self.default.name() {
            self.order.push(name.clone());
        }
        self.entries.insert(name, Arc::new(specialization));
    }

    /// Exact lookup after normalization
    pub fn get(&self, name: &str) -> Option<Arc<Specialization>> {
        self.entries.get(&normalize(name)).cloned()
    }

    /// Lookup falling back to the default entry
    pub fn resolve(&self, name: &str) -> Arc<Specialization> {
        self.get(name).unwrap_or_else(|| self.default.clone())
    }

    /// Registered names in registration order, default excluded
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn default_specialization(&self) -> Arc<Specialization> {
        self.default.clone()
    }

    /// Built-in Azure specializations wired to live tools
    pub fn builtin(ctx: &ToolContext) -> Self {
        let arm = &ctx.arm;
        let mut registry = Self::new(Specialization::from_guidance(
            DEFAULT_SPECIALIZATION,
            &prompts::GENERAL,
            ToolSet::new(),
        ));

        registry.register(Specialization::from_guidance(
            "networking",
            &prompts::NETWORKING,
            ToolSet::new()
                .with(CheckNsgRulesTool::new(arm.clone()))
                .with(TestConnectivityTool::new(ctx.probe_timeout))
                .with(CheckDnsResolutionTool)
                .with(NsgRuleTool::create(arm.clone()))
                .with(NsgRuleTool::update(arm.clone()))
                .with(RemoveNsgRuleTool::new(arm.clone())),
        ));
        registry.register(Specialization::from_guidance(
            "database",
            &prompts::DATABASE,
            ToolSet::new()
                .with(CheckDatabaseConnectivityTool::new(ctx.probe_timeout))
                .with(UpdateFirewallRuleTool::new(arm.clone()))
                .with(UpdateDatabaseTierTool::new(arm.clone())),
        ));
        registry.register(Specialization::from_guidance(
            "authentication",
            &prompts::AUTHENTICATION,
            ToolSet::new()
                .with(CheckEndpointAuthTool::new(ctx.http.clone()))
                .with(VerifyRbacPermissionsTool::new(arm.clone())),
        ));
        registry.register(Specialization::from_guidance(
            "performance",
            &prompts::PERFORMANCE,
            ToolSet::new()
                .with(MeasureEndpointLatencyTool::new(ctx.http.clone()))
                .with(CheckAppServiceMetricsTool::new(arm.clone())),
        ));
        registry.register(Specialization::from_guidance(
            "availability",
            &prompts::AVAILABILITY,
            ToolSet::new()
                .with(GetContainerAppStatusTool::new(arm.clone()))
                .with(GetContainerAppMetricsTool::new(arm.clone())),
        ));

        registry
    }
}
