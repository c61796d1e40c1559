//! Diagnostic and mitigation specialists
//!
//! One turn: render the specialization prompt, complete once, optionally
//! run a single requested tool and complete a second and final time, then
//! record the outcome and return the cleaned reply.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

use sreagent_provider::{complete, CompletionOptions, PromptTemplate, Provider};

use crate::memory::PatternSource;
use crate::protocol::SpecialistReply;
use crate::specialization::Specialization;
use crate::state::ConversationState;
use crate::tools::ToolInvoker;
use crate::Result;

pub const DIAGNOSTIC_APOLOGY: &str = "I encountered a problem while trying to diagnose your issue. Could you please provide more details about what you're seeing?";
pub const MITIGATION_APOLOGY: &str = "I encountered a problem while trying to fix your issue. Could you please provide more details about what you'd like me to do?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Diagnostic,
    Mitigation,
}

impl AgentKind {
    pub fn apology(self) -> &'static str {
        match self {
            AgentKind::Diagnostic => DIAGNOSTIC_APOLOGY,
            AgentKind::Mitigation => MITIGATION_APOLOGY,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Diagnostic => write!(f, "diagnostic"),
            AgentKind::Mitigation => write!(f, "mitigation"),
        }
    }
}

pub struct SpecialistAgent {
    kind: AgentKind,
    specialization: Arc<Specialization>,
    provider: Arc<dyn Provider>,
    memory: Arc<dyn PatternSource>,
    invoker: ToolInvoker,
    options: CompletionOptions,
}

impl SpecialistAgent {
    pub fn new(
        kind: AgentKind,
        specialization: Arc<Specialization>,
        provider: Arc<dyn Provider>,
        memory: Arc<dyn PatternSource>,
        invoker: ToolInvoker,
        options: CompletionOptions,
    ) -> Self {
        Self {
            kind,
            specialization,
            provider,
            memory,
            invoker,
            options,
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn specialization(&self) -> &str {
        self.specialization.name()
    }

    fn template(&self) -> &PromptTemplate {
        match self.kind {
            AgentKind::Diagnostic => self.specialization.diagnostic_prompt(),
            AgentKind::Mitigation => self.specialization.mitigation_prompt(),
        }
    }

    /// Run one turn. Failures are logged and answered with a fixed apology.
    pub async fn run(&self, input: &str, state: &mut ConversationState) -> String {
        info!(
            "◆ [{}] {} agent handling {} turn",
            state.id(),
            self.kind,
            self.specialization.name()
        );

        match self.try_run(input, state).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(
                    "◆ [{}] {} agent ({}) failed: {}",
                    state.id(),
                    self.kind,
                    self.specialization.name(),
                    e
                );
                self.kind.apology().to_string()
            }
        }
    }

    async fn build_params(&self, input: &str, state: &ConversationState) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("conversationState".to_string(), state.format_for_prompt());
        params.insert("userInput".to_string(), input.to_string());
        params.insert("toolResults".to_string(), String::new());
        params.insert(
            "tools".to_string(),
            self.specialization.tools().describe(),
        );

        match self.kind {
            AgentKind::Diagnostic => {
                let patterns = self
                    .memory
                    .search_patterns(self.specialization.name())
                    .await
                    .iter()
                    .map(|p| format!("- {}", p))
                    .collect::<Vec<_>>()
                    .join("\n");
                params.insert("patterns".to_string(), patterns);
            }
            AgentKind::Mitigation => {
                params.insert(
                    "diagnosisResult".to_string(),
                    state.diagnosis_result().to_string(),
                );
            }
        }
        params
    }

    async fn try_run(&self, input: &str, state: &mut ConversationState) -> Result<String> {
        let mut params = self.build_params(input, state).await;
        let template = self.template();

        let raw = complete(self.provider.as_ref(), template, &params, &self.options).await?;
        let mut reply = SpecialistReply::parse(&raw);

        if let Some(request) = reply.tool_request.take() {
            let output = self
                .invoker
                .execute(&request.name, &request.args, self.specialization.tools())
                .await;
            debug!("◆ Tool {} returned {} chars", request.name, output.len());
            params.insert("toolResults".to_string(), output);

            let raw = complete(self.provider.as_ref(), template, &params, &self.options).await?;
            reply = SpecialistReply::parse(&raw);
            if let Some(ignored) = &reply.tool_request {
                debug!(
                    "◆ Ignoring second tool request {} in the same turn",
                    ignored.name
                );
            }
        }

        match self.kind {
            AgentKind::Diagnostic => {
                if let Some(diagnosis) = reply.diagnosis {
                    info!("◆ [{}] Diagnosis recorded: {}", state.id(), diagnosis);
                    state.set_diagnosis_result(diagnosis);
                }
            }
            AgentKind::Mitigation => {
                if let Some(summary) = reply.mitigation {
                    info!("◆ [{}] Mitigation recorded: {}", state.id(), summary);
                    state.set_mitigation_result(summary);
                }
            }
        }

        Ok(reply.visible)
    }
}

impl fmt::Debug for SpecialistAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialistAgent")
            .field("kind", &self.kind)
            .field("specialization", &self.specialization.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apologies() {
        assert_eq!(AgentKind::Mitigation.apology(), MITIGATION_APOLOGY);
        assert!(AgentKind::Diagnostic.apology().starts_with("I encountered a problem"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(AgentKind::Diagnostic.to_string(), "diagnostic");
        assert_eq!(AgentKind::Mitigation.to_string(), "mitigation");
    }
}
