//! Turn coordinator
//!
//! Classifies each user turn with one completion and either returns the
//! model's clarifying question or hands the turn to a cached specialist.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use sreagent_provider::{complete, CompletionOptions, PromptTemplate, Provider};

use crate::factory::AgentFactory;
use crate::prompts;
use crate::routing::{CoordinatorReply, RouteAction};
use crate::specialization::SpecializationRegistry;
use crate::state::{ConversationState, Phase};
use crate::Result;

pub const COORDINATOR_APOLOGY: &str = "I encountered an error processing your request. Could you please try rephrasing or provide more details?";

pub struct CoordinatorAgent {
    provider: Arc<dyn Provider>,
    registry: Arc<SpecializationRegistry>,
    diagnostic: Arc<AgentFactory>,
    mitigation: Arc<AgentFactory>,
    template: PromptTemplate,
    options: CompletionOptions,
}

impl CoordinatorAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: Arc<SpecializationRegistry>,
        diagnostic: Arc<AgentFactory>,
        mitigation: Arc<AgentFactory>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            provider,
            registry,
            diagnostic,
            mitigation,
            template: prompts::coordinator_template(),
            options,
        }
    }

    /// Handle one user turn and return the text to show
    pub async fn process(&self, input: &str, state: &mut ConversationState) -> String {
        state.add_user_message(input);

        let reply = match self.route(input, state).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("◆ [{}] Coordinator failed: {}", state.id(), e);
                COORDINATOR_APOLOGY.to_string()
            }
        };

        state.add_agent_message(reply.clone());
        reply
    }

    async fn route(&self, input: &str, state: &mut ConversationState) -> Result<String> {
        let mut params = HashMap::new();
        params.insert("conversationState".to_string(), state.format_for_prompt());
        params.insert("input".to_string(), input.to_string());
        params.insert("categories".to_string(), self.registry.names().join(", "));

        let raw = complete(self.provider.as_ref(), &self.template, &params, &self.options).await?;

        let decision = match CoordinatorReply::parse(&raw) {
            CoordinatorReply::Route(decision) => decision,
            CoordinatorReply::Question(text) => return Ok(text),
        };

        let specialization = self.registry.resolve(&decision.category);
        info!(
            "◆ [{}] Routing {:?} to {} (requested '{}')",
            state.id(),
            decision.action,
            specialization.name(),
            decision.category
        );

        let reply = match decision.action {
            RouteAction::Diagnose => {
                state.set_phase(Phase::Diagnosis);
                state.set_category(specialization.name());
                let agent = self.diagnostic.get_agent(specialization.name()).await;
                agent.run(input, state).await
            }
            RouteAction::Mitigate => {
                state.set_phase(Phase::Mitigation);
                state.set_category(specialization.name());
                let agent = self.mitigation.get_agent(specialization.name()).await;
                agent.run(input, state).await
            }
        };
        Ok(reply)
    }
}
