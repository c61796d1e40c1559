//! Agent-turn orchestration engine
//!
//! A coordinator classifies each user turn, then hands it to a cached
//! diagnostic or mitigation specialist. Specialists talk to the completion
//! service through a line-oriented sentinel protocol and may run at most
//! one tool per turn.

use thiserror::Error;

pub mod coordinator;
pub mod factory;
pub mod memory;
pub mod prompts;
pub mod protocol;
pub mod routing;
pub mod specialist;
pub mod specialization;
pub mod state;
pub mod tools;

pub use coordinator::CoordinatorAgent;
pub use factory::AgentFactory;
pub use memory::{AgentMemory, PatternSource};
pub use protocol::{SentinelCommand, SpecialistReply};
pub use routing::{CoordinatorReply, RouteAction, RoutingDecision};
pub use specialist::{AgentKind, SpecialistAgent};
pub use specialization::{Specialization, SpecializationRegistry};
pub use state::{ConversationState, Phase, Role};
pub use tools::{ToolContext, ToolInvoker, ToolSet, ToolTrait};

/// Agent errors
///
/// Tool variants render as the text the model sees after an `ERROR: `
/// prefix, so their wording is part of the prompt contract.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Tool '{name}' not found. Available tools: {available}")]
    ToolNotFound { name: String, available: String },

    #[error("Failed to execute tool '{name}': {message}")]
    ToolExecution { name: String, message: String },

    #[error("completion service error: {0}")]
    Provider(#[from] sreagent_provider::ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid pattern file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
