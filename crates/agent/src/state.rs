//! Per-session conversation state

use std::fmt;
use uuid::Uuid;

/// Number of most recent messages rendered into prompts
pub const PROMPT_WINDOW: usize = 5;

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

/// One entry of the conversation log; read-only once appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Workflow phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Initial,
    Diagnosis,
    Mitigation,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Initial => write!(f, "initial"),
            Phase::Diagnosis => write!(f, "diagnosis"),
            Phase::Mitigation => write!(f, "mitigation"),
        }
    }
}

/// State of a single conversation session
///
/// The message log is append-only. Nothing here is persisted.
#[derive(Debug, Clone)]
pub struct ConversationState {
    id: Uuid,
    messages: Vec<Message>,
    phase: Phase,
    category: Option<String>,
    diagnosis_result: Option<String>,
    mitigation_result: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            phase: Phase::Initial,
            category: None,
            diagnosis_result: None,
            mitigation_result: None,
        }
    }

    /// Session id, used to correlate log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn add_agent_message(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::Agent,
            content: content.into(),
        });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = Some(category.into());
    }

    pub fn set_diagnosis_result(&mut self, result: impl Into<String>) {
        self.diagnosis_result = Some(result.into());
    }

    /// Latest diagnosis, or an empty string before any was recorded
    pub fn diagnosis_result(&self) -> &str {
        self.diagnosis_result.as_deref().unwrap_or("")
    }

    pub fn set_mitigation_result(&mut self, result: impl Into<String>) {
        self.mitigation_result = Some(result.into());
    }

    /// Latest mitigation summary, or an empty string
    pub fn mitigation_result(&self) -> &str {
        self.mitigation_result.as_deref().unwrap_or("")
    }

    /// Render phase, category and the last [`PROMPT_WINDOW`] messages
    pub fn format_for_prompt(&self) -> String {
        let mut out = format!("Current phase: {}\n", self.phase);
        if let Some(category) = &self.category {
            out.push_str(&format!("Current category: {}\n", category));
        }

        out.push_str("Recent messages:\n");
        let start = self.messages.len().saturating_sub(PROMPT_WINDOW);
        for message in &self.messages[start..] {
            out.push_str(&format!("{}: {}\n", message.role, message.content));
        }

        out
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}
