//! Coordinator routing decisions
//!
//! The coordinator model answers either with a clarifying question or with
//! a JSON object `{"action": ..., "category": ...}` embedded in free text.

use serde::Deserialize;
use tracing::{debug, warn};

/// Which workflow phase the coordinator routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteAction {
    Diagnose,
    Mitigate,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoutingDecision {
    pub action: RouteAction,
    pub category: String,
}

/// A coordinator completion translated into structured form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorReply {
    Route(RoutingDecision),
    /// Anything that is not a valid routing object, returned to the user verbatim
    Question(String),
}

impl CoordinatorReply {
    pub fn parse(raw: &str) -> Self {
        if !(raw.contains("\"action\"") && raw.contains("\"category\"")) {
            debug!("◆ Coordinator asked a question");
            return CoordinatorReply::Question(raw.to_string());
        }

        let json = match (raw.find('{'), raw.rfind('}')) {
            (Some(start), Some(end)) if start < end => &raw[start..=end],
            _ => {
                warn!("◆ Routing reply has no JSON object: {}", raw);
                return CoordinatorReply::Question(raw.to_string());
            }
        };

        match serde_json::from_str::<RoutingDecision>(json) {
            Ok(decision) => CoordinatorReply::Route(decision),
            Err(e) => {
                warn!("◆ Failed to parse routing decision: {}", e);
                CoordinatorReply::Question(raw.to_string())
            }
        }
    }
}
