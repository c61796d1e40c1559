//! Troubleshooting pattern memory
//!
//! Maps a specialization name to a list of hints that diagnostic prompts
//! receive as background knowledge.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::Result;

/// Category-keyed pattern lookup used by diagnostic specialists
#[async_trait]
pub trait PatternSource: Send + Sync {
    /// Patterns for `category`; unknown categories yield an empty list
    async fn search_patterns(&self, category: &str) -> Vec<String>;
}

/// In-process pattern store
#[derive(Debug, Clone, Default)]
pub struct AgentMemory {
    patterns: HashMap<String, Vec<String>>,
}

fn normalize(category: &str) -> String {
    category.trim().to_lowercase()
}

impl AgentMemory {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the built-in troubleshooting patterns
    pub fn builtin() -> Self {
        let mut memory = Self::new();
        memory.insert(
            "networking",
            [
                "If application can't connect to database, check NSG rules between app subnet and database subnet",
                "If web application is unreachable, verify NSG allows port 80/443 inbound",
                "If services in different VNets can't communicate, check VNet peering or service endpoints",
                "If experiencing intermittent connectivity issues, check DNS resolution and network latency",
                "If load balancer endpoints are not responding, verify health probe configuration",
                "If application gateway returns 502 errors, check backend pool health and settings",
            ],
        );
        memory.insert(
            "database",
            [
                "If SQL queries are timing out, check DTU usage and consider scaling up",
                "If connection pooling errors occur, verify max pool settings in connection string",
                "If database is unreachable, check firewall rules to ensure client IP is allowed",
                "If experiencing deadlocks, review transaction isolation levels and query patterns",
                "If seeing high wait times, check for blocking queries or resource contention",
                "If database size is approaching limit, consider implementing data archiving strategy",
            ],
        );
        memory.insert(
            "authentication",
            [
                "If seeing 401 Unauthorized errors, verify token acquisition and validity",
                "If CORS errors appear in browser console, check CORS configuration in Azure",
                "If managed identity isn't working, verify service principal assignments",
                "If users can't access resources, check RBAC permissions at subscription and resource levels",
                "If token acquisition fails, verify app registration and API permissions",
                "If certificate authentication fails, check certificate validity and trust chain",
            ],
        );
        memory.insert(
            "performance",
            [
                "If web app is slow, check App Service plan tier and scaling settings",
                "If seeing high memory usage, look for memory leaks or inefficient caching",
                "If CPU spikes occur, identify resource-intensive operations and optimize",
                "If storage operations are slow, check throttling metrics and partition strategy",
                "If application startup is slow, review initialization logic and dependencies",
                "If experiencing timeouts, check connection limits and timeout configurations",
            ],
        );
        memory.insert(
            "availability",
            [
                "If the container app is unresponsive, check CPU and memory usage against the configured limits",
                "If the app stops responding under load, check request count and the scale rule settings",
                "If the latest revision fails to activate, look for image pull failures in the system logs",
            ],
        );
        memory
    }

    /// Replace the patterns of one category
    pub fn insert<I, S>(&mut self, category: &str, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.insert(
            normalize(category),
            patterns.into_iter().map(Into::into).collect(),
        );
    }

    /// Merge a JSON file of `{category: [pattern, ...]}` over the current
    /// store; categories present in the file replace existing ones
    pub async fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(path).await?;
        let loaded: HashMap<String, Vec<String>> = serde_json::from_str(&content)?;

        info!(
            "◆ Loaded {} pattern categories from {}",
            loaded.len(),
            path.display()
        );
        for (category, patterns) in loaded {
            self.insert(&category, patterns);
        }
        Ok(())
    }

    /// Known categories, sorted
    pub fn categories(&self) -> Vec<String> {
        let mut names: Vec<String> = self.patterns.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get(&self, category: &str) -> &[String] {
        self.patterns
            .get(&normalize(category))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

#[async_trait]
impl PatternSource for AgentMemory {
    async fn search_patterns(&self, category: &str) -> Vec<String> {
        let patterns = self.get(category).to_vec();
        debug!("◆ {} patterns for category '{}'", patterns.len(), category);
        patterns
    }
}
