//! Networking tools: NSG inspection and changes, TCP and DNS probes

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tracing::debug;

use super::{parse_args, ArmClient, ToolError, ToolTrait};

const NETWORK_API_VERSION: &str = "2023-09-01";

fn nsg_path(rg: &str, nsg: &str) -> String {
    format!(
        "resourceGroups/{}/providers/Microsoft.Network/networkSecurityGroups/{}",
        rg, nsg
    )
}

fn rule_path(rg: &str, nsg: &str, rule: &str) -> String {
    format!("{}/securityRules/{}", nsg_path(rg, nsg), rule)
}

fn describe_rule(rule: &Value) -> String {
    let props = &rule["properties"];
    let field = |key: &str| props[key].as_str().unwrap_or("-").to_string();
    let port = props["destinationPortRange"]
        .as_str()
        .map(|s| s.to_string())
        .or_else(|| {
            props["destinationPortRanges"].as_array().map(|ports| {
                ports
                    .iter()
                    .filter_map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            })
        })
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{} [priority {}] {} {} {} port {} from {} to {}",
        rule["name"].as_str().unwrap_or("?"),
        props["priority"].as_u64().unwrap_or(0),
        field("direction"),
        field("access"),
        field("protocol"),
        port,
        field("sourceAddressPrefix"),
        field("destinationAddressPrefix"),
    )
}

/// List the security rules of a network security group
pub struct CheckNsgRulesTool {
    arm: Arc<ArmClient>,
}

impl CheckNsgRulesTool {
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

#[async_trait]
impl ToolTrait for CheckNsgRulesTool {
    fn name(&self) -> &str {
        "CheckNsgRules"
    }
    fn description(&self) -> &str {
        "List the security rules of a network security group, custom rules first."
    }
    fn usage(&self) -> &str {
        "<resource-group> <nsg-name>"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 2, self.usage())?;
        let (rg, nsg) = (parts[0], parts[1]);

        let Some(json) = self.arm.get(&nsg_path(rg, nsg), NETWORK_API_VERSION).await? else {
            return Ok(format!("NSG '{}' not found in resource group '{}'", nsg, rg));
        };

        let mut lines = vec![format!("NSG {} ({}):", nsg, rg)];
        for (label, key) in [
            ("Custom rules", "securityRules"),
            ("Default rules", "defaultSecurityRules"),
        ] {
            let mut rules = json["properties"][key].as_array().cloned().unwrap_or_default();
            lines.push(format!("{} ({}):", label, rules.len()));
            rules.sort_by_key(|r| r["properties"]["priority"].as_u64().unwrap_or(u64::MAX));
            for rule in &rules {
                lines.push(format!("  {}", describe_rule(rule)));
            }
        }
        Ok(lines.join("\n"))
    }
}

/// Open a TCP connection to check reachability
pub struct TestConnectivityTool {
    timeout: Duration,
}

impl TestConnectivityTool {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ToolTrait for TestConnectivityTool {
    fn name(&self) -> &str {
        "TestConnectivity"
    }
    fn description(&self) -> &str {
        "Try a TCP connection from this machine to a host and port."
    }
    fn usage(&self) -> &str {
        "<host> <port>"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 2, self.usage())?;
        let host = parts[0];
        let port: u16 = parts[1]
            .parse()
            .map_err(|_| format!("invalid port '{}'", parts[1]))?;

        debug!("◆ Probing {}:{}", host, port);
        let started = std::time::Instant::now();
        let outcome = tokio::time::timeout(self.timeout, TcpStream::connect((host, port))).await;
        let elapsed = started.elapsed().as_millis();

        Ok(match outcome {
            Ok(Ok(_)) => format!("Connection to {}:{} succeeded in {} ms", host, port, elapsed),
            Ok(Err(e)) => format!("Connection to {}:{} failed: {}", host, port, e),
            Err(_) => format!(
                "Connection to {}:{} timed out after {} s",
                host,
                port,
                self.timeout.as_secs()
            ),
        })
    }
}

/// Resolve a hostname with the system resolver
pub struct CheckDnsResolutionTool;

#[async_trait]
impl ToolTrait for CheckDnsResolutionTool {
    fn name(&self) -> &str {
        "CheckDnsResolution"
    }
    fn description(&self) -> &str {
        "Resolve a hostname and list the returned addresses."
    }
    fn usage(&self) -> &str {
        "<hostname>"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 1, self.usage())?;
        let host = parts[0];

        match lookup_host((host, 0)).await {
            Ok(addrs) => {
                let mut ips: Vec<String> = addrs.map(|a| a.ip().to_string()).collect();
                ips.sort();
                ips.dedup();
                if ips.is_empty() {
                    Ok(format!("{} resolved to no addresses", host))
                } else {
                    Ok(format!("{} resolves to {}", host, ips.join(", ")))
                }
            }
            Err(e) => Ok(format!("DNS resolution for {} failed: {}", host, e)),
        }
    }
}

/// Whether the rule tool creates a new rule or changes an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMode {
    Create,
    Update,
}

/// Create or update one NSG security rule
pub struct NsgRuleTool {
    arm: Arc<ArmClient>,
    mode: RuleMode,
}

impl NsgRuleTool {
    pub fn create(arm: Arc<ArmClient>) -> Self {
        Self {
            arm,
            mode: RuleMode::Create,
        }
    }

    pub fn update(arm: Arc<ArmClient>) -> Self {
        Self {
            arm,
            mode: RuleMode::Update,
        }
    }
}

fn normalize_access(value: &str) -> Result<&'static str, ToolError> {
    match value.to_lowercase().as_str() {
        "allow" => Ok("Allow"),
        "deny" => Ok("Deny"),
        other => Err(format!("access must be allow or deny, got '{}'", other).into()),
    }
}

fn normalize_protocol(value: &str) -> Result<&'static str, ToolError> {
    match value.to_lowercase().as_str() {
        "tcp" => Ok("Tcp"),
        "udp" => Ok("Udp"),
        "icmp" => Ok("Icmp"),
        "*" | "any" => Ok("*"),
        other => Err(format!("unsupported protocol '{}'", other).into()),
    }
}

fn normalize_direction(value: &str) -> Result<&'static str, ToolError> {
    match value.to_lowercase().as_str() {
        "inbound" => Ok("Inbound"),
        "outbound" => Ok("Outbound"),
        other => Err(format!("direction must be inbound or outbound, got '{}'", other).into()),
    }
}

#[async_trait]
impl ToolTrait for NsgRuleTool {
    fn name(&self) -> &str {
        match self.mode {
            RuleMode::Create => "CreateNsgRule",
            RuleMode::Update => "UpdateNsgRule",
        }
    }
    fn description(&self) -> &str {
        match self.mode {
            RuleMode::Create => "Create a new security rule on a network security group.",
            RuleMode::Update => "Change an existing security rule on a network security group.",
        }
    }
    fn usage(&self) -> &str {
        "<resource-group> <nsg-name> <rule-name> <allow|deny> <protocol> <port> [priority] [inbound|outbound]"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 6, self.usage())?;
        let (rg, nsg, rule) = (parts[0], parts[1], parts[2]);
        let access = normalize_access(parts[3])?;
        let protocol = normalize_protocol(parts[4])?;
        let port = parts[5];
        let priority: Option<u64> = match parts.get(6) {
            Some(p) => Some(p.parse().map_err(|_| format!("invalid priority '{}'", p))?),
            None => None,
        };
        let direction = normalize_direction(parts.get(7).copied().unwrap_or("inbound"))?;

        let path = rule_path(rg, nsg, rule);
        let existing = self.arm.get(&path, NETWORK_API_VERSION).await?;

        let priority = match (self.mode, &existing) {
            (RuleMode::Create, Some(_)) => {
                return Err(format!(
                    "rule '{}' already exists on {}, use UpdateNsgRule",
                    rule, nsg
                )
                .into())
            }
            (RuleMode::Update, None) => {
                return Err(format!("rule '{}' not found on {}", rule, nsg).into())
            }
            (RuleMode::Create, None) => priority.unwrap_or(1000),
            (RuleMode::Update, Some(current)) => priority
                .or_else(|| current["properties"]["priority"].as_u64())
                .unwrap_or(1000),
        };

        let body = json!({
            "properties": {
                "access": access,
                "protocol": protocol,
                "direction": direction,
                "priority": priority,
                "sourceAddressPrefix": "*",
                "sourcePortRange": "*",
                "destinationAddressPrefix": "*",
                "destinationPortRange": port,
            }
        });
        let saved = self.arm.put(&path, NETWORK_API_VERSION, &body).await?;

        let verb = match self.mode {
            RuleMode::Create => "Created",
            RuleMode::Update => "Updated",
        };
        Ok(format!("{} rule {}", verb, describe_rule(&saved)))
    }
}

/// Delete one NSG security rule
pub struct RemoveNsgRuleTool {
    arm: Arc<ArmClient>,
}

impl RemoveNsgRuleTool {
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

#[async_trait]
impl ToolTrait for RemoveNsgRuleTool {
    fn name(&self) -> &str {
        "RemoveNsgRule"
    }
    fn description(&self) -> &str {
        "Delete a security rule from a network security group."
    }
    fn usage(&self) -> &str {
        "<resource-group> <nsg-name> <rule-name>"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 3, self.usage())?;
        let (rg, nsg, rule) = (parts[0], parts[1], parts[2]);

        if self
            .arm
            .delete(&rule_path(rg, nsg, rule), NETWORK_API_VERSION)
            .await?
        {
            Ok(format!("Removed rule {} from {}", rule, nsg))
        } else {
            Ok(format!("Rule {} does not exist on {}", rule, nsg))
        }
    }
}
