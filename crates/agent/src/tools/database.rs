//! Azure SQL tools

use async_trait::async_trait;
use serde_json::json;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use super::{parse_args, ArmClient, ToolError, ToolTrait};

const SQL_API_VERSION: &str = "2021-11-01";
const SQL_HOST_SUFFIX: &str = ".database.windows.net";

fn server_path(rg: &str, server: &str) -> String {
    format!(
        "resourceGroups/{}/providers/Microsoft.Sql/servers/{}",
        rg, server
    )
}

/// Bare server names expand to the public Azure SQL hostname
fn server_host(server: &str) -> String {
    if server.contains('.') {
        server.to_string()
    } else {
        format!("{}{}", server, SQL_HOST_SUFFIX)
    }
}

pub struct CheckDatabaseConnectivityTool {
    timeout: Duration,
}

impl CheckDatabaseConnectivityTool {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ToolTrait for CheckDatabaseConnectivityTool {
    fn name(&self) -> &str {
        "CheckDatabaseConnectivity"
    }
    fn description(&self) -> &str {
        "Check whether a SQL server accepts TCP connections (default port 1433)."
    }
    fn usage(&self) -> &str {
        "<server> [port]"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 1, self.usage())?;
        let host = server_host(parts[0]);
        let port: u16 = match parts.get(1) {
            Some(p) => p.parse().map_err(|_| format!("invalid port '{}'", p))?,
            None => 1433,
        };

        match tokio::time::timeout(self.timeout, TcpStream::connect((host.as_str(), port))).await {
            Ok(Ok(_)) => Ok(format!("{}:{} is reachable", host, port)),
            Ok(Err(e)) => Ok(format!(
                "{}:{} is not reachable: {}. Check the server firewall rules and network path.",
                host, port, e
            )),
            Err(_) => Ok(format!(
                "{}:{} did not answer within {} s. A firewall or NSG is likely dropping traffic.",
                host,
                port,
                self.timeout.as_secs()
            )),
        }
    }
}

/// Create or replace a server-level firewall rule
pub struct UpdateFirewallRuleTool {
    arm: Arc<ArmClient>,
}

impl UpdateFirewallRuleTool {
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

#[async_trait]
impl ToolTrait for UpdateFirewallRuleTool {
    fn name(&self) -> &str {
        "UpdateFirewallRule"
    }
    fn description(&self) -> &str {
        "Create or replace a SQL server firewall rule allowing an IP range."
    }
    fn usage(&self) -> &str {
        "<resource-group> <server> <rule-name> <start-ip> <end-ip>"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 5, self.usage())?;
        let (rg, server, rule, start, end) = (parts[0], parts[1], parts[2], parts[3], parts[4]);
        for ip in [start, end] {
            ip.parse::<IpAddr>()
                .map_err(|_| format!("invalid IP address '{}'", ip))?;
        }

        let path = format!("{}/firewallRules/{}", server_path(rg, server), rule);
        let body = json!({
            "properties": { "startIpAddress": start, "endIpAddress": end }
        });
        self.arm.put(&path, SQL_API_VERSION, &body).await?;

        Ok(format!(
            "Firewall rule {} on {} now allows {} - {}",
            rule, server, start, end
        ))
    }
}

/// Change the service objective of a database
pub struct UpdateDatabaseTierTool {
    arm: Arc<ArmClient>,
}

impl UpdateDatabaseTierTool {
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

#[async_trait]
impl ToolTrait for UpdateDatabaseTierTool {
    fn name(&self) -> &str {
        "UpdateDatabaseTier"
    }
    fn description(&self) -> &str {
        "Scale a SQL database to another SKU, e.g. S3 or GP_Gen5_4."
    }
    fn usage(&self) -> &str {
        "<resource-group> <server> <database> <sku>"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 4, self.usage())?;
        let (rg, server, database, sku) = (parts[0], parts[1], parts[2], parts[3]);

        let path = format!("{}/databases/{}", server_path(rg, server), database);
        let body = json!({ "sku": { "name": sku } });
        let result = self.arm.patch(&path, SQL_API_VERSION, &body).await?;

        let state = result["properties"]["status"].as_str().unwrap_or("pending");
        Ok(format!(
            "Requested tier {} for database {} on {} (status: {})",
            sku, database, server, state
        ))
    }
}
