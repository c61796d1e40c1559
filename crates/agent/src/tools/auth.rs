//! Authentication tools

use async_trait::async_trait;
use std::sync::Arc;

use super::{parse_args, ArmClient, ToolError, ToolTrait};

const RBAC_API_VERSION: &str = "2022-04-01";

/// Probe an HTTP endpoint anonymously and report how it challenges
pub struct CheckEndpointAuthTool {
    http: reqwest::Client,
}

impl CheckEndpointAuthTool {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ToolTrait for CheckEndpointAuthTool {
    fn name(&self) -> &str {
        "CheckEndpointAuth"
    }
    fn description(&self) -> &str {
        "Send an anonymous request to a URL and report the status, auth challenge and CORS headers."
    }
    fn usage(&self) -> &str {
        "<url>"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 1, self.usage())?;
        let url = parts[0];

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };

        let mut lines = vec![format!("{} answered {}", url, status)];
        if let Some(challenge) = header("www-authenticate") {
            lines.push(format!("WWW-Authenticate: {}", challenge));
        }
        if let Some(origin) = header("access-control-allow-origin") {
            lines.push(format!("Access-Control-Allow-Origin: {}", origin));
        }
        match status.as_u16() {
            401 => lines.push("The endpoint requires authentication; verify token acquisition and audience.".to_string()),
            403 => lines.push("The caller is authenticated but not authorized; check role assignments.".to_string()),
            _ => {}
        }
        Ok(lines.join("\n"))
    }
}

/// List role assignments at a scope
pub struct VerifyRbacPermissionsTool {
    arm: Arc<ArmClient>,
}

impl VerifyRbacPermissionsTool {
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

#[async_trait]
impl ToolTrait for VerifyRbacPermissionsTool {
    fn name(&self) -> &str {
        "VerifyRbacPermissions"
    }
    fn description(&self) -> &str {
        "List role assignments at a scope, e.g. resourceGroups/my-rg or a full resource id."
    }
    fn usage(&self) -> &str {
        "<scope>"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 1, self.usage())?;
        let scope = parts[0].trim_end_matches('/');
        let path = format!(
            "{}/providers/Microsoft.Authorization/roleAssignments",
            scope
        );

        let Some(json) = self
            .arm
            .get_with_query(&path, RBAC_API_VERSION, &[("$filter", "atScope()")])
            .await?
        else {
            return Ok(format!("Scope {} not found", scope));
        };

        let assignments = json["value"].as_array().cloned().unwrap_or_default();
        if assignments.is_empty() {
            return Ok(format!("No role assignments at {}", scope));
        }

        let mut lines = vec![format!("{} role assignments at {}:", assignments.len(), scope)];
        for assignment in &assignments {
            let props = &assignment["properties"];
            let role = props["roleDefinitionId"]
                .as_str()
                .and_then(|id| id.rsplit('/').next())
                .unwrap_or("?");
            lines.push(format!(
                "  {} {} -> role {}",
                props["principalType"].as_str().unwrap_or("Principal"),
                props["principalId"].as_str().unwrap_or("?"),
                role
            ));
        }
        Ok(lines.join("\n"))
    }
}
