//! Container Apps availability tools

use async_trait::async_trait;
use std::sync::Arc;

use super::arm::summarize_metrics;
use super::{parse_args, ArmClient, ToolError, ToolTrait};

const ACA_API_VERSION: &str = "2023-05-01";

fn app_provider_path(app: &str) -> String {
    format!("Microsoft.App/containerApps/{}", app)
}

/// Provisioning state, running status and latest revisions of a container app
pub struct GetContainerAppStatusTool {
    arm: Arc<ArmClient>,
}

impl GetContainerAppStatusTool {
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

#[async_trait]
impl ToolTrait for GetContainerAppStatusTool {
    fn name(&self) -> &str {
        "GetContainerAppStatus"
    }
    fn description(&self) -> &str {
        "Show provisioning state, running status, latest revisions and scale settings of a Container App."
    }
    fn usage(&self) -> &str {
        "<resource-group> <app-name>"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 2, self.usage())?;
        let (rg, app) = (parts[0], parts[1]);
        let id = self.arm.resource_id(rg, &app_provider_path(app))?;

        let Some(json) = self.arm.get(&id, ACA_API_VERSION).await? else {
            return Ok(format!("Container App {} not found in resource group {}", app, rg));
        };

        let props = &json["properties"];
        let text = |v: &serde_json::Value| v.as_str().unwrap_or("unknown").to_string();
        let scale = &props["template"]["scale"];

        let mut lines = vec![
            format!("Container App {}:", app),
            format!("  provisioning state: {}", text(&props["provisioningState"])),
            format!("  running status: {}", text(&props["runningStatus"])),
            format!("  latest revision: {}", text(&props["latestRevisionName"])),
            format!(
                "  latest ready revision: {}",
                text(&props["latestReadyRevisionName"])
            ),
            format!(
                "  scale: min {} / max {} replicas",
                scale["minReplicas"].as_u64().unwrap_or(0),
                scale["maxReplicas"].as_u64().unwrap_or(10)
            ),
        ];
        if props["latestRevisionName"] != props["latestReadyRevisionName"] {
            lines.push(
                "  the latest revision is not ready; check the system logs for image pull or startup failures"
                    .to_string(),
            );
        }
        Ok(lines.join("\n"))
    }
}

/// CPU, memory and request metrics of a container app over the last 30 minutes
pub struct GetContainerAppMetricsTool {
    arm: Arc<ArmClient>,
}

impl GetContainerAppMetricsTool {
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

#[async_trait]
impl ToolTrait for GetContainerAppMetricsTool {
    fn name(&self) -> &str {
        "GetContainerAppMetrics"
    }
    fn description(&self) -> &str {
        "Summarize CPU, memory and request count of a Container App at per-minute granularity over the last 30 minutes."
    }
    fn usage(&self) -> &str {
        "<resource-group> <app-name>"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 2, self.usage())?;
        let (rg, app) = (parts[0], parts[1]);
        let id = self.arm.resource_id(rg, &app_provider_path(app))?;

        let metrics = self
            .arm
            .metrics(&id, "UsageNanoCores,WorkingSetBytes,Requests,RestartCount")
            .await?;

        Ok(match metrics {
            Some(json) => format!("Container App {}:\n{}", app, summarize_metrics(&json)),
            None => format!("Container App {} not found in resource group {}", app, rg),
        })
    }
}
