//! Performance tools

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use super::arm::summarize_metrics;
use super::{parse_args, ArmClient, ToolError, ToolTrait};

const MAX_SAMPLES: usize = 20;

/// Time repeated GET requests against a URL
pub struct MeasureEndpointLatencyTool {
    http: reqwest::Client,
}

impl MeasureEndpointLatencyTool {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ToolTrait for MeasureEndpointLatencyTool {
    fn name(&self) -> &str {
        "MeasureEndpointLatency"
    }
    fn description(&self) -> &str {
        "Time several GET requests to a URL and report min, average and max latency."
    }
    fn usage(&self) -> &str {
        "<url> [samples]"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 1, self.usage())?;
        let url = parts[0];
        let samples: usize = match parts.get(1) {
            Some(n) => n
                .parse()
                .map_err(|_| format!("invalid sample count '{}'", n))?,
            None => 3,
        };
        let samples = samples.clamp(1, MAX_SAMPLES);

        let mut timings = Vec::with_capacity(samples);
        let mut last_status = None;
        for _ in 0..samples {
            let started = Instant::now();
            let response = self.http.get(url).send().await?;
            last_status = Some(response.status());
            response.bytes().await?;
            timings.push(started.elapsed().as_millis());
        }

        let min = timings.iter().min().copied().unwrap_or(0);
        let max = timings.iter().max().copied().unwrap_or(0);
        let avg = timings.iter().sum::<u128>() / timings.len() as u128;
        Ok(format!(
            "{} over {} requests: min {} ms, avg {} ms, max {} ms (last status {})",
            url,
            samples,
            min,
            avg,
            max,
            last_status.map(|s| s.as_u16()).unwrap_or(0)
        ))
    }
}

/// Azure Monitor summary for an App Service site
pub struct CheckAppServiceMetricsTool {
    arm: Arc<ArmClient>,
}

impl CheckAppServiceMetricsTool {
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }
}

#[async_trait]
impl ToolTrait for CheckAppServiceMetricsTool {
    fn name(&self) -> &str {
        "CheckAppServiceMetrics"
    }
    fn description(&self) -> &str {
        "Summarize CPU time, memory, requests and response time of an App Service app over the last 30 minutes."
    }
    fn usage(&self) -> &str {
        "<resource-group> <app-name>"
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let parts = parse_args(args, 2, self.usage())?;
        let (rg, app) = (parts[0], parts[1]);

        let resource_id = self
            .arm
            .resource_id(rg, &format!("Microsoft.Web/sites/{}", app))?;
        let metrics = self
            .arm
            .metrics(
                &resource_id,
                "CpuTime,MemoryWorkingSet,Requests,AverageResponseTime,Http5xx",
            )
            .await?;

        Ok(match metrics {
            Some(json) => format!("App Service {}:\n{}", app, summarize_metrics(&json)),
            None => format!("App Service {} not found in resource group {}", app, rg),
        })
    }
}
