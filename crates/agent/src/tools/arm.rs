//! Azure Resource Manager REST client shared by the built-in tools

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

#[derive(Error, Debug)]
pub enum ArmError {
    #[error("Azure subscription id is not configured")]
    NoSubscription,

    #[error("Azure access token is not configured")]
    NoToken,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Azure returned {status}: {message}")]
    Api { status: u16, message: String },
}

pub type ArmResult<T> = std::result::Result<T, ArmError>;

/// Thin JSON client over the management endpoint
#[derive(Debug, Clone)]
pub struct ArmClient {
    client: Client,
    endpoint: String,
    subscription_id: Option<String>,
    access_token: Option<String>,
}

impl ArmClient {
    pub fn new(
        endpoint: impl Into<String>,
        subscription_id: Option<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            subscription_id,
            access_token,
        }
    }

    pub fn from_config(config: &sreagent_config::Config) -> Self {
        let endpoint = if config.azure.management_endpoint.is_empty() {
            DEFAULT_MANAGEMENT_ENDPOINT.to_string()
        } else {
            config.azure.management_endpoint.clone()
        };
        Self::new(endpoint, config.subscription_id(), config.access_token())
    }

    pub fn is_configured(&self) -> bool {
        self.subscription_id.is_some() && self.access_token.is_some()
    }

    /// Resolve `path` against the endpoint. Paths starting with
    /// `/subscriptions/` or `/providers/` are used as-is, anything else is
    /// taken relative to the configured subscription.
    fn url(&self, path: &str) -> ArmResult<String> {
        if path.starts_with("/subscriptions/") || path.starts_with("/providers/") {
            return Ok(format!("{}{}", self.endpoint, path));
        }
        let subscription = self
            .subscription_id
            .as_deref()
            .ok_or(ArmError::NoSubscription)?;
        Ok(format!(
            "{}/subscriptions/{}/{}",
            self.endpoint,
            subscription,
            path.trim_start_matches('/')
        ))
    }

    /// Full resource id of a resource-group scoped resource
    pub fn resource_id(&self, resource_group: &str, provider_path: &str) -> ArmResult<String> {
        let subscription = self
            .subscription_id
            .as_deref()
            .ok_or(ArmError::NoSubscription)?;
        Ok(format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}",
            subscription, resource_group, provider_path
        ))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        api_version: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> ArmResult<Option<Value>> {
        let token = self.access_token.as_deref().ok_or(ArmError::NoToken)?;
        let url = self.url(path)?;
        trace!("◆ ARM {} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(token)
            .query(&[("api-version", api_version)])
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("◆ ARM resource not found: {}", path);
            return Ok(None);
        }

        let text = response.text().await?;
        let json: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if !status.is_success() {
            let message = json["error"]["message"]
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| status.to_string());
            return Err(ArmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Some(json))
    }

    /// GET a resource; `None` when it does not exist
    pub async fn get(&self, path: &str, api_version: &str) -> ArmResult<Option<Value>> {
        self.send(Method::GET, path, api_version, &[], None).await
    }

    pub async fn get_with_query(
        &self,
        path: &str,
        api_version: &str,
        query: &[(&str, &str)],
    ) -> ArmResult<Option<Value>> {
        self.send(Method::GET, path, api_version, query, None).await
    }

    pub async fn put(&self, path: &str, api_version: &str, body: &Value) -> ArmResult<Value> {
        let json = self
            .send(Method::PUT, path, api_version, &[], Some(body))
            .await?;
        json.ok_or_else(|| ArmError::Api {
            status: 404,
            message: format!("parent resource of {} not found", path),
        })
    }

    pub async fn patch(&self, path: &str, api_version: &str, body: &Value) -> ArmResult<Value> {
        let json = self
            .send(Method::PATCH, path, api_version, &[], Some(body))
            .await?;
        json.ok_or_else(|| ArmError::Api {
            status: 404,
            message: format!("{} not found", path),
        })
    }

    /// DELETE a resource; `false` when it did not exist
    pub async fn delete(&self, path: &str, api_version: &str) -> ArmResult<bool> {
        Ok(self
            .send(Method::DELETE, path, api_version, &[], None)
            .await?
            .is_some())
    }

    /// Azure Monitor metrics for a resource over the last 30 minutes
    pub async fn metrics(&self, resource_id: &str, names: &str) -> ArmResult<Option<Value>> {
        let path = format!("{}/providers/Microsoft.Insights/metrics", resource_id);
        self.get_with_query(
            &path,
            "2018-01-01",
            &[
                ("metricnames", names),
                ("timespan", "PT30M"),
                ("interval", "PT1M"),
                ("aggregation", "Average,Maximum,Total"),
            ],
        )
        .await
    }
}

/// One line per metric: average and peak over the returned data points
pub fn summarize_metrics(metrics: &Value) -> String {
    let Some(series) = metrics["value"].as_array() else {
        return "No metrics returned".to_string();
    };

    let mut lines = Vec::new();
    for metric in series {
        let name = metric["name"]["localizedValue"]
            .as_str()
            .or_else(|| metric["name"]["value"].as_str())
            .unwrap_or("metric");
        let unit = metric["unit"].as_str().unwrap_or("");

        let points: Vec<f64> = metric["timeseries"]
            .as_array()
            .into_iter()
            .flatten()
            .flat_map(|ts| ts["data"].as_array().into_iter().flatten())
            .filter_map(|point| {
                point["average"]
                    .as_f64()
                    .or_else(|| point["total"].as_f64())
                    .or_else(|| point["maximum"].as_f64())
            })
            .collect();

        if points.is_empty() {
            lines.push(format!("{}: no data", name));
            continue;
        }

        let avg = points.iter().sum::<f64>() / points.len() as f64;
        let max = points.iter().cloned().fold(f64::MIN, f64::max);
        lines.push(format!(
            "{}: avg {:.1}, max {:.1} {} over {} points",
            name,
            avg,
            max,
            unit,
            points.len()
        ));
    }

    if lines.is_empty() {
        "No metrics returned".to_string()
    } else {
        lines.join("\n")
    }
}
