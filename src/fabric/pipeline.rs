use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::azure::auth::{TokenProvider, FABRIC_SCOPE};
use crate::azure::unexpected_response;
use crate::utils::error::Result;

const DEFAULT_API_URL: &str = "https://api.fabric.microsoft.com/v1";

/// Terminal states for a Fabric pipeline job instance.
const COMPLETE_STATES: [&str; 4] = ["Succeeded", "Failed", "Cancelled", "Completed"];

/// Final status and duration (seconds) of a polled pipeline run. `None` when
/// no job instances exist for the pipeline.
pub type PipelineOutcome = Option<(String, u64)>;

#[derive(Debug, Deserialize)]
struct JobInstance {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct JobInstanceList {
    #[serde(default)]
    value: Vec<JobInstance>,
}

/// Client for triggering and polling Microsoft Fabric Data Pipelines through
/// the Fabric REST API.
pub struct DataPipelineClient {
    workspace_id: String,
    pipeline_id: String,
    api_url: String,
    http: reqwest::Client,
    token_provider: Arc<dyn TokenProvider>,
}

impl DataPipelineClient {
    pub fn new(
        workspace_id: impl Into<String>,
        pipeline_id: impl Into<String>,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self::with_endpoint(workspace_id, pipeline_id, DEFAULT_API_URL, token_provider)
    }

    pub fn with_endpoint(
        workspace_id: impl Into<String>,
        pipeline_id: impl Into<String>,
        api_url: impl Into<String>,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            pipeline_id: pipeline_id.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token_provider,
        }
    }

    fn item_url(&self) -> String {
        format!(
            "{}/workspaces/{}/items/{}/jobs/instances",
            self.api_url, self.workspace_id, self.pipeline_id
        )
    }

    async fn bearer(&self) -> Result<String> {
        self.token_provider.token(FABRIC_SCOPE).await
    }

    /// Triggers the pipeline. Without an explicit payload, a default
    /// `param_waitsec` parameter is passed.
    pub async fn trigger_pipeline(&self, payload: Option<serde_json::Value>) -> Result<()> {
        let url = self.item_url();
        let body = payload
            .unwrap_or_else(|| json!({"executionData": {"parameters": {"param_waitsec": "60"}}}));

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .query(&[("jobType", "Pipeline")])
            .json(&body)
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 202 => {
                info!("Triggered pipeline {} in workspace {}", self.pipeline_id, self.workspace_id);
                Ok(())
            }
            _ => Err(unexpected_response(&url, response).await),
        }
    }

    /// Polls the latest job instance until it reaches a terminal state or the
    /// deadline passes. On timeout the last observed status is returned.
    pub async fn poll_pipeline_until_complete(
        &self,
        interval: Duration,
        timeout: Duration,
    ) -> Result<PipelineOutcome> {
        let url = self.item_url();
        info!(
            "Polling pipeline {} in workspace {}...",
            self.pipeline_id, self.workspace_id
        );
        let start = Instant::now();

        loop {
            let response = self
                .http
                .get(&url)
                .bearer_auth(self.bearer().await?)
                .query(&[("$top", "1")])
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(unexpected_response(&url, response).await);
            }

            let runs: JobInstanceList = response.json().await?;
            let Some(latest_run) = runs.value.first() else {
                warn!("No pipeline runs found.");
                return Ok(None);
            };

            let status = latest_run.status.clone().unwrap_or_default();
            let duration = latest_run.duration.unwrap_or_else(|| start.elapsed().as_secs());
            info!("Status: {status}");

            if COMPLETE_STATES.contains(&status.as_str()) {
                return Ok(Some((status, duration)));
            }
            if start.elapsed() > timeout {
                warn!("Polling timed out.");
                return Ok(Some((status, duration)));
            }
            sleep(interval).await;
        }
    }
}
