use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::{sleep, Instant};
use tracing::info;

use crate::azure::auth::{TokenProvider, MANAGEMENT_SCOPE};
use crate::azure::unexpected_response;
use crate::config::DataFactorySettings;
use crate::utils::error::{Result, StacksError};

const API_VERSION: &str = "2018-06-01";
const DEFAULT_MANAGEMENT_URL: &str = "https://management.azure.com";

/// Status payload for a Data Factory pipeline run.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineRun {
    #[serde(rename = "runId")]
    pub run_id: String,
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl PipelineRun {
    /// A run counts as complete once it has succeeded or failed.
    pub fn is_complete(&self) -> bool {
        matches!(self.status.as_str(), "Succeeded" | "Failed")
    }
}

#[derive(Debug, Deserialize)]
struct CreateRunResponse {
    #[serde(rename = "runId")]
    run_id: String,
}

/// Management-plane client for triggering and monitoring Azure Data Factory
/// pipeline runs.
pub struct DataFactoryClient {
    settings: DataFactorySettings,
    management_url: String,
    http: reqwest::Client,
    token_provider: Arc<dyn TokenProvider>,
}

impl DataFactoryClient {
    pub fn new(settings: DataFactorySettings, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self::with_endpoint(settings, DEFAULT_MANAGEMENT_URL, token_provider)
    }

    pub fn with_endpoint(
        settings: DataFactorySettings,
        management_url: impl Into<String>,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            settings,
            management_url: management_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token_provider,
        }
    }

    fn factory_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.DataFactory/factories/{}",
            self.management_url,
            self.settings.subscription_id,
            self.settings.resource_group_name,
            self.settings.data_factory_name,
        )
    }

    async fn bearer(&self) -> Result<String> {
        self.token_provider.token(MANAGEMENT_SCOPE).await
    }

    /// Triggers a pipeline run and returns its run ID.
    pub async fn create_pipeline_run(
        &self,
        pipeline_name: &str,
        parameters: &serde_json::Value,
    ) -> Result<String> {
        let url = format!("{}/pipelines/{pipeline_name}/createRun", self.factory_url());
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .query(&[("api-version", API_VERSION)])
            .json(parameters)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected_response(&url, response).await);
        }

        let created: CreateRunResponse = response.json().await?;
        info!("Created pipeline run {} for {pipeline_name}", created.run_id);
        Ok(created.run_id)
    }

    /// Fetches the current state of a pipeline run.
    pub async fn get_pipeline_run(&self, run_id: &str) -> Result<PipelineRun> {
        let url = format!("{}/pipelineruns/{run_id}", self.factory_url());
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.bearer().await?)
            .query(&[("api-version", API_VERSION)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected_response(&url, response).await);
        }
        Ok(response.json().await?)
    }

    /// Returns true if the run has reached a terminal state.
    pub async fn pipeline_run_complete(&self, run_id: &str) -> Result<bool> {
        Ok(self.get_pipeline_run(run_id).await?.is_complete())
    }

    /// Polls a pipeline run until it completes or the deadline passes.
    pub async fn wait_for_pipeline_run(
        &self,
        run_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<PipelineRun> {
        let start = Instant::now();
        loop {
            let run = self.get_pipeline_run(run_id).await?;
            info!("Pipeline run {run_id} status: {}", run.status);
            if run.is_complete() {
                return Ok(run);
            }
            if start.elapsed() > timeout {
                return Err(StacksError::PipelineTimeout {
                    run_id: run_id.to_string(),
                    status: run.status,
                    timeout_secs: timeout.as_secs(),
                });
            }
            sleep(interval).await;
        }
    }
}
