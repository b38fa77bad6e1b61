use std::sync::Arc;

use regex::Regex;
use tracing::{info, warn};

use crate::azure::auth::{TokenProvider, STORAGE_SCOPE};
use crate::azure::unexpected_response;
use crate::utils::error::Result;

/// Client for Azure Blob Storage: config upload/download helpers and
/// prefix-based cleanup.
pub struct BlobStorageClient {
    account_blob_url: String,
    http: reqwest::Client,
    token_provider: Arc<dyn TokenProvider>,
}

impl BlobStorageClient {
    pub fn new(storage_account_name: &str, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self::with_endpoint(
            format!("https://{storage_account_name}.blob.core.windows.net"),
            token_provider,
        )
    }

    pub fn with_endpoint(endpoint: impl Into<String>, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            account_blob_url: endpoint.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token_provider,
        }
    }

    pub fn account_blob_url(&self) -> &str {
        &self.account_blob_url
    }

    async fn bearer(&self) -> Result<String> {
        self.token_provider.token(STORAGE_SCOPE).await
    }

    fn blob_url(&self, container_name: &str, blob_path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.account_blob_url,
            container_name,
            blob_path.trim_start_matches('/')
        )
    }

    /// Uploads a local file to blob storage under the given directory. The
    /// blob name is the file name portion of the local path.
    pub async fn upload_file_to_blob(
        &self,
        container_name: &str,
        target_dir: &str,
        local_file_path: &str,
        overwrite: bool,
    ) -> Result<()> {
        let file_name = local_file_path.rsplit('/').next().unwrap_or(local_file_path);
        let target_blob_path = format!("{target_dir}/{file_name}");
        let url = self.blob_url(container_name, &target_blob_path);
        let data = tokio::fs::read(local_file_path).await?;

        let mut request = self
            .http
            .put(&url)
            .bearer_auth(self.bearer().await?)
            .header("x-ms-blob-type", "BlockBlob")
            .body(data);
        if !overwrite {
            request = request.header("If-None-Match", "*");
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(unexpected_response(&url, response).await);
        }
        info!("Uploaded {local_file_path} to {container_name}/{target_blob_path}.");
        Ok(())
    }

    /// Lists blob names in a container that start with the given prefix.
    pub async fn list_blobs(&self, container_name: &str, prefix: &str) -> Result<Vec<String>> {
        let url = format!("{}/{}", self.account_blob_url, container_name);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.bearer().await?)
            .query(&[("restype", "container"), ("comp", "list"), ("prefix", prefix)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected_response(&url, response).await);
        }

        // The list response is XML; blob names live in <Name> elements.
        let body = response.text().await?;
        let name_pattern = Regex::new(r"<Name>([^<]+)</Name>").unwrap();
        Ok(name_pattern
            .captures_iter(&body)
            .map(|caps| caps[1].to_string())
            .collect())
    }

    /// Deletes every blob with the given prefix. Returns false if any delete
    /// fails, true otherwise (including when nothing matches).
    pub async fn delete_blob_prefix(&self, container_name: &str, blob_prefix: &str) -> Result<bool> {
        let blob_list = self.list_blobs(container_name, blob_prefix).await?;
        if blob_list.is_empty() {
            info!("No blobs exist with prefix {blob_prefix} in container {container_name}");
            return Ok(true);
        }

        for blob_name in blob_list {
            info!("Deleting {blob_name}");
            let url = self.blob_url(container_name, &blob_name);
            let outcome = self
                .http
                .delete(&url)
                .bearer_auth(self.bearer().await?)
                .send()
                .await
                .map(|response| response.status().is_success());
            match outcome {
                Ok(true) => {}
                Ok(false) | Err(_) => {
                    warn!("Error deleting directory '{blob_prefix}'");
                    return Ok(false);
                }
            }
        }
        info!("All blobs with prefix {blob_prefix} deleted successfully from container {container_name}");
        Ok(true)
    }

    /// Downloads a blob and returns its raw bytes.
    pub async fn download_blob(&self, container_name: &str, file_path: &str) -> Result<Vec<u8>> {
        let url = self.blob_url(container_name, file_path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected_response(&url, response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Loads a JSON file from blob storage and parses it.
    pub async fn load_json_from_blob(&self, container_name: &str, file_path: &str) -> Result<serde_json::Value> {
        let content = self.download_blob(container_name, file_path).await?;
        Ok(serde_json::from_slice(&content)?)
    }
}
