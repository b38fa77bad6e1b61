use std::sync::Arc;

use crate::azure::auth::TokenProvider;
use crate::azure::datalake::DatalakeClient;
use crate::utils::error::Result;

/// Client for Azure Data Lake Storage Gen2, wrapping the base
/// [`DatalakeClient`] with account-level URL construction.
pub struct AdlsClient {
    storage_account_name: String,
    datalake: DatalakeClient,
}

impl AdlsClient {
    pub fn new(storage_account_name: impl Into<String>, token_provider: Arc<dyn TokenProvider>) -> Self {
        let storage_account_name = storage_account_name.into();
        let account_url = format!("https://{storage_account_name}.dfs.core.windows.net");
        Self {
            storage_account_name,
            datalake: DatalakeClient::new(account_url, token_provider),
        }
    }

    /// Points the client at a custom endpoint. Used by tests running against a
    /// mock server.
    pub fn with_endpoint(
        storage_account_name: impl Into<String>,
        endpoint: impl Into<String>,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            storage_account_name: storage_account_name.into(),
            datalake: DatalakeClient::new(endpoint, token_provider),
        }
    }

    pub fn account_url(&self) -> &str {
        self.datalake.account_url()
    }

    /// Returns the abfss URL for a file within a container.
    pub fn file_url(&self, container_name: &str, file_name: &str) -> String {
        format!(
            "abfss://{container_name}@{}.dfs.core.windows.net/{file_name}",
            self.storage_account_name
        )
    }

    pub async fn filter_directory_paths(
        &self,
        container_name: &str,
        directory_path: &str,
        directory_substring: &str,
    ) -> Result<Vec<String>> {
        self.datalake
            .filter_directory_paths(container_name, directory_path, directory_substring)
            .await
    }

    pub async fn delete_directory(&self, container_name: &str, directory_path: &str) -> Result<()> {
        self.datalake.delete_directory(container_name, directory_path).await
    }

    pub async fn delete_directories(&self, container_name: &str, directory_paths: &[String]) -> Result<()> {
        self.datalake.delete_directories(container_name, directory_paths).await
    }

    pub async fn all_files_present(
        &self,
        container_name: &str,
        directory_path: &str,
        expected_files: &[String],
    ) -> Result<bool> {
        self.datalake
            .all_files_present(container_name, directory_path, expected_files)
            .await
    }

    pub async fn get_directory_contents(
        &self,
        container_name: &str,
        directory_path: &str,
        recursive: bool,
    ) -> Result<Vec<String>> {
        self.datalake
            .get_directory_contents(container_name, directory_path, recursive)
            .await
    }

    pub async fn upload_file(
        &self,
        container_name: &str,
        target_directory_path: &str,
        local_path: &str,
        file_name: &str,
    ) -> Result<()> {
        self.datalake
            .upload_file(container_name, target_directory_path, local_path, file_name)
            .await
    }

    /// Downloads a file from a container and returns its raw bytes.
    pub async fn download_file(&self, container_name: &str, file_path: &str) -> Result<Vec<u8>> {
        self.datalake.download_file(container_name, file_path).await
    }

    /// Writes raw bytes to a path within a container, overwriting any
    /// existing file.
    pub async fn upload_bytes(&self, container_name: &str, target_path: &str, data: Vec<u8>) -> Result<()> {
        self.datalake.upload_bytes(container_name, target_path, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::auth::StaticTokenProvider;

    #[test]
    fn test_account_url() {
        let client = AdlsClient::new("teststorage", Arc::new(StaticTokenProvider::new("token")));
        assert_eq!(client.account_url(), "https://teststorage.dfs.core.windows.net");
    }

    #[test]
    fn test_file_url() {
        let client = AdlsClient::new("teststorage", Arc::new(StaticTokenProvider::new("token")));
        assert_eq!(
            client.file_url("curated", "path/to/file.csv"),
            "abfss://curated@teststorage.dfs.core.windows.net/path/to/file.csv"
        );
    }
}
