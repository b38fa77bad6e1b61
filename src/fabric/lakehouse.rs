use std::sync::Arc;

use crate::azure::auth::TokenProvider;
use crate::azure::datalake::DatalakeClient;
use crate::utils::error::Result;

const ONELAKE_ACCOUNT_NAME: &str = "onelake";

/// Client for a Microsoft Fabric Lakehouse. OneLake exposes the same
/// hierarchical-namespace surface as ADLS, with the workspace ID as the file
/// system and paths rooted at the lakehouse ID.
pub struct LakehouseClient {
    workspace_id: String,
    lakehouse_id: String,
    datalake: DatalakeClient,
}

impl LakehouseClient {
    pub fn new(
        workspace_id: impl Into<String>,
        lakehouse_id: impl Into<String>,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self::with_endpoint(
            workspace_id,
            lakehouse_id,
            format!("https://{ONELAKE_ACCOUNT_NAME}.dfs.fabric.microsoft.com"),
            token_provider,
        )
    }

    pub fn with_endpoint(
        workspace_id: impl Into<String>,
        lakehouse_id: impl Into<String>,
        endpoint: impl Into<String>,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            lakehouse_id: lakehouse_id.into(),
            datalake: DatalakeClient::new(endpoint, token_provider),
        }
    }

    pub fn account_url(&self) -> &str {
        self.datalake.account_url()
    }

    /// Returns the abfss URL for a file within the lakehouse.
    pub fn file_url(&self, file_name: &str) -> String {
        format!(
            "abfss://{}@{ONELAKE_ACCOUNT_NAME}.dfs.fabric.microsoft.com/{}/{file_name}",
            self.workspace_id, self.lakehouse_id
        )
    }

    /// Returns the abfss URL for a table. Tables live under
    /// `Tables/<schema>/<table>`; pass `None` for schema-less lakehouses.
    pub fn table_url(&self, table_name: &str, schema: Option<&str>) -> String {
        let table_fqdn = match schema {
            Some(schema) => format!("Tables/{schema}/{table_name}"),
            None => format!("Tables/{table_name}"),
        };
        self.file_url(&table_fqdn)
    }

    /// Full path of a directory within the current lakehouse.
    fn full_directory_path(&self, directory_path: &str) -> String {
        format!("{}/{}", self.lakehouse_id, directory_path.trim_start_matches('/'))
    }

    pub async fn filter_directory_paths(
        &self,
        directory_path: &str,
        directory_substring: &str,
    ) -> Result<Vec<String>> {
        self.datalake
            .filter_directory_paths(
                &self.workspace_id,
                &self.full_directory_path(directory_path),
                directory_substring,
            )
            .await
    }

    pub async fn delete_directory(&self, directory_path: &str) -> Result<()> {
        self.datalake
            .delete_directory(&self.workspace_id, &self.full_directory_path(directory_path))
            .await
    }

    pub async fn delete_directories(&self, directory_paths: &[String]) -> Result<()> {
        let full_paths: Vec<String> = directory_paths
            .iter()
            .map(|path| self.full_directory_path(path))
            .collect();
        self.datalake.delete_directories(&self.workspace_id, &full_paths).await
    }

    pub async fn all_files_present(&self, directory_path: &str, expected_files: &[String]) -> Result<bool> {
        self.datalake
            .all_files_present(
                &self.workspace_id,
                &self.full_directory_path(directory_path),
                expected_files,
            )
            .await
    }

    pub async fn get_directory_contents(&self, directory_path: &str, recursive: bool) -> Result<Vec<String>> {
        self.datalake
            .get_directory_contents(
                &self.workspace_id,
                &self.full_directory_path(directory_path),
                recursive,
            )
            .await
    }

    pub async fn upload_file(
        &self,
        target_directory_path: &str,
        local_path: &str,
        file_name: &str,
    ) -> Result<()> {
        self.datalake
            .upload_file(
                &self.workspace_id,
                &self.full_directory_path(target_directory_path),
                local_path,
                file_name,
            )
            .await
    }
}
