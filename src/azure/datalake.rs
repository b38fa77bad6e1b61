use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::azure::auth::{TokenProvider, STORAGE_SCOPE};
use crate::azure::unexpected_response;
use crate::utils::error::{Result, StacksError};

/// One entry from a filesystem listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PathEntry {
    pub name: String,
    #[serde(rename = "isDirectory", default)]
    is_directory_raw: Option<String>,
}

impl PathEntry {
    pub fn is_directory(&self) -> bool {
        self.is_directory_raw.as_deref() == Some("true")
    }
}

#[derive(Debug, Deserialize)]
struct PathList {
    paths: Vec<PathEntry>,
}

/// Base client for hierarchical-namespace storage, shared by ADLS Gen2 and
/// Fabric Lakehouse. A file system is a container name in ADLS and a
/// workspace ID in Lakehouse.
pub struct DatalakeClient {
    account_url: String,
    http: reqwest::Client,
    token_provider: Arc<dyn TokenProvider>,
}

impl DatalakeClient {
    pub fn new(account_url: impl Into<String>, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            account_url: account_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token_provider,
        }
    }

    pub fn account_url(&self) -> &str {
        &self.account_url
    }

    async fn bearer(&self) -> Result<String> {
        self.token_provider.token(STORAGE_SCOPE).await
    }

    fn path_url(&self, file_system: &str, path: &str) -> String {
        format!("{}/{}/{}", self.account_url, file_system, path.trim_start_matches('/'))
    }

    /// Lists paths under a directory within a file system.
    pub async fn get_paths(
        &self,
        file_system: &str,
        directory_path: &str,
        recursive: bool,
    ) -> Result<Vec<PathEntry>> {
        let url = format!("{}/{}", self.account_url, file_system);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.bearer().await?)
            .query(&[
                ("resource", "filesystem"),
                ("recursive", if recursive { "true" } else { "false" }),
                ("directory", directory_path),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected_response(&url, response).await);
        }

        let listing: PathList = response.json().await?;
        debug!("Listed {} paths under {directory_path}", listing.paths.len());
        Ok(listing.paths)
    }

    /// Checks whether a directory exists within a file system.
    pub async fn directory_exists(&self, file_system: &str, directory_path: &str) -> Result<bool> {
        let url = self.path_url(file_system, directory_path);
        let response = self
            .http
            .head(&url)
            .bearer_auth(self.bearer().await?)
            .query(&[("action", "getStatus")])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            _ => Err(unexpected_response(&url, response).await),
        }
    }

    /// Filters a directory for subdirectories containing a given substring.
    /// A missing parent directory yields an empty list.
    pub async fn filter_directory_paths(
        &self,
        file_system: &str,
        directory_path: &str,
        directory_substring: &str,
    ) -> Result<Vec<String>> {
        if !self.directory_exists(file_system, directory_path).await? {
            return Ok(Vec::new());
        }

        let paths = self.get_paths(file_system, directory_path, true).await?;
        Ok(paths
            .into_iter()
            .filter(|path| path.is_directory() && path.name.contains(directory_substring))
            .map(|path| path.name)
            .collect())
    }

    /// Deletes a directory and its contents. An absent directory is logged,
    /// not treated as an error.
    pub async fn delete_directory(&self, file_system: &str, directory_path: &str) -> Result<()> {
        if !self.directory_exists(file_system, directory_path).await? {
            info!("The following directory was not found: {directory_path}");
            return Ok(());
        }

        let url = self.path_url(file_system, directory_path);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(self.bearer().await?)
            .query(&[("recursive", "true")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected_response(&url, response).await);
        }
        Ok(())
    }

    pub async fn delete_directories(&self, file_system: &str, directory_paths: &[String]) -> Result<()> {
        for directory_path in directory_paths {
            info!("Deleting directory: {directory_path}...");
            self.delete_directory(file_system, directory_path).await?;
        }
        Ok(())
    }

    /// Checks that every expected file name appears somewhere in the listing
    /// of the given directory.
    pub async fn all_files_present(
        &self,
        file_system: &str,
        directory_path: &str,
        expected_files: &[String],
    ) -> Result<bool> {
        let paths = self.get_paths(file_system, directory_path, true).await?;
        let missing: Vec<String> = expected_files
            .iter()
            .filter(|expected| !paths.iter().any(|path| path.name.contains(expected.as_str())))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(true)
        } else {
            Err(StacksError::MissingFiles {
                directory: directory_path.to_string(),
                missing,
            })
        }
    }

    /// Returns the path names of the contents of a directory.
    pub async fn get_directory_contents(
        &self,
        file_system: &str,
        directory_path: &str,
        recursive: bool,
    ) -> Result<Vec<String>> {
        let paths = self.get_paths(file_system, directory_path, recursive).await?;
        let names: Vec<String> = paths.into_iter().map(|path| path.name).collect();
        debug!("Directory contents: {names:?}");
        Ok(names)
    }

    /// Downloads a file and returns its raw bytes.
    pub async fn download_file(&self, file_system: &str, file_path: &str) -> Result<Vec<u8>> {
        let url = self.path_url(file_system, file_path);
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

    /// Uploads a local file into a directory, overwriting any existing file.
    pub async fn upload_file(
        &self,
        file_system: &str,
        target_directory_path: &str,
        local_path: &str,
        file_name: &str,
    ) -> Result<()> {
        let data = tokio::fs::read(Path::new(local_path).join(file_name)).await?;
        let target_path = format!("{}/{}", target_directory_path.trim_end_matches('/'), file_name);
        self.upload_bytes(file_system, &target_path, data).await?;
        info!("Uploaded {file_name} to {file_system}/{target_path}");
        Ok(())
    }

    /// Writes raw bytes to a path, overwriting any existing file. Follows the
    /// Gen2 path semantics: create, append, then flush.
    pub async fn upload_bytes(
        &self,
        file_system: &str,
        target_path: &str,
        data: Vec<u8>,
    ) -> Result<()> {
        let url = self.path_url(file_system, target_path);
        let token = self.bearer().await?;

        let response = self
            .http
            .put(&url)
            .bearer_auth(&token)
            .query(&[("resource", "file")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(unexpected_response(&url, response).await);
        }

        let length = data.len();
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&token)
            .query(&[("action", "append"), ("position", "0")])
            .body(data)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(unexpected_response(&url, response).await);
        }

        let position = length.to_string();
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&token)
            .query(&[("action", "flush"), ("position", position.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(unexpected_response(&url, response).await);
        }
        Ok(())
    }
}
