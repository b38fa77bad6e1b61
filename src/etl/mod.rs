use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::info;

use crate::azure::adls::AdlsClient;
use crate::azure::auth::ClientSecretCredential;
use crate::azure::blob::BlobStorageClient;
use crate::config::{check_env, required_env, AzureCredentials};
use crate::utils::error::{Result, StacksError};
use crate::utils::filter_files_by_extension;

pub const RUNDATE_PREFIX: &str = "rundate=";

/// Columns stamped onto every ingested dataset; dropped again when read back.
pub const METADATA_COLUMNS: [&str; 3] = [
    "meta_ingestion_datetime",
    "meta_ingestion_pipeline",
    "meta_ingestion_run_id",
];

const REQUIRED_ENV_VARS: [&str; 5] = [
    "AZURE_TENANT_ID",
    "AZURE_CLIENT_ID",
    "AZURE_CLIENT_SECRET",
    "ADLS_ACCOUNT",
    "CONFIG_BLOB_ACCOUNT",
];

/// A row of tabular data keyed by column name.
pub type DataRecord = HashMap<String, String>;

/// Parses the timestamp portion of a rundate directory name. Ingest runs
/// write either RFC 3339 timestamps or the compact `HHMMSS.FFFFFFZ` form.
pub fn parse_rundate(value: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H%M%S%.fZ", "%Y-%m-%dT%H%M%SZ"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    None
}

/// Picks the most recent rundate from a list of directory names following the
/// `rundate=<ISO-8601>` pattern. Returns the timestamp suffix of the winner.
pub fn latest_rundate(directories: &[String], datasource_path: &str) -> Result<String> {
    if directories.is_empty() {
        return Err(StacksError::NoRundateDirectories {
            path: datasource_path.to_string(),
        });
    }

    let mut most_recent: Option<(NaiveDateTime, String)> = None;
    for directory in directories {
        let suffix = directory
            .split_once(RUNDATE_PREFIX)
            .map(|(_, suffix)| suffix.trim_end_matches('/'))
            .ok_or_else(|| StacksError::InvalidRundate {
                name: directory.clone(),
            })?;
        let parsed = parse_rundate(suffix).ok_or_else(|| StacksError::InvalidRundate {
            name: directory.clone(),
        })?;
        if most_recent.as_ref().is_none_or(|(current, _)| parsed > *current) {
            most_recent = Some((parsed, suffix.to_string()));
        }
    }

    // Unreachable only for an empty list, which is handled above.
    Ok(most_recent.map(|(_, suffix)| suffix).unwrap_or_default())
}

/// Parses CSV bytes into records keyed by header name.
pub fn read_csv_records(data: &[u8]) -> Result<Vec<DataRecord>> {
    let mut reader = csv::Reader::from_reader(data);
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: DataRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        records.push(record);
    }
    Ok(records)
}

fn drop_metadata_columns(records: &mut [DataRecord]) {
    for record in records.iter_mut() {
        for column in METADATA_COLUMNS {
            record.remove(column);
        }
    }
}

/// Shared session for ETL helpers: validates the environment once and holds
/// the ADLS and blob clients.
pub struct EtlSession {
    pub adls_client: AdlsClient,
    pub blob_storage_client: BlobStorageClient,
}

impl EtlSession {
    /// Builds a session from environment configuration. Every missing
    /// variable is reported in one error.
    pub fn from_env() -> Result<Self> {
        check_env(&REQUIRED_ENV_VARS)?;
        let credentials = AzureCredentials::from_env()?;
        let token_provider = Arc::new(ClientSecretCredential::new(credentials));

        let adls_account = required_env("ADLS_ACCOUNT")?;
        let config_blob_account = required_env("CONFIG_BLOB_ACCOUNT")?;

        Ok(Self {
            adls_client: AdlsClient::new(adls_account, token_provider.clone()),
            blob_storage_client: BlobStorageClient::new(&config_blob_account, token_provider),
        })
    }

    /// Wires a session from pre-built clients, e.g. ones pointed at a mock
    /// server.
    pub fn new(adls_client: AdlsClient, blob_storage_client: BlobStorageClient) -> Self {
        Self {
            adls_client,
            blob_storage_client,
        }
    }

    /// Reads the dataset with the most recent rundate under a datasource path,
    /// dropping the ingestion metadata columns.
    pub async fn read_latest_rundate_data(
        &self,
        container_name: &str,
        datasource_path: &str,
    ) -> Result<Vec<DataRecord>> {
        info!("Reading dataset: {datasource_path}");
        let directories = self
            .adls_client
            .get_directory_contents(container_name, datasource_path, false)
            .await?;
        let most_recent = latest_rundate(&directories, datasource_path)?;
        info!("Latest rundate: {most_recent}");

        let latest_path = format!(
            "{}/{RUNDATE_PREFIX}{most_recent}",
            datasource_path.trim_end_matches('/')
        );
        let contents = self
            .adls_client
            .get_directory_contents(container_name, &latest_path, true)
            .await?;

        let mut records = Vec::new();
        for file_path in filter_files_by_extension(&contents, "csv") {
            let data = self.adls_client.download_file(container_name, &file_path).await?;
            records.extend(read_csv_records(&data)?);
        }
        drop_metadata_columns(&mut records);
        Ok(records)
    }
}
