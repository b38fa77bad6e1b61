use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::Result;

/// Workload families the generator can scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadType {
    Ingest,
    Processing,
}

impl WorkloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadType::Ingest => "ingest",
            WorkloadType::Processing => "processing",
        }
    }
}

impl fmt::Display for WorkloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source systems an ingest workload can pull from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceType {
    AzureSql,
    AzureBlobStorage,
    RestApi,
}

impl DataSourceType {
    /// Upper-case form used in generated pipeline activity names.
    pub fn activity_name(&self) -> &'static str {
        match self {
            DataSourceType::AzureSql => "AZURE_SQL",
            DataSourceType::AzureBlobStorage => "AZURE_BLOB_STORAGE",
            DataSourceType::RestApi => "REST_API",
        }
    }
}

/// Common surface the generator needs from any workload config.
pub trait WorkloadConfig: Serialize {
    fn name(&self) -> &str;
    fn workload_type(&self) -> WorkloadType;
    fn template_source_folder(&self) -> &str;
}

fn default_bronze_container() -> String {
    crate::config::BRONZE_CONTAINER_NAME.to_string()
}

fn default_ingest_template() -> String {
    "ingest_source".to_string()
}

fn default_processing_template() -> String {
    "processing_template".to_string()
}

/// Config for scaffolding a data ingest workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestWorkloadConfig {
    pub dataset_name: String,
    pub pipeline_description: String,
    pub data_source_type: DataSourceType,
    pub key_vault_linked_service_name: String,
    pub data_source_password_key_vault_secret_name: String,
    pub data_source_connection_string_variable_name: String,
    pub ado_variable_groups_nonprod: Vec<String>,
    pub ado_variable_groups_prod: Vec<String>,
    #[serde(default = "default_bronze_container")]
    pub bronze_container: String,
    #[serde(default = "default_ingest_template")]
    pub template_source_folder: String,
    #[serde(default)]
    pub stacks_data_package_version: Option<String>,
}

impl WorkloadConfig for IngestWorkloadConfig {
    fn name(&self) -> &str {
        &self.dataset_name
    }

    fn workload_type(&self) -> WorkloadType {
        WorkloadType::Ingest
    }

    fn template_source_folder(&self) -> &str {
        &self.template_source_folder
    }
}

/// Config for scaffolding a data processing workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingWorkloadConfig {
    pub pipeline_name: String,
    pub pipeline_description: String,
    pub ado_variable_groups_nonprod: Vec<String>,
    pub ado_variable_groups_prod: Vec<String>,
    #[serde(default = "default_processing_template")]
    pub template_source_folder: String,
    #[serde(default)]
    pub stacks_data_package_version: Option<String>,
}

impl WorkloadConfig for ProcessingWorkloadConfig {
    fn name(&self) -> &str {
        &self.pipeline_name
    }

    fn workload_type(&self) -> WorkloadType {
        WorkloadType::Processing
    }

    fn template_source_folder(&self) -> &str {
        &self.template_source_folder
    }
}

/// Reads a workload config from a YAML file and validates its structure.
pub fn validate_yaml_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    println!("Reading config from provided path...");
    let content = std::fs::read_to_string(path)?;
    let config = serde_yaml::from_str(&content)?;
    println!("Successfully read config file.\n");
    Ok(config)
}
