use serde::{Deserialize, Serialize};

use crate::utils::config_uniqueness_check;
use crate::utils::error::{Result, StacksError};

/// One expectation applied to a column, using the great-expectations
/// vocabulary so existing JSON configs remain readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expectation {
    pub expectation_type: String,
    #[serde(default)]
    pub expectation_kwargs: serde_json::Value,
}

/// Expectations grouped per column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnExpectations {
    pub column_name: String,
    pub expectations: Vec<Expectation>,
}

/// One datasource to check: where the data lives and what must hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasourceConfig {
    pub datasource_name: String,
    pub datasource_type: String,
    pub data_location: String,
    pub expectation_suite_name: String,
    pub validation_config: Vec<ColumnExpectations>,
}

/// Top-level data-quality configuration, loaded as JSON from blob storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityConfig {
    pub dataset_name: String,
    pub dq_input_path: String,
    pub dq_output_path: String,
    pub datasource_config: Vec<DatasourceConfig>,
}

impl DataQualityConfig {
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !config_uniqueness_check(&self.datasource_config, |ds| ds.datasource_name.clone()) {
            return Err(StacksError::ConfigError {
                message: "datasource_name values must be unique".to_string(),
            });
        }
        Ok(())
    }
}
