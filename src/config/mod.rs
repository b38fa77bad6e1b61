pub mod cli;

use std::env;

use crate::utils::error::{Result, StacksError};

// Medallion container names
pub const BRONZE_CONTAINER_NAME: &str = "raw";
pub const SILVER_CONTAINER_NAME: &str = "staging";
pub const GOLD_CONTAINER_NAME: &str = "curated";

// Config storage
pub const CONFIG_CONTAINER_NAME: &str = "config";

// Automated test output
pub const AUTOMATED_TEST_OUTPUT_DIRECTORY_PREFIX: &str = "automated_test";

/// Checks that every named environment variable is set and non-empty,
/// reporting all missing names at once.
pub fn check_env(required_variables: &[&str]) -> Result<()> {
    let missing: Vec<String> = required_variables
        .iter()
        .filter(|name| env::var(name).map(|v| v.is_empty()).unwrap_or(true))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StacksError::MissingEnvironment { variables: missing })
    }
}

pub(crate) fn required_env(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| StacksError::MissingEnvironment {
            variables: vec![name.to_string()],
        })
}

/// Service principal credentials used across the Azure clients.
#[derive(Debug, Clone)]
pub struct AzureCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl AzureCredentials {
    pub fn from_env() -> Result<Self> {
        check_env(&["AZURE_TENANT_ID", "AZURE_CLIENT_ID", "AZURE_CLIENT_SECRET"])?;
        Ok(Self {
            tenant_id: required_env("AZURE_TENANT_ID")?,
            client_id: required_env("AZURE_CLIENT_ID")?,
            client_secret: required_env("AZURE_CLIENT_SECRET")?,
        })
    }
}

/// Identifiers for the Data Factory instance under test/automation.
#[derive(Debug, Clone)]
pub struct DataFactorySettings {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub data_factory_name: String,
}

impl DataFactorySettings {
    pub fn from_env() -> Result<Self> {
        check_env(&[
            "AZURE_SUBSCRIPTION_ID",
            "AZURE_RESOURCE_GROUP_NAME",
            "AZURE_DATA_FACTORY_NAME",
        ])?;
        Ok(Self {
            subscription_id: required_env("AZURE_SUBSCRIPTION_ID")?,
            resource_group_name: required_env("AZURE_RESOURCE_GROUP_NAME")?,
            data_factory_name: required_env("AZURE_DATA_FACTORY_NAME")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_env_reports_all_missing() {
        std::env::set_var("STACKS_CHECK_SET", "value");
        std::env::remove_var("STACKS_CHECK_MISSING_A");
        std::env::remove_var("STACKS_CHECK_MISSING_B");

        let result = check_env(&[
            "STACKS_CHECK_SET",
            "STACKS_CHECK_MISSING_A",
            "STACKS_CHECK_MISSING_B",
        ]);

        match result {
            Err(StacksError::MissingEnvironment { variables }) => {
                assert_eq!(variables, vec!["STACKS_CHECK_MISSING_A", "STACKS_CHECK_MISSING_B"]);
            }
            other => panic!("expected MissingEnvironment, got {other:?}"),
        }
    }

    #[test]
    fn test_check_env_ok() {
        std::env::set_var("STACKS_CHECK_OK", "value");
        assert!(check_env(&["STACKS_CHECK_OK"]).is_ok());
    }
}
