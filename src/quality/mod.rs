pub mod config;
pub mod expectations;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;
use url::Url;

use crate::etl::{read_csv_records, DataRecord, EtlSession};
use crate::utils::error::{Result, StacksError};
use crate::utils::{filter_files_by_extension, substitute_env_vars};

pub use config::{ColumnExpectations, DataQualityConfig, DatasourceConfig, Expectation};
pub use expectations::{execute_validations, ExpectationResult};

const DEFAULT_TEST_RUN_ID: &str = "default_run_id";

/// Test hooks for the DQ runner: automated tests reroute output under a
/// run-scoped folder and may point the input at seeded test data.
#[derive(Debug, Default, Clone)]
pub struct DataQualityOptions {
    pub test_flag: bool,
    pub test_run_id: Option<String>,
    pub test_data_path: Option<String>,
}

/// Results document written per datasource.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub datasource_name: String,
    pub expectation_suite_name: String,
    pub run_time: String,
    pub results: Vec<ExpectationResult>,
}

/// Splits an abfss URL into its container and path components.
/// `abfss://<container>@<account>.dfs.core.windows.net/<path>`.
pub fn parse_abfss_url(location: &str) -> Result<(String, String)> {
    let url = Url::parse(location)?;
    if url.scheme() != "abfss" || url.username().is_empty() {
        return Err(StacksError::ConfigError {
            message: format!("not an abfss URL: {location}"),
        });
    }
    let container = url.username().to_string();
    let path = url.path().trim_start_matches('/').to_string();
    Ok((container, path))
}

async fn read_datasource(session: &EtlSession, location: &str) -> Result<Vec<DataRecord>> {
    let (container, path) = parse_abfss_url(location)?;
    if path.ends_with(".csv") {
        let data = session.adls_client.download_file(&container, &path).await?;
        return read_csv_records(&data);
    }

    let contents = session.adls_client.get_directory_contents(&container, &path, true).await?;
    let mut records = Vec::new();
    for file_path in filter_files_by_extension(&contents, "csv") {
        let data = session.adls_client.download_file(&container, &file_path).await?;
        records.extend(read_csv_records(&data)?);
    }
    Ok(records)
}

fn resolve_data_location(datasource: &DatasourceConfig, input_path: &str) -> String {
    // Table datasources carry a full location; file datasources are relative
    // to the dataset's input path.
    if datasource.datasource_type == "table" {
        datasource.data_location.clone()
    } else {
        format!("{input_path}{}", datasource.data_location)
    }
}

/// Executes data quality checks based on the provided configuration.
///
/// Loads the JSON config from blob storage, evaluates every datasource's
/// expectations against its data, and writes a results document per
/// datasource under the configured output path.
pub async fn data_quality_main(
    session: &EtlSession,
    config_path: &str,
    container_name: &str,
    options: DataQualityOptions,
) -> Result<()> {
    let raw_config = session
        .blob_storage_client
        .load_json_from_blob(container_name, config_path)
        .await?;
    let dq_conf = DataQualityConfig::from_json(raw_config)?;
    info!("Running data quality processing for dataset: {}...", dq_conf.dataset_name);

    let dq_input_path = match &options.test_data_path {
        Some(test_path) if options.test_flag => test_path.clone(),
        _ => dq_conf.dq_input_path.clone(),
    };
    let dq_output_path = substitute_env_vars(&dq_conf.dq_output_path);

    for datasource in &dq_conf.datasource_config {
        info!("Checking DQ for datasource: {}...", datasource.datasource_name);
        let data_location = resolve_data_location(datasource, &dq_input_path);
        let records = read_datasource(session, &data_location).await?;

        let results = execute_validations(&records, &datasource.validation_config)?;
        let failed_count = results.iter().filter(|result| !result.success).count();
        let run_time = Utc::now();

        let full_dq_output_path = if options.test_flag {
            let run_id = options.test_run_id.as_deref().unwrap_or(DEFAULT_TEST_RUN_ID);
            format!("{dq_output_path}automated_tests/{run_id}/{}_dq/", datasource.datasource_name)
        } else {
            format!("{dq_output_path}{}_dq/", datasource.datasource_name)
        };

        info!("DQ check completed for {}.", datasource.datasource_name);

        let report = ValidationReport {
            datasource_name: datasource.datasource_name.clone(),
            expectation_suite_name: datasource.expectation_suite_name.clone(),
            run_time: run_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            results,
        };
        publish_quality_results(session, &full_dq_output_path, &report).await?;

        if failed_count == 0 {
            info!("Checking {}, all validations passed.", datasource.datasource_name);
        } else {
            info!(
                "Checking {}, {failed_count} validations failed. See {full_dq_output_path} for details.",
                datasource.datasource_name
            );
        }
    }

    info!("Finished: data quality processing.");
    Ok(())
}

async fn publish_quality_results(
    session: &EtlSession,
    output_path: &str,
    report: &ValidationReport,
) -> Result<()> {
    let (container, path) = parse_abfss_url(output_path)?;
    let file_name = format!("dq_results_{}.json", report.run_time.replace(':', ""));
    let target_path = format!("{}/{file_name}", path.trim_end_matches('/'));
    let body = serde_json::to_vec_pretty(report)?;
    session.adls_client.upload_bytes(&container, &target_path, body).await
}
