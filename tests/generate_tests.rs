use std::path::Path;

use tempfile::TempDir;

use stacks_data::generate::{
    generate_pipeline, render_template_components, IngestWorkloadConfig, ProcessingWorkloadConfig,
    StaticAnswer,
};

const INGEST_EXPECTED_FILES: [&str; 5] = [
    "config/ingest_sources/ingest_config.json",
    "config/schema/ingest_config_schema.json",
    "data_factory/pipelines/arm_template.json",
    "de-ingest-ado-pipeline.yml",
    "README.md",
];

const INGEST_DQ_FILES: [&str; 1] = ["config/data_quality/data_quality_config.json"];

const PROCESS_EXPECTED_FILES: [&str; 3] = [
    "data_factory/pipelines/arm_template.json",
    "de-process-ado-pipeline.yml",
    "README.md",
];

fn ingest_config(description: &str) -> IngestWorkloadConfig {
    serde_yaml::from_str(&format!(
        r#"
dataset_name: test_dataset
pipeline_description: {description}
data_source_type: azure_sql
key_vault_linked_service_name: test_keyvault
data_source_password_key_vault_secret_name: test_password
data_source_connection_string_variable_name: test_connection_string
ado_variable_groups_nonprod:
  - nonprod_test_group
ado_variable_groups_prod:
  - prod_group
bronze_container: test_raw
"#
    ))
    .unwrap()
}

fn processing_config() -> ProcessingWorkloadConfig {
    serde_yaml::from_str(
        r#"
pipeline_name: test_processing
pipeline_description: Processing pipeline for testing
ado_variable_groups_nonprod:
  - nonprod_test_group
ado_variable_groups_prod:
  - prod_group
"#,
    )
    .unwrap()
}

fn templates_dir(workload_type: &str, folder: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("templates")
        .join(workload_type)
        .join(folder)
}

fn arm_template_json(target: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(target.join("data_factory/pipelines/arm_template.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_render_template_components() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("test_render");

    render_template_components(
        &ingest_config("Pipeline for testing"),
        &templates_dir("ingest", "ingest_source"),
        &target,
    )
    .unwrap();

    for file_path in INGEST_EXPECTED_FILES {
        assert!(target.join(file_path).exists(), "missing {file_path}");
    }

    // Rendered values come through, template extensions are stripped.
    let arm_template = arm_template_json(&target);
    assert_eq!(
        arm_template["resources"][0]["properties"]["description"],
        "Pipeline for testing"
    );
    assert!(!target.join("data_factory/pipelines/arm_template.json.hbs").exists());
}

#[test]
fn test_render_enum_activity_name() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("test_enum");

    render_template_components(
        &ingest_config("Pipeline for testing"),
        &templates_dir("ingest", "ingest_source"),
        &target,
    )
    .unwrap();

    let arm_template = arm_template_json(&target);
    assert_eq!(
        arm_template["resources"][0]["properties"]["activities"][1]["typeProperties"]["activities"][0]
            ["name"],
        "AZURE_SQL_to_ADLS"
    );
}

#[test]
fn test_render_processing_templates() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("test_processing");

    render_template_components(
        &processing_config(),
        &templates_dir("processing", "processing_template"),
        &target,
    )
    .unwrap();

    for file_path in PROCESS_EXPECTED_FILES {
        assert!(target.join(file_path).exists(), "missing {file_path}");
    }
}

#[test]
fn test_generate_pipeline_flows() {
    // generate_pipeline resolves targets relative to the working directory,
    // so the scenarios share one cwd change and run sequentially.
    let temp_dir = TempDir::new().unwrap();
    std::env::set_current_dir(temp_dir.path()).unwrap();

    // Fresh generation, without and with data quality components.
    let target = generate_pipeline(&ingest_config("Pipeline for testing"), false, &StaticAnswer(true)).unwrap();
    assert_eq!(target, Path::new("de_workloads/ingest/test_dataset"));
    for file_path in INGEST_EXPECTED_FILES {
        assert!(target.join(file_path).exists(), "missing {file_path}");
    }
    for file_path in INGEST_DQ_FILES {
        assert!(!target.join(file_path).exists(), "unexpected {file_path}");
    }

    let target = generate_pipeline(&ingest_config("Pipeline for testing"), true, &StaticAnswer(true)).unwrap();
    for file_path in INGEST_EXPECTED_FILES.iter().chain(INGEST_DQ_FILES.iter()) {
        assert!(target.join(file_path).exists(), "missing {file_path}");
    }

    // Declined overwrite leaves the existing files untouched.
    let target = generate_pipeline(
        &ingest_config("Pipeline for testing overwritten"),
        false,
        &StaticAnswer(false),
    )
    .unwrap();
    let arm_template = arm_template_json(&target);
    assert_eq!(
        arm_template["resources"][0]["properties"]["description"],
        "Pipeline for testing"
    );

    // Confirmed overwrite re-renders with the new config.
    let target = generate_pipeline(
        &ingest_config("Pipeline for testing overwritten"),
        false,
        &StaticAnswer(true),
    )
    .unwrap();
    let arm_template = arm_template_json(&target);
    assert_eq!(
        arm_template["resources"][0]["properties"]["description"],
        "Pipeline for testing overwritten"
    );

    // Processing workloads land under their own type directory.
    let target = generate_pipeline(&processing_config(), false, &StaticAnswer(true)).unwrap();
    assert_eq!(target, Path::new("de_workloads/processing/test_processing"));
    for file_path in PROCESS_EXPECTED_FILES {
        assert!(target.join(file_path).exists(), "missing {file_path}");
    }
}
