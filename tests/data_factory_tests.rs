use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use stacks_data::config::DataFactorySettings;
use stacks_data::{DataFactoryClient, StacksError, StaticTokenProvider};

fn settings() -> DataFactorySettings {
    DataFactorySettings {
        subscription_id: "sub-id".to_string(),
        resource_group_name: "test-rg".to_string(),
        data_factory_name: "test-adf".to_string(),
    }
}

fn client(server: &MockServer) -> DataFactoryClient {
    DataFactoryClient::with_endpoint(
        settings(),
        server.base_url(),
        Arc::new(StaticTokenProvider::new("test-token")),
    )
}

const FACTORY_PATH: &str =
    "/subscriptions/sub-id/resourceGroups/test-rg/providers/Microsoft.DataFactory/factories/test-adf";

#[tokio::test]
async fn test_create_pipeline_run() {
    let server = MockServer::start();
    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path(format!("{FACTORY_PATH}/pipelines/ingest_movies/createRun"))
            .query_param("api-version", "2018-06-01")
            .json_body(json!({"window_start": "2023-01-01"}));
        then.status(200).json_body(json!({"runId": "run-123"}));
    });

    let run_id = client(&server)
        .create_pipeline_run("ingest_movies", &json!({"window_start": "2023-01-01"}))
        .await
        .unwrap();

    create_mock.assert();
    assert_eq!(run_id, "run-123");
}

#[tokio::test]
async fn test_get_pipeline_run() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(format!("{FACTORY_PATH}/pipelineruns/run-123"));
        then.status(200)
            .json_body(json!({"runId": "run-123", "status": "InProgress"}));
    });

    let run = client(&server).get_pipeline_run("run-123").await.unwrap();
    assert_eq!(run.run_id, "run-123");
    assert_eq!(run.status, "InProgress");
    assert!(!run.is_complete());
}

#[tokio::test]
async fn test_pipeline_run_complete_states() {
    for (status, expected) in [("Succeeded", true), ("Failed", true), ("Queued", false)] {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(format!("{FACTORY_PATH}/pipelineruns/run-123"));
            then.status(200)
                .json_body(json!({"runId": "run-123", "status": status}));
        });

        let complete = client(&server).pipeline_run_complete("run-123").await.unwrap();
        assert_eq!(complete, expected, "status {status}");
    }
}

#[tokio::test]
async fn test_wait_for_pipeline_run_success() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(format!("{FACTORY_PATH}/pipelineruns/run-123"));
        then.status(200)
            .json_body(json!({"runId": "run-123", "status": "Succeeded"}));
    });

    let run = client(&server)
        .wait_for_pipeline_run("run-123", Duration::from_millis(10), Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(run.status, "Succeeded");
}

#[tokio::test]
async fn test_wait_for_pipeline_run_timeout() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(format!("{FACTORY_PATH}/pipelineruns/run-123"));
        then.status(200)
            .json_body(json!({"runId": "run-123", "status": "InProgress"}));
    });

    let result = client(&server)
        .wait_for_pipeline_run("run-123", Duration::from_millis(10), Duration::from_millis(50))
        .await;

    match result {
        Err(StacksError::PipelineTimeout { run_id, status, .. }) => {
            assert_eq!(run_id, "run-123");
            assert_eq!(status, "InProgress");
        }
        other => panic!("expected PipelineTimeout, got {other:?}"),
    }
}
