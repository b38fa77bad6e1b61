use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;

use stacks_data::etl::read_csv_records;
use stacks_data::utils::get_latest_package_version_from;
use stacks_data::{AdlsClient, BlobStorageClient, EtlSession, StacksError, StaticTokenProvider};

fn session(server: &MockServer) -> EtlSession {
    let token_provider = Arc::new(StaticTokenProvider::new("test-token"));
    EtlSession::new(
        AdlsClient::with_endpoint("teststorage", server.base_url(), token_provider.clone()),
        BlobStorageClient::with_endpoint(server.base_url(), token_provider),
    )
}

#[tokio::test]
async fn test_read_latest_rundate_data() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/raw")
            .query_param("directory", "movies")
            .query_param("recursive", "false");
        then.status(200).json_body(json!({
            "paths": [
                {"name": "movies/rundate=2023-04-01T12:00:00", "isDirectory": "true"},
                {"name": "movies/rundate=2023-08-15T09:30:00", "isDirectory": "true"}
            ]
        }));
    });
    let latest_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/raw")
            .query_param("directory", "movies/rundate=2023-08-15T09:30:00")
            .query_param("recursive", "true");
        then.status(200).json_body(json!({
            "paths": [
                {"name": "movies/rundate=2023-08-15T09:30:00/part-0001.csv"},
                {"name": "movies/rundate=2023-08-15T09:30:00/_SUCCESS"}
            ]
        }));
    });
    let download_mock = server.mock(|when, then| {
        when.method(GET).path("/raw/movies/rundate=2023-08-15T09:30:00/part-0001.csv");
        then.status(200).body(
            "id,name,meta_ingestion_datetime,meta_ingestion_pipeline,meta_ingestion_run_id\n\
             1,alpha,2023-08-15,ingest_movies,run-1\n\
             2,beta,2023-08-15,ingest_movies,run-1\n",
        );
    });

    let records = session(&server).read_latest_rundate_data("raw", "movies").await.unwrap();

    latest_mock.assert();
    download_mock.assert();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "alpha");
    // Ingestion metadata columns are stripped from the result.
    assert_eq!(records[0].len(), 2);
}

#[tokio::test]
async fn test_read_latest_rundate_data_no_directories() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/raw");
        then.status(200).json_body(json!({"paths": []}));
    });

    let result = session(&server).read_latest_rundate_data("raw", "movies").await;
    assert!(matches!(result, Err(StacksError::NoRundateDirectories { .. })));
}

#[test]
fn test_read_csv_records_empty_file() {
    let records = read_csv_records(b"id,name\n").unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_get_latest_package_version() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/pypi/stacks-data/json");
        then.status(200)
            .json_body(json!({"info": {"name": "stacks-data", "version": "2.0.2"}}));
    });

    let index_url = format!("{}/pypi", server.base_url());
    let version = get_latest_package_version_from(&index_url, "stacks-data").await.unwrap();
    assert_eq!(version, "2.0.2");
}

#[tokio::test]
async fn test_get_latest_package_version_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/pypi/missing-package/json");
        then.status(404);
    });

    let index_url = format!("{}/pypi", server.base_url());
    assert!(get_latest_package_version_from(&index_url, "missing-package").await.is_err());
}
