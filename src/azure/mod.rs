pub mod adls;
pub mod auth;
pub mod blob;
pub mod data_factory;
pub mod datalake;

use crate::utils::error::StacksError;

/// Converts a non-success response into an error carrying the status and body.
pub(crate) async fn unexpected_response(endpoint: &str, response: reqwest::Response) -> StacksError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    StacksError::AzureError {
        endpoint: endpoint.to_string(),
        status,
        message,
    }
}
