use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::AzureCredentials;
use crate::utils::error::{Result, StacksError};

pub const STORAGE_SCOPE: &str = "https://storage.azure.com/.default";
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
pub const FABRIC_SCOPE: &str = "https://api.fabric.microsoft.com/.default";

const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Seam for bearer-token acquisition, so client tests can inject a fixed token
/// instead of talking to the identity endpoint.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self, scope: &str) -> Result<String>;

    /// Drops any cached tokens. No-op for providers without a cache.
    async fn invalidate(&self) {}
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client-credential OAuth2 flow against the Microsoft identity platform,
/// caching one token per scope.
pub struct ClientSecretCredential {
    credentials: AzureCredentials,
    authority: String,
    http: reqwest::Client,
    cache: Mutex<HashMap<String, String>>,
}

impl ClientSecretCredential {
    pub fn new(credentials: AzureCredentials) -> Self {
        Self::with_authority(credentials, DEFAULT_AUTHORITY)
    }

    pub fn with_authority(credentials: AzureCredentials, authority: &str) -> Self {
        Self {
            credentials,
            authority: authority.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority, self.credentials.tenant_id
        )
    }
}

#[async_trait]
impl TokenProvider for ClientSecretCredential {
    async fn token(&self, scope: &str) -> Result<String> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.get(scope) {
            return Ok(token.clone());
        }

        let url = self.token_url();
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("scope", scope),
        ];

        let response = self.http.post(&url).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StacksError::AzureError {
                endpoint: url,
                status,
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        cache.insert(scope.to_string(), token.access_token.clone());
        Ok(token.access_token)
    }

    async fn invalidate(&self) {
        self.cache.lock().await.clear();
    }
}

/// Fixed-token provider for tests.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self, _scope: &str) -> Result<String> {
        Ok(self.token.clone())
    }
}
