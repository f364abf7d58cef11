//! GCP Client
//!
//! The authenticated handle threaded through every exporter: credentials,
//! HTTP client and the Compute endpoint they talk to.

use super::auth::{CredentialSource, GcpCredentials};
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    /// Compute API root, without trailing slash
    pub compute_endpoint: String,
}

impl GcpClient {
    /// Create a new client and obtain a first access token, so credential
    /// problems surface before any resource is requested.
    pub async fn new(source: CredentialSource, compute_endpoint: &str) -> Result<Self> {
        tracing::info!("Creating new client from Google SDK config");

        let credentials = GcpCredentials::new(source)
            .await
            .context("Failed to initialize GCP credentials")?;
        let client = Self::with_credentials(credentials, compute_endpoint)?;

        client
            .get_token()
            .await
            .context("Failed to obtain an access token")?;

        Ok(client)
    }

    /// Create a client from existing credentials
    pub fn with_credentials(credentials: GcpCredentials, compute_endpoint: &str) -> Result<Self> {
        Ok(Self {
            credentials,
            http: GcpHttpClient::new()?,
            compute_endpoint: compute_endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    // =========================================================================
    // Compute Engine API helpers
    // =========================================================================

    /// Build Compute Engine API URL
    pub fn compute_url(&self, project: &str, path: &str) -> String {
        format!(
            "{}/projects/{}/{}",
            self.compute_endpoint,
            urlencoding::encode(project),
            path
        )
    }

    /// Build global Compute Engine API URL
    pub fn compute_global_url(&self, project: &str, resource: &str) -> String {
        self.compute_url(project, &format!("global/{}", resource))
    }

    /// Build aggregated Compute Engine API URL (all zones and regions)
    pub fn compute_aggregated_url(&self, project: &str, resource: &str) -> String {
        self.compute_url(project, &format!("aggregated/{}", resource))
    }
}
