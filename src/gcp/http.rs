//! HTTP utilities for GCP REST API calls

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// A non-success status returned by a GCP API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("API request failed: {status} {message}")]
pub struct ApiError {
    pub status: u16,
    /// `error.message` from the response body, or the status reason
    pub message: String,
}

impl ApiError {
    fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());

        Self {
            status: status.as_u16(),
            message: sanitize(&message, MAX_LOG_BODY_LENGTH),
        }
    }
}

/// Truncate and strip control characters
fn sanitize(body: &str, max_len: usize) -> String {
    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();

    if cleaned.len() > max_len {
        format!("{}... [truncated, {} bytes total]", &cleaned[..max_len], body.len())
    } else {
        cleaned
    }
}

/// HTTP client wrapper for GCP API calls
#[derive(Clone)]
pub struct GcpHttpClient {
    client: Client,
}

impl GcpHttpClient {
    /// Create a new HTTP client. No request timeout is set.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("gcloud-backup/{}", crate::VERSION))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize(&body, MAX_LOG_BODY_LENGTH));
            return Err(ApiError::from_response(status, &body).into());
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

/// Format a GCP API error for display
pub fn format_gcp_error(error: &anyhow::Error) -> String {
    let Some(api_error) = error.chain().find_map(|e| e.downcast_ref::<ApiError>()) else {
        return format!("{:#}", error);
    };

    let hint = match api_error.status {
        401 => "Authentication failed. Run 'gcloud auth login' for this account.",
        403 => "Permission denied. Check your GCP IAM permissions.",
        404 => "Resource not found. Check the project name.",
        429 => "Rate limit exceeded. Please try again later.",
        400 => "Invalid request. Check your parameters.",
        500..=599 => "GCP service temporarily unavailable. Please try again.",
        _ => "Request failed.",
    };

    format!("{:#} ({})", error, hint)
}
