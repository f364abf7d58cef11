//! Run Configuration
//!
//! The validated result of command-line parsing, plus the gcloud environment
//! overrides that shape how the client is built.

use crate::export::ExportTarget;
use crate::gcp::auth::CredentialSource;
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use tracing::Level;
use url::Url;

/// Default Compute Engine REST endpoint
pub const DEFAULT_COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";

/// gcloud property override for the Compute endpoint
pub const COMPUTE_ENDPOINT_ENV: &str = "CLOUDSDK_API_ENDPOINT_OVERRIDES_COMPUTE";

/// gcloud property pointing at a file holding a raw access token
pub const ACCESS_TOKEN_FILE_ENV: &str = "CLOUDSDK_AUTH_ACCESS_TOKEN_FILE";

/// Requested action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Export,
    Import,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Configuration for one run, produced by [`crate::cli::parse_from`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub action: Action,
    /// Requested resource kinds, in the order given
    pub services: Vec<String>,
    /// Google SDK account whose stored credentials are used
    pub account: String,
    pub project: String,
    /// Accepted for compatibility; no exporter reads it
    pub region: Option<String>,
    /// Indented JSON output
    pub readable: bool,
    pub log_level: LogLevel,
}

impl Config {
    /// Project and region handed to every exporter
    pub fn target(&self) -> ExportTarget {
        ExportTarget {
            project: self.project.clone(),
            region: self.region.clone(),
        }
    }

    /// Resolve where the access token comes from.
    ///
    /// An access token file set through the gcloud environment takes
    /// precedence over the account flag.
    pub fn credential_source(&self) -> Result<CredentialSource> {
        if let Some(path) = std::env::var_os(ACCESS_TOKEN_FILE_ENV) {
            let path = PathBuf::from(path);
            tracing::info!("Using access token from {:?}", path);
            return CredentialSource::from_token_file(&path);
        }

        Ok(CredentialSource::for_account(&self.account))
    }
}

/// Compute endpoint, honouring the gcloud endpoint override
pub fn compute_endpoint() -> Result<String> {
    match std::env::var(COMPUTE_ENDPOINT_ENV) {
        Ok(value) if !value.trim().is_empty() => normalize_endpoint(&value),
        _ => Ok(DEFAULT_COMPUTE_ENDPOINT.to_string()),
    }
}

/// Validate an endpoint and strip its trailing slash
pub fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim();
    Url::parse(endpoint).with_context(|| format!("Invalid Compute endpoint: {}", endpoint))?;
    Ok(endpoint.trim_end_matches('/').to_string())
}
