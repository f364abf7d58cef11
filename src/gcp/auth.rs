//! GCP Authentication
//!
//! Resolves an access token from the Google Cloud SDK's stored account
//! credentials, from Application Default Credentials, or from a raw token.

use anyhow::{bail, Context, Result};
use gcp_auth::TokenProvider;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::RwLock;

/// Read-only access is all an export needs
pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/compute.readonly"];

/// Account name selecting Application Default Credentials instead of an SDK account
pub const APPLICATION_DEFAULT_ACCOUNT: &str = "application-default";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Where access tokens come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Credentials stored by `gcloud auth login` for the named account
    SdkAccount(String),
    /// Application Default Credentials
    ApplicationDefault,
    /// A bearer token supplied as-is
    AccessToken(String),
}

impl CredentialSource {
    /// Map the `-account` flag to a credential source
    pub fn for_account(account: &str) -> Self {
        if account == APPLICATION_DEFAULT_ACCOUNT {
            Self::ApplicationDefault
        } else {
            Self::SdkAccount(account.to_string())
        }
    }

    /// Load a raw access token from a file
    pub fn from_token_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read access token file {}", path.display()))?;
        let token = content.trim();
        if token.is_empty() {
            bail!("Access token file {} is empty", path.display());
        }
        Ok(Self::AccessToken(token.to_string()))
    }
}

#[derive(Clone)]
enum TokenBackend {
    Provider(Arc<dyn TokenProvider>),
    Gcloud { account: String },
    Static(String),
}

/// GCP credentials holder with token caching
#[derive(Clone)]
pub struct GcpCredentials {
    backend: TokenBackend,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl GcpCredentials {
    /// Create credentials for the given source
    pub async fn new(source: CredentialSource) -> Result<Self> {
        let backend = match source {
            CredentialSource::SdkAccount(account) => {
                let config_dir = ensure_sdk_config()?;
                tracing::debug!("Using Google SDK configuration at {:?}", config_dir);
                TokenBackend::Gcloud { account }
            }
            CredentialSource::ApplicationDefault => {
                let provider = gcp_auth::provider().await.context(
                    "Failed to initialize GCP authentication. Run 'gcloud auth application-default login'",
                )?;
                TokenBackend::Provider(provider)
            }
            CredentialSource::AccessToken(token) => TokenBackend::Static(token),
        };

        Ok(Self::with_backend(backend))
    }

    /// Credentials that always hand out the same bearer token
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self::with_backend(TokenBackend::Static(token.into()))
    }

    fn with_backend(backend: TokenBackend) -> Self {
        Self {
            backend,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String> {
        if let TokenBackend::Static(token) = &self.backend {
            return Ok(token.clone());
        }

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let token = self.fetch_token().await?;
        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            (DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token)
    }

    async fn fetch_token(&self) -> Result<String> {
        match &self.backend {
            TokenBackend::Provider(provider) => {
                let token = provider
                    .token(DEFAULT_SCOPES)
                    .await
                    .context("Failed to get access token")?;
                Ok(token.as_str().to_string())
            }
            TokenBackend::Gcloud { account } => gcloud_access_token(account).await,
            TokenBackend::Static(token) => Ok(token.clone()),
        }
    }
}

/// Ask the Google Cloud SDK for a token belonging to `account`
async fn gcloud_access_token(account: &str) -> Result<String> {
    tracing::debug!("Requesting access token from gcloud for {}", account);

    let output = Command::new("gcloud")
        .arg("auth")
        .arg("print-access-token")
        .arg(format!("--account={}", account))
        .arg("--verbosity=error")
        .stdin(Stdio::null())
        .output()
        .await
        .context("Failed to run gcloud. Is the Google Cloud SDK installed and on PATH?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "Google SDK has no usable credentials for account {}: {}",
            account,
            stderr.trim()
        );
    }

    let token = String::from_utf8(output.stdout).context("gcloud returned a non UTF-8 token")?;
    let token = token.trim();
    if token.is_empty() {
        bail!("gcloud returned an empty access token for account {}", account);
    }

    Ok(token.to_string())
}

/// Get the gcloud configuration directory
pub fn get_gcloud_config_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|p| p.join("gcloud"))
}

fn ensure_sdk_config() -> Result<PathBuf> {
    let dir = get_gcloud_config_dir()
        .context("Could not determine the Google SDK configuration directory")?;
    if !dir.is_dir() {
        bail!(
            "Google SDK configuration not found at {}. Run 'gcloud auth login'",
            dir.display()
        );
    }
    Ok(dir)
}
