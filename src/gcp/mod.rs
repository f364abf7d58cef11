//! GCP API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - Access tokens from Google SDK accounts or Application Default Credentials
//! - [`client`] - Authenticated Compute Engine client
//! - [`http`] - HTTP utilities and API error type
//!
//! # Example
//!
//! ```ignore
//! use gcloud_backup::gcp::auth::CredentialSource;
//! use gcloud_backup::gcp::client::GcpClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let source = CredentialSource::for_account("ops@example.com");
//!     let client = GcpClient::new(source, "https://compute.googleapis.com/compute/v1").await?;
//!     let routes = client.get(&client.compute_global_url("my-project", "routes")).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
