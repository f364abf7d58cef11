//! gcloud-backup
//!
//! Exports Google Compute Engine network resources (firewalls, routes,
//! networks, addresses) of one project into a single JSON document.
//!
//! # Module Structure
//!
//! - [`cli`] - Go-style flag parsing and validation
//! - [`config`] - Validated run configuration and environment overrides
//! - [`gcp`] - Authentication and the Compute REST client
//! - [`export`] - Exporters, registry, coordinator and the backup document

pub mod cli;
pub mod config;
pub mod export;
pub mod gcp;

/// Version injected at compile time via GCLOUD_BACKUP_VERSION env var (set by CI/CD),
/// or the package version for local builds.
pub const VERSION: &str = match option_env!("GCLOUD_BACKUP_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
