//! Export pipeline
//!
//! Each resource kind has an [`Exporter`] registered under its name in a
//! [`Registry`]. The coordinator walks the requested names, runs the matching
//! exporters one after another and stores their [`Records`] in a [`Backup`].

pub mod backup;
pub mod coordinator;
pub mod exporters;
pub mod registry;

pub use backup::Backup;
pub use coordinator::run_export;
pub use registry::Registry;

use crate::gcp::client::GcpClient;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// A resource exactly as the API returned it
pub type ResourceRecord = Value;

/// Project (and region) an export runs against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTarget {
    pub project: String,
    /// Carried along for every exporter; none of the built-in ones use it
    pub region: Option<String>,
}

impl ExportTarget {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            region: None,
        }
    }
}

/// Records fetched by one exporter, tagged with the backup field they fill
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    Firewalls(Vec<ResourceRecord>),
    Routes(Vec<ResourceRecord>),
    Networks(Vec<ResourceRecord>),
    /// Addresses keyed by scope, e.g. `regions/us-central1` or `global`
    Addresses(BTreeMap<String, Vec<ResourceRecord>>),
}

impl Records {
    /// Number of records, across all scopes for addresses
    pub fn len(&self) -> usize {
        match self {
            Records::Firewalls(items) | Records::Routes(items) | Records::Networks(items) => {
                items.len()
            }
            Records::Addresses(scopes) => scopes.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetches every resource of one kind
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn fetch(&self, client: &GcpClient, target: &ExportTarget) -> Result<Records>;
}
