//! Built-in exporters
//!
//! Firewalls, routes and networks are global resources listed with one call
//! each. Addresses live in regions (and `global`), so they come from the
//! aggregated list endpoint and are kept grouped by scope.

use super::{ExportTarget, Exporter, Records, ResourceRecord};
use crate::gcp::client::GcpClient;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// Lists one global Compute resource collection
pub struct GlobalListExporter {
    /// Collection name in the API path
    resource: &'static str,
    wrap: fn(Vec<ResourceRecord>) -> Records,
}

impl GlobalListExporter {
    pub fn firewalls() -> Self {
        Self {
            resource: "firewalls",
            wrap: Records::Firewalls,
        }
    }

    pub fn routes() -> Self {
        Self {
            resource: "routes",
            wrap: Records::Routes,
        }
    }

    pub fn networks() -> Self {
        Self {
            resource: "networks",
            wrap: Records::Networks,
        }
    }
}

#[async_trait]
impl Exporter for GlobalListExporter {
    async fn fetch(&self, client: &GcpClient, target: &ExportTarget) -> Result<Records> {
        let url = client.compute_global_url(&target.project, self.resource);
        let response = client.get(&url).await?;
        warn_if_truncated(&response, self.resource);

        Ok((self.wrap)(collect_items(&response)))
    }
}

/// Lists addresses across every region via the aggregated endpoint
pub struct AddressesExporter;

#[async_trait]
impl Exporter for AddressesExporter {
    async fn fetch(&self, client: &GcpClient, target: &ExportTarget) -> Result<Records> {
        let url = client.compute_aggregated_url(&target.project, "addresses");
        let response = client.get(&url).await?;
        warn_if_truncated(&response, "addresses");

        Ok(Records::Addresses(collect_aggregated(&response, "addresses")))
    }
}

/// The `items` array of a list response; missing means no resources
pub fn collect_items(response: &Value) -> Vec<ResourceRecord> {
    response
        .get("items")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

/// Group an aggregated list response by scope, dropping scopes without records.
///
/// Aggregated responses look like
/// `{ "items": { "regions/us-central1": { "addresses": [...] }, "regions/asia-east1": { "warning": {...} } } }`
pub fn collect_aggregated(response: &Value, field: &str) -> BTreeMap<String, Vec<ResourceRecord>> {
    let Some(scopes) = response.get("items").and_then(|v| v.as_object()) else {
        return BTreeMap::new();
    };

    scopes
        .iter()
        .filter_map(|(scope, data)| {
            let records = data.get(field).and_then(|v| v.as_array())?;
            if records.is_empty() {
                return None;
            }
            Some((scope.clone(), records.clone()))
        })
        .collect()
}

/// Only the first page is exported
fn warn_if_truncated(response: &Value, resource: &str) {
    if response.get("nextPageToken").and_then(|v| v.as_str()).is_some() {
        tracing::warn!(
            "More {} exist than a single page holds; only the first page was exported",
            resource
        );
    }
}
