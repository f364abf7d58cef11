//! Export Coordinator
//!
//! Runs the requested exporters strictly in order. An unknown service name is
//! reported and skipped; any fetch error ends the whole export.

use super::{Backup, ExportTarget, Registry};
use crate::gcp::client::GcpClient;
use anyhow::{Context, Result};

/// Build one backup from the requested service names
pub async fn run_export(
    registry: &Registry,
    client: &GcpClient,
    target: &ExportTarget,
    services: &[String],
) -> Result<Backup> {
    let mut backup = Backup::default();

    if let Some(region) = &target.region {
        tracing::debug!("Region {} given; exporters list project-wide resources", region);
    }

    for name in services {
        let Some(exporter) = registry.lookup(name) else {
            tracing::warn!(
                "Error: invalid service - {} (known services: {})",
                name,
                registry.names().join(", ")
            );
            continue;
        };

        tracing::info!("Exporting {} from project {}", name, target.project);

        let records = exporter
            .fetch(client, target)
            .await
            .with_context(|| format!("Failed to export {}", name))?;

        tracing::info!("Exported {} {}", records.len(), name);
        backup.store(records);
    }

    Ok(backup)
}
