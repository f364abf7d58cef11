//! Backup document
//!
//! One [`Backup`] is built per run. A field is only serialized when its
//! resource kind was requested and returned at least one record.

use super::{Records, ResourceRecord};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The aggregate written to stdout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    #[serde(default, skip_serializing_if = "is_absent")]
    pub firewalls: Option<Vec<ResourceRecord>>,
    #[serde(default, skip_serializing_if = "is_absent")]
    pub routes: Option<Vec<ResourceRecord>>,
    #[serde(default, skip_serializing_if = "is_absent")]
    pub networks: Option<Vec<ResourceRecord>>,
    #[serde(default, skip_serializing_if = "is_absent_map")]
    pub addresses: Option<BTreeMap<String, Vec<ResourceRecord>>>,
}

fn is_absent<T>(field: &Option<Vec<T>>) -> bool {
    field.as_ref().map_or(true, Vec::is_empty)
}

fn is_absent_map<K, V>(field: &Option<BTreeMap<K, V>>) -> bool {
    field.as_ref().map_or(true, BTreeMap::is_empty)
}

impl Backup {
    /// Put records into their field, replacing whatever was there
    pub fn store(&mut self, records: Records) {
        match records {
            Records::Firewalls(items) => self.firewalls = Some(items),
            Records::Routes(items) => self.routes = Some(items),
            Records::Networks(items) => self.networks = Some(items),
            Records::Addresses(scopes) => self.addresses = Some(scopes),
        }
    }

    /// Names of the fields that have been stored, in document order
    pub fn populated(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.firewalls.is_some() {
            names.push("firewalls");
        }
        if self.routes.is_some() {
            names.push("routes");
        }
        if self.networks.is_some() {
            names.push("networks");
        }
        if self.addresses.is_some() {
            names.push("addresses");
        }
        names
    }

    /// Render as JSON: two-space indented when `readable`, compact otherwise.
    /// No trailing newline.
    pub fn to_json(&self, readable: bool) -> Result<Vec<u8>> {
        let bytes = if readable {
            serde_json::to_vec_pretty(self)
        } else {
            serde_json::to_vec(self)
        };
        bytes.context("Failed to serialize backup")
    }
}
