//! Exporter Registry
//!
//! Maps service names given on the command line to exporters.

use super::exporters::{AddressesExporter, GlobalListExporter};
use super::Exporter;
use std::collections::HashMap;

pub const FIREWALLS: &str = "firewalls";
pub const ROUTES: &str = "routes";
pub const NETWORKS: &str = "networks";
pub const ADDRESSES: &str = "addresses";

/// Name -> exporter lookup table
#[derive(Default)]
pub struct Registry {
    exporters: HashMap<String, Box<dyn Exporter>>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in exporters
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(FIREWALLS, GlobalListExporter::firewalls());
        registry.register(ROUTES, GlobalListExporter::routes());
        registry.register(NETWORKS, GlobalListExporter::networks());
        registry.register(ADDRESSES, AddressesExporter);
        registry
    }

    /// Add an exporter, replacing any previous one under the same name
    pub fn register(&mut self, name: &str, exporter: impl Exporter + 'static) {
        self.exporters.insert(name.to_string(), Box::new(exporter));
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Exporter> {
        self.exporters.get(name).map(|e| e.as_ref())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.exporters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
