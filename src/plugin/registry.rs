//! Plugin registry for a single bus.
//!
//! Gates installation on dependency versions and records what was
//! installed. There is no unregister: a name, once recorded, stays.

use crate::bus::Bus;
use crate::core::{now, Error, Result, Timestamp};
use crate::plugin::interface::{Plugin, PluginDescriptor, PluginOptions};
use crate::plugin::version::compare_version;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Installed plugin entry.
#[derive(Clone, Debug, PartialEq)]
pub struct InstalledPlugin {
    /// Plugin descriptor
    pub descriptor: PluginDescriptor,
    /// Installation time
    pub installed_at: Timestamp,
}

/// Plugin registry.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    /// Installed plugins by name
    plugins: RwLock<HashMap<String, InstalledPlugin>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `descriptor` could be installed right now.
    pub fn check(&self, descriptor: &PluginDescriptor) -> Result<()> {
        let plugins = self.plugins.read().unwrap_or_else(PoisonError::into_inner);

        if plugins.contains_key(descriptor.name()) {
            return Err(Error::DuplicatePlugin(descriptor.name().to_string()));
        }

        for (dependency, required) in descriptor.dependencies() {
            let installed = plugins.get(dependency).ok_or_else(|| Error::MissingDependency {
                plugin: descriptor.name().to_string(),
                dependency: dependency.clone(),
            })?;

            let installed_version = installed.descriptor.version();
            if compare_version(required, installed_version) == Ordering::Greater {
                return Err(Error::UnmetVersion {
                    plugin: descriptor.name().to_string(),
                    dependency: dependency.clone(),
                    required: required.clone(),
                    installed: installed_version.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Validate, run the plugin body against `bus`, then record it.
    ///
    /// Listeners added by a body that fails are left in place.
    pub fn install(&self, bus: &Bus, plugin: &dyn Plugin, options: &PluginOptions) -> Result<()> {
        let descriptor = plugin.descriptor();
        if let Err(e) = self.check(descriptor) {
            tracing::warn!(plugin = descriptor.name(), error = %e, "plugin rejected");
            return Err(e);
        }

        // No lock held here: the body may install other plugins.
        plugin.install(bus, options).map_err(|source| {
            tracing::warn!(plugin = descriptor.name(), error = %source, "plugin body failed");
            Error::PluginFailed {
                plugin: descriptor.name().to_string(),
                source,
            }
        })?;

        let mut plugins = self.plugins.write().unwrap_or_else(PoisonError::into_inner);
        if plugins.contains_key(descriptor.name()) {
            // The body installed a plugin under its own name.
            return Err(Error::DuplicatePlugin(descriptor.name().to_string()));
        }
        plugins.insert(
            descriptor.name().to_string(),
            InstalledPlugin {
                descriptor: descriptor.clone(),
                installed_at: now(),
            },
        );

        tracing::info!(plugin = descriptor.name(), version = descriptor.version(), "plugin installed");
        Ok(())
    }

    /// Whether a plugin name is recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Get an installed plugin by name.
    pub fn get(&self, name: &str) -> Option<InstalledPlugin> {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// List installed plugins, sorted by name.
    pub fn list(&self) -> Vec<InstalledPlugin> {
        let mut installed: Vec<InstalledPlugin> = self
            .plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        installed.sort_by(|a, b| a.descriptor.name().cmp(b.descriptor.name()));
        installed
    }

    /// Get plugin count.
    pub fn len(&self) -> usize {
        self.plugins.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
