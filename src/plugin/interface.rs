//! Plugin interface definition.
//!
//! Defines the descriptor every plugin carries and the trait the bus
//! installs through.

use crate::bus::Bus;
use crate::core::{Error, Result};
use crate::plugin::version::validate_version;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Plugin name, version and dependency requirements.
///
/// Versions are validated on construction and the descriptor cannot be
/// changed afterwards except through the consuming builders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DescriptorManifest")]
pub struct PluginDescriptor {
    name: String,
    version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    dependencies: BTreeMap<String, String>,
}

/// Unvalidated wire shape of a descriptor.
#[derive(Deserialize)]
struct DescriptorManifest {
    name: String,
    version: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

impl TryFrom<DescriptorManifest> for PluginDescriptor {
    type Error = Error;

    fn try_from(manifest: DescriptorManifest) -> Result<Self> {
        let mut descriptor = PluginDescriptor::new(&manifest.name, &manifest.version)?
            .with_description(&manifest.description);
        for (dependency, min_version) in &manifest.dependencies {
            descriptor = descriptor.with_dependency(dependency, min_version)?;
        }
        Ok(descriptor)
    }
}

impl PluginDescriptor {
    /// Create a descriptor with no dependencies.
    pub fn new(name: &str, version: &str) -> Result<Self> {
        validate_version(version)?;
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            description: String::new(),
            dependencies: BTreeMap::new(),
        })
    }

    /// Require `dependency` at `min_version` or newer.
    pub fn with_dependency(mut self, dependency: &str, min_version: &str) -> Result<Self> {
        validate_version(min_version)?;
        self.dependencies
            .insert(dependency.to_string(), min_version.to_string());
        Ok(self)
    }

    /// Set description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    /// Parse and validate a JSON manifest.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Unique plugin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted-decimal version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Dependency name to minimum version.
    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        &self.dependencies
    }
}

/// Options handed to a plugin body at install time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginOptions {
    /// Raw option values
    pub values: HashMap<String, serde_json::Value>,
}

impl PluginOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a typed option.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set an option value.
    pub fn set(&mut self, key: &str, value: serde_json::Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Builder form of [`PluginOptions::set`].
    pub fn with(mut self, key: &str, value: serde_json::Value) -> Self {
        self.set(key, value);
        self
    }
}

/// Result type for plugin bodies.
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Plugin-specific error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginError {
    /// Error message
    pub message: String,
}

impl PluginError {
    /// Create a new error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PluginError: {}", self.message)
    }
}

impl std::error::Error for PluginError {}

/// Installable extension unit.
pub trait Plugin: Send + Sync {
    /// Name, version and dependencies.
    fn descriptor(&self) -> &PluginDescriptor;

    /// Side effects to perform when installed, typically registering
    /// listeners on `bus`.
    fn install(&self, bus: &Bus, options: &PluginOptions) -> PluginResult<()>;
}

type PluginBody = Box<dyn Fn(&Bus, &PluginOptions) -> PluginResult<()> + Send + Sync>;

/// A plugin whose body is a closure. Built by [`create_plugin`].
pub struct FnPlugin {
    descriptor: PluginDescriptor,
    body: PluginBody,
}

impl Plugin for FnPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn install(&self, bus: &Bus, options: &PluginOptions) -> PluginResult<()> {
        (self.body)(bus, options)
    }
}

impl std::fmt::Debug for FnPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPlugin")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Build a plugin from a name, version, dependency list and body.
pub fn create_plugin<I, K, V, F>(name: &str, version: &str, dependencies: I, body: F) -> Result<FnPlugin>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
    F: Fn(&Bus, &PluginOptions) -> PluginResult<()> + Send + Sync + 'static,
{
    let mut descriptor = PluginDescriptor::new(name, version)?;
    for (dependency, min_version) in dependencies {
        descriptor = descriptor.with_dependency(dependency.as_ref(), min_version.as_ref())?;
    }
    Ok(FnPlugin {
        descriptor,
        body: Box::new(body),
    })
}
