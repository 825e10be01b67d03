//! Plugin Module
//!
//! Provides the plugin extension mechanism:
//! - Plugin interface and descriptors
//! - Plugin registry with dependency checks
//! - Version comparison

pub mod interface;
pub mod registry;
pub mod version;

pub use interface::{
    create_plugin, FnPlugin, Plugin, PluginDescriptor, PluginError, PluginOptions, PluginResult,
};
pub use registry::{InstalledPlugin, PluginRegistry};
pub use version::{compare_version, validate_version};
