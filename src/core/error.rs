//! Error types for plugbus.

use crate::core::ListenerId;
use thiserror::Error;

/// Result type alias for plugbus operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in plugbus operations.
#[derive(Error, Debug)]
pub enum Error {
    // Plugin errors
    #[error("Plugin {0} is already installed")]
    DuplicatePlugin(String),

    #[error("Plugin {plugin} requires {dependency}, which is not installed")]
    MissingDependency { plugin: String, dependency: String },

    #[error("Plugin {plugin} requires {dependency} >= {required}, found {installed}")]
    UnmetVersion {
        plugin: String,
        dependency: String,
        required: String,
        installed: String,
    },

    #[error("Invalid version string: {0:?}")]
    InvalidVersion(String),

    #[error("Plugin {plugin} failed to install: {source}")]
    PluginFailed {
        plugin: String,
        #[source]
        source: crate::plugin::PluginError,
    },

    // Emission errors
    #[error("Listener {listener} on {event:?} failed: {source}")]
    ListenerFailure {
        event: String,
        listener: ListenerId,
        #[source]
        source: crate::bus::ListenerError,
    },

    #[error("Listener {listener} on {event:?} returned a deferred reply to a synchronous emit")]
    DeferredReply { event: String, listener: ListenerId },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Whether the error came out of a listener during emission.
    pub fn is_listener_failure(&self) -> bool {
        matches!(self, Error::ListenerFailure { .. } | Error::DeferredReply { .. })
    }
}
