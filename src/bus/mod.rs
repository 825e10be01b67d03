//! Bus Module
//!
//! In-process publish/subscribe:
//! - Listener registration with priorities and disposers
//! - Sequential, synchronous and parallel emission
//! - Plugin installation entry point

pub mod config;
pub mod emit;
pub mod listener;

pub use config::BusConfig;
pub use listener::{Disposer, Listener, ListenerError, ListenerRegistry, ListenerResult, Reply};

use crate::core::{Payload, Result};
use crate::plugin::{InstalledPlugin, Plugin, PluginOptions, PluginRegistry};
use listener::Callback;
use std::future::Future;
use std::sync::Arc;

struct BusInner {
    config: BusConfig,
    listeners: Arc<ListenerRegistry>,
    plugins: PluginRegistry,
}

/// Event bus handle.
///
/// Cloning is cheap and every clone shares the same listeners and plugins.
/// Separate `Bus::new()` calls never share state.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

impl Bus {
    /// Create a bus with default configuration.
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a bus with the given configuration.
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            inner: Arc::new(BusInner {
                listeners: Arc::new(ListenerRegistry::new(config.max_listeners)),
                plugins: PluginRegistry::new(),
                config,
            }),
        }
    }

    /// Configuration this bus was built with.
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    /// Register a listener at priority 0.
    pub fn on<F>(&self, mask: &str, callback: F) -> Disposer
    where
        F: Fn(Payload) -> ListenerResult<Reply> + Send + Sync + 'static,
    {
        self.on_with_priority(mask, 0, callback)
    }

    /// Register a listener; higher priorities run first.
    pub fn on_with_priority<F>(&self, mask: &str, priority: i32, callback: F) -> Disposer
    where
        F: Fn(Payload) -> ListenerResult<Reply> + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        self.inner.listeners.register(mask, priority, callback)
    }

    /// Register a listener that fires once, at priority 0.
    pub fn once<F>(&self, mask: &str, callback: F) -> Disposer
    where
        F: Fn(Payload) -> ListenerResult<Reply> + Send + Sync + 'static,
    {
        self.once_with_priority(mask, 0, callback)
    }

    /// Register a listener that fires once.
    pub fn once_with_priority<F>(&self, mask: &str, priority: i32, callback: F) -> Disposer
    where
        F: Fn(Payload) -> ListenerResult<Reply> + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        self.inner.listeners.register_once(mask, priority, callback)
    }

    /// Listeners bound to `event`, optionally in emission order.
    pub fn list(&self, event: &str, sorted: bool) -> Vec<Listener> {
        self.inner.listeners.query(event, sorted)
    }

    /// Whether anything listens to `event`.
    pub fn has(&self, event: &str) -> bool {
        self.inner.listeners.has(event)
    }

    /// Remove every listener bound to `event`; returns how many went.
    pub fn off(&self, event: &str) -> usize {
        self.inner.listeners.remove_matching(event)
    }

    /// Total registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Events with at least one listener.
    pub fn event_names(&self) -> Vec<String> {
        self.inner.listeners.event_names()
    }

    /// Feed `data` through the listeners in order, awaiting deferred replies.
    ///
    /// The listener snapshot is taken when this is called, not when the
    /// returned future is first polled.
    pub fn emit(&self, event: &str, data: Payload) -> impl Future<Output = Result<Payload>> + Send + 'static {
        let listeners = self.inner.listeners.query(event, true);
        tracing::debug!(bus = %self.inner.config.label, event, listeners = listeners.len(), "emit");
        emit::sequential(event.to_string(), listeners, data)
    }

    /// Feed `data` through the listeners in order; deferred replies fail.
    pub fn emit_sync(&self, event: &str, data: Payload) -> Result<Payload> {
        let listeners = self.inner.listeners.query(event, true);
        tracing::debug!(bus = %self.inner.config.label, event, listeners = listeners.len(), "emit_sync");
        emit::sequential_sync(event, &listeners, data)
    }

    /// Run all listeners concurrently on `data`, results in listener order.
    pub fn emit_parallel(
        &self,
        event: &str,
        data: Payload,
    ) -> impl Future<Output = Result<Vec<Payload>>> + Send + 'static {
        let listeners = self.inner.listeners.query(event, true);
        tracing::debug!(bus = %self.inner.config.label, event, listeners = listeners.len(), "emit_parallel");
        emit::parallel(event.to_string(), listeners, data)
    }

    /// Run all listeners eagerly on `data`, results in listener order.
    pub fn emit_parallel_sync(&self, event: &str, data: Payload) -> Result<Vec<Payload>> {
        let listeners = self.inner.listeners.query(event, true);
        tracing::debug!(bus = %self.inner.config.label, event, listeners = listeners.len(), "emit_parallel_sync");
        emit::parallel_sync(event, &listeners, &data)
    }

    /// Install a plugin after checking its dependencies.
    pub fn plugin(&self, plugin: &dyn Plugin, options: &PluginOptions) -> Result<()> {
        self.inner.plugins.install(self, plugin, options)
    }

    /// Whether a plugin with this name is installed.
    pub fn has_plugin(&self, name: &str) -> bool {
        self.inner.plugins.contains(name)
    }

    /// Installation record for a plugin.
    pub fn installed(&self, name: &str) -> Option<InstalledPlugin> {
        self.inner.plugins.get(name)
    }

    /// All installed plugins, sorted by name.
    pub fn installed_plugins(&self) -> Vec<InstalledPlugin> {
        self.inner.plugins.list()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("label", &self.inner.config.label)
            .field("listeners", &self.inner.listeners.len())
            .field("plugins", &self.inner.plugins.len())
            .finish()
    }
}
