//! # plugbus - In-process event bus with plugins
//!
//! A publish/subscribe bus for decoupled extension points:
//! - **Listeners**: exact-key subscriptions with priorities and disposers
//! - **Emission**: sequential, synchronous, parallel and parallel-sync
//! - **Plugins**: versioned extension units with dependency checks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plugbus::{create_plugin, Bus, PluginOptions};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> plugbus::Result<()> {
//!     let bus = Bus::new();
//!
//!     let greeter = create_plugin("greeter", "1.0.0", [("core", "0.1")], |bus, _| {
//!         bus.on("greet", |name| Ok(json!(format!("hello {}", name)).into()));
//!         Ok(())
//!     })?;
//!     let core = create_plugin("core", "0.2", Vec::<(String, String)>::new(), |_, _| Ok(()))?;
//!
//!     bus.plugin(&core, &PluginOptions::new())?;
//!     bus.plugin(&greeter, &PluginOptions::new())?;
//!
//!     let reply = bus.emit("greet", json!("world")).await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod core;
pub mod plugin;

pub use bus::{Bus, BusConfig, Disposer, Listener, ListenerError, Reply};
pub use crate::core::error::{Error, Result};
pub use crate::core::Payload;
pub use plugin::{create_plugin, compare_version, Plugin, PluginDescriptor, PluginError, PluginOptions};
