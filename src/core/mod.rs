//! Core utilities and common types for plugbus.

pub mod error;
pub mod logging;
pub mod types;

pub use error::{Error, Result};
pub use logging::{init_logging, init_logging_with_writer, LogFormat, LogLevel, LoggerConfig};
pub use types::*;
