//! Logging setup for hosts embedding plugbus.
//!
//! The bus itself only emits `tracing` events; this module installs a
//! `tracing-subscriber` formatter so those events go somewhere.

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level
    Error = 4,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// One event per line with all fields
    Full,
    /// Shorter single-line output
    Compact,
}

/// Logger configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Minimum log level
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Include timestamps
    pub timestamps: bool,
}

impl LoggerConfig {
    /// Set minimum level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Toggle timestamps.
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Full,
            timestamps: true,
        }
    }
}

/// Install a global fmt subscriber.
///
/// Returns `false` if a global subscriber was already set, in which case
/// the existing one is left untouched.
pub fn init_logging(config: &LoggerConfig) -> bool {
    init_logging_with_writer(config, std::io::stdout)
}

/// Install a global fmt subscriber writing through `writer`.
pub fn init_logging_with_writer<W>(config: &LoggerConfig, writer: W) -> bool
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_max_level(Level::from(config.level))
        .with_writer(writer);
    let result = match config.format {
        LogFormat::Full if config.timestamps => builder.try_init(),
        LogFormat::Full => builder.without_time().try_init(),
        LogFormat::Compact if config.timestamps => builder.compact().try_init(),
        LogFormat::Compact => builder.compact().without_time().try_init(),
    };
    result.is_ok()
}
