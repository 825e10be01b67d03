//! Bus configuration.

use serde::{Deserialize, Serialize};

/// Bus configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Name attached to the bus's log events
    pub label: String,
    /// Warn when one event gathers more listeners than this
    pub max_listeners: Option<usize>,
}

impl BusConfig {
    /// Set label.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Set per-event listener warning threshold.
    pub fn with_max_listeners(mut self, max: usize) -> Self {
        self.max_listeners = Some(max);
        self
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            label: "bus".to_string(),
            max_listeners: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = BusConfig::default().with_label("host").with_max_listeners(16);
        assert_eq!(config.label, "host");
        assert_eq!(config.max_listeners, Some(16));
    }

    #[test]
    fn test_partial_json() {
        let config: BusConfig = serde_json::from_str(r#"{"max_listeners": 4}"#).unwrap();
        assert_eq!(config.label, "bus");
        assert_eq!(config.max_listeners, Some(4));
    }
}
