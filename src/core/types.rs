//! Common types used across plugbus modules.

/// Data flowing through an emission.
pub type Payload = serde_json::Value;

/// Identifier of a registered listener, unique per bus.
pub type ListenerId = u64;

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}
