//! Unique identifier types for the office environment simulator
//!
//! Rooms and devices carry the human-readable ids from the room layout
//! (`room_208`, `printer_208`). Log entries created at runtime get UUID-based
//! identifiers defined here.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlertId(pub Uuid);

impl AlertId {
    /// Create a new random alert ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALERT_{}", self.0.simple())
    }
}

impl Serialize for AlertId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AlertId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("ALERT_").unwrap_or(&s);
        let uuid = Uuid::parse_str(raw).map_err(serde::de::Error::custom)?;
        Ok(AlertId(uuid))
    }
}

/// Unique identifier for an agent message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Create a new random message ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MSG_{}", self.0.simple())
    }
}

impl Serialize for MessageId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("MSG_").unwrap_or(&s);
        let uuid = Uuid::parse_str(raw).map_err(serde::de::Error::custom)?;
        Ok(MessageId(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(AlertId::new(), AlertId::new());
        assert_ne!(MessageId::new(), MessageId::new());
    }

    #[test]
    fn test_prefixed_display() {
        assert!(AlertId::new().to_string().starts_with("ALERT_"));
        assert!(MessageId::new().to_string().starts_with("MSG_"));
    }

    #[test]
    fn test_serde_accepts_prefixed_and_raw() {
        let id = AlertId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: AlertId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);

        let raw = format!("\"{}\"", id.0);
        let from_raw: AlertId = serde_json::from_str(&raw).unwrap();
        assert_eq!(id, from_raw);

        assert!(serde_json::from_str::<MessageId>("\"MSG_not-a-uuid\"").is_err());
    }
}
