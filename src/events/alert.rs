//! Alerts raised by agents or by the engine itself

use crate::events::bounded::BoundedLog;
use crate::types::{AlertId, AlertSeverity};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Number of alerts kept before the oldest is evicted
pub const ALERT_LOG_CAPACITY: usize = 100;

/// An alert about a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier of the alert
    pub id: AlertId,
    /// Free-form alert type, e.g. `toner_empty`
    #[serde(rename = "type")]
    pub alert_type: String,
    /// Printer or other device the alert concerns
    pub device_id: String,
    /// Room of the device, if known
    pub room_id: Option<String>,
    /// Display name of that room, if known
    pub room_name: Option<String>,
    /// Human-readable message
    pub message: String,
    /// Simulated time the alert was raised
    pub timestamp: NaiveDateTime,
    /// Severity
    pub severity: AlertSeverity,
}

/// Request to raise an alert; id and timestamp are assigned on insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    /// Free-form alert type
    #[serde(rename = "type")]
    pub alert_type: String,
    /// Device the alert concerns
    pub device_id: String,
    /// Room of the device; filled in from the layout when omitted
    #[serde(default)]
    pub room_id: Option<String>,
    /// Display name of the room; filled in from the layout when omitted
    #[serde(default)]
    pub room_name: Option<String>,
    /// Human-readable message
    pub message: String,
    /// Severity
    pub severity: AlertSeverity,
}

impl NewAlert {
    /// Create a new alert request without room context
    pub fn new(
        alert_type: impl Into<String>,
        device_id: impl Into<String>,
        message: impl Into<String>,
        severity: AlertSeverity,
    ) -> Self {
        Self {
            alert_type: alert_type.into(),
            device_id: device_id.into(),
            room_id: None,
            room_name: None,
            message: message.into(),
            severity,
        }
    }

    /// Attach the room of the device
    pub fn in_room(mut self, room_id: impl Into<String>, room_name: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self.room_name = Some(room_name.into());
        self
    }

    /// Turn the request into a stored alert
    pub fn into_alert(self, timestamp: NaiveDateTime) -> Alert {
        Alert {
            id: AlertId::new(),
            alert_type: self.alert_type,
            device_id: self.device_id,
            room_id: self.room_id,
            room_name: self.room_name,
            message: self.message,
            timestamp,
            severity: self.severity,
        }
    }
}

/// Ring buffer of the most recent alerts
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AlertLog {
    alerts: BoundedLog<Alert>,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertLog {
    /// Create an empty log with the standard capacity
    pub fn new() -> Self {
        Self { alerts: BoundedLog::with_capacity(ALERT_LOG_CAPACITY) }
    }

    /// Store an alert, evicting the oldest when full
    pub fn push(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    /// All alerts from oldest to newest
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.to_vec()
    }

    /// Alerts strictly newer than `after`
    pub fn since(&self, after: NaiveDateTime) -> Vec<Alert> {
        self.alerts.iter().filter(|alert| alert.timestamp > after).cloned().collect()
    }

    /// Number of stored alerts
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Drop every alert
    pub fn clear(&mut self) {
        self.alerts.clear();
    }
}
