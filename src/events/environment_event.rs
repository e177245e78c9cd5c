//! Environment events and the append-only event log

use crate::types::EventType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Something that happened in the simulated office
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentEvent {
    /// Type tag of the event
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Room the event happened in, if any
    pub room_id: Option<String>,
    /// Device involved, if any
    pub device_id: Option<String>,
    /// Simulated time of the event
    pub timestamp: NaiveDateTime,
    /// Human-readable description
    pub description: String,
}

impl EnvironmentEvent {
    /// Create an event without room or device context
    pub fn new(event_type: EventType, timestamp: NaiveDateTime, description: impl Into<String>) -> Self {
        Self { event_type, room_id: None, device_id: None, timestamp, description: description.into() }
    }

    /// Attach the room the event belongs to
    pub fn in_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    /// Attach the device the event concerns
    pub fn for_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }
}

/// Append-only event log, emptied only by an explicit clear
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<EnvironmentEvent>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn record(&mut self, event: EnvironmentEvent) {
        self.events.push(event);
    }

    /// All events from oldest to newest
    pub fn events(&self) -> &[EnvironmentEvent] {
        &self.events
    }

    /// Events of one type
    pub fn of_type(&self, event_type: EventType) -> impl Iterator<Item = &EnvironmentEvent> {
        self.events.iter().filter(move |event| event.event_type == event_type)
    }

    /// Number of stored events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every event, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.events.len();
        self.events.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_event_builder_and_wire_format() {
        let event = EnvironmentEvent::new(EventType::DeviceFailure, noon(), "Light broke")
            .in_room("room_208")
            .for_device("light_208_1");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "device_failure");
        assert_eq!(json["room_id"], "room_208");
        assert_eq!(json["device_id"], "light_208_1");
        assert_eq!(json["timestamp"], "2024-01-08T12:00:00");
    }

    #[test]
    fn test_log_is_not_self_trimming() {
        let mut log = EventLog::new();
        for _ in 0..5_000 {
            log.record(EnvironmentEvent::new(EventType::Motion, noon(), "motion"));
        }
        log.record(EnvironmentEvent::new(EventType::PowerOutage, noon(), "outage"));
        assert_eq!(log.len(), 5_001);
        assert_eq!(log.of_type(EventType::PowerOutage).count(), 1);

        assert_eq!(log.clear(), 5_001);
        assert!(log.is_empty());
    }
}
