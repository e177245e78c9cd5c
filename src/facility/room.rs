//! Room management
//!
//! This module contains the Room struct: the devices mounted in one room, its
//! headcount, heating flag, and the meetings booked into it.

use crate::facility::devices::{
    BlindsDevice, LightDevice, Meeting, MotionSensor, PrinterDevice, TemperatureSensor,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Represents one room of the office
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unique identifier for the room
    pub id: String,
    /// Human-readable name of the room
    pub name: String,
    /// Ceiling lights, in layout order
    pub lights: Vec<LightDevice>,
    /// Printer standing in the room, if any
    pub printer: Option<PrinterDevice>,
    /// The room's motion sensor
    pub motion_sensor: MotionSensor,
    /// The room's temperature sensor
    pub temperature_sensor: TemperatureSensor,
    /// Window blinds, if any
    pub blinds: Option<BlindsDevice>,
    /// Number of people currently in the room
    pub occupancy: u32,
    /// Whether the heating controller for this room is enabled
    pub heating_on: bool,
    /// Upcoming meetings sorted by start time
    pub meetings: Vec<Meeting>,
}

impl Room {
    /// Create an empty room with its mandatory sensors
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        motion_sensor: MotionSensor,
        temperature_sensor: TemperatureSensor,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lights: Vec::new(),
            printer: None,
            motion_sensor,
            temperature_sensor,
            blinds: None,
            occupancy: 0,
            heating_on: false,
            meetings: Vec::new(),
        }
    }

    /// Current temperature reading of the room
    pub fn temperature(&self) -> f64 {
        self.temperature_sensor.temperature
    }

    /// Check if anybody is in the room
    pub fn is_occupied(&self) -> bool {
        self.occupancy > 0
    }

    /// Get a light of this room by id
    pub fn light(&self, light_id: &str) -> Option<&LightDevice> {
        self.lights.iter().find(|light| light.id == light_id)
    }

    /// Get a mutable light of this room by id
    pub fn light_mut(&mut self, light_id: &str) -> Option<&mut LightDevice> {
        self.lights.iter_mut().find(|light| light.id == light_id)
    }

    /// Get the printer if it has the given id
    pub fn printer_with_id(&self, printer_id: &str) -> Option<&PrinterDevice> {
        self.printer.as_ref().filter(|printer| printer.id == printer_id)
    }

    /// Get the blinds if they have the given id
    pub fn blinds_with_id(&self, blinds_id: &str) -> Option<&BlindsDevice> {
        self.blinds.as_ref().filter(|blinds| blinds.id == blinds_id)
    }

    /// Check whether `[start, end)` collides with any booked meeting
    pub fn has_meeting_overlap(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.meetings.iter().any(|meeting| meeting.overlaps(start, end))
    }

    /// Number of lights currently on
    pub fn lights_on(&self) -> usize {
        self.lights.iter().filter(|light| light.is_on()).count()
    }
}
