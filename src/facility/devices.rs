//! Device and meeting value types
//!
//! Every device belongs to exactly one room and carries that room's id so a
//! flattened device listing stays self-describing.

use crate::types::{BlindsState, DeviceState};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};

/// Lowest temperature a sensor will ever report (°C)
pub const MIN_ROOM_TEMPERATURE: f64 = 15.0;

/// Highest temperature a sensor will ever report (°C)
pub const MAX_ROOM_TEMPERATURE: f64 = 28.0;

/// Serialize an internal floating-point percentage as an integer in [0,100]
pub(crate) fn serialize_percent<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(value.round().clamp(0.0, 100.0) as u8)
}

/// A dimmable ceiling light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightDevice {
    /// Unique identifier of the light
    pub id: String,
    /// Room the light is mounted in
    pub room_id: String,
    /// Current power state
    pub state: DeviceState,
    /// Brightness in percent (0-100)
    pub brightness: u8,
}

impl LightDevice {
    /// Create a new light that is off at full brightness
    pub fn new(id: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self { id: id.into(), room_id: room_id.into(), state: DeviceState::Off, brightness: 100 }
    }

    /// Check if the light is emitting
    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }
}

/// A shared office printer
///
/// Resource levels are kept as fractional percentages so slow self-consumption
/// accumulates; they are emitted as integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterDevice {
    /// Unique identifier of the printer
    pub id: String,
    /// Room the printer stands in
    pub room_id: String,
    /// Current power state
    pub state: DeviceState,
    /// Toner level in percent (0-100)
    #[serde(serialize_with = "serialize_percent")]
    pub toner_level: f64,
    /// Paper level in percent (0-100)
    #[serde(serialize_with = "serialize_percent")]
    pub paper_level: f64,
}

impl PrinterDevice {
    /// Create a new printer that is off with the given resource levels
    pub fn new(
        id: impl Into<String>,
        room_id: impl Into<String>,
        toner_level: f64,
        paper_level: f64,
    ) -> Self {
        Self {
            id: id.into(),
            room_id: room_id.into(),
            state: DeviceState::Off,
            toner_level: toner_level.clamp(0.0, 100.0),
            paper_level: paper_level.clamp(0.0, 100.0),
        }
    }

    /// Check whether both consumables are available
    pub fn has_resources(&self) -> bool {
        self.toner_level > 0.0 && self.paper_level > 0.0
    }

    /// Toner level as emitted to callers
    pub fn toner_percent(&self) -> u8 {
        self.toner_level.round().clamp(0.0, 100.0) as u8
    }

    /// Paper level as emitted to callers
    pub fn paper_percent(&self) -> u8 {
        self.paper_level.round().clamp(0.0, 100.0) as u8
    }
}

/// Passive infrared motion sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSensor {
    /// Unique identifier of the sensor
    pub id: String,
    /// Room the sensor watches
    pub room_id: String,
    /// Whether motion was detected during the latest tick
    pub motion_detected: bool,
    /// Simulated time of the latest detection
    pub last_motion_time: Option<NaiveDateTime>,
}

impl MotionSensor {
    /// Create a new idle sensor
    pub fn new(id: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self { id: id.into(), room_id: room_id.into(), motion_detected: false, last_motion_time: None }
    }

    /// Register motion at the given simulated time
    pub fn trigger(&mut self, at: NaiveDateTime) {
        self.motion_detected = true;
        // Never move the timestamp backwards
        if self.last_motion_time.map_or(true, |last| at >= last) {
            self.last_motion_time = Some(at);
        }
    }

    /// Clear the detection flag, keeping the last detection time
    pub fn clear(&mut self) {
        self.motion_detected = false;
    }
}

/// Room temperature sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSensor {
    /// Unique identifier of the sensor
    pub id: String,
    /// Room the sensor is mounted in
    pub room_id: String,
    /// Current reading in °C, always within [15,28]
    pub temperature: f64,
}

impl TemperatureSensor {
    /// Create a new sensor with a clamped initial reading
    pub fn new(id: impl Into<String>, room_id: impl Into<String>, temperature: f64) -> Self {
        Self {
            id: id.into(),
            room_id: room_id.into(),
            temperature: clamp_room_temperature(temperature),
        }
    }

    /// Store a new reading, clamped to the sensor range
    pub fn set(&mut self, temperature: f64) {
        self.temperature = clamp_room_temperature(temperature);
    }
}

/// Clamp a temperature into the range a room sensor can report
pub fn clamp_room_temperature(temperature: f64) -> f64 {
    if temperature.is_nan() {
        return MIN_ROOM_TEMPERATURE;
    }
    temperature.clamp(MIN_ROOM_TEMPERATURE, MAX_ROOM_TEMPERATURE)
}

/// Motorised window blinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlindsDevice {
    /// Unique identifier of the blinds
    pub id: String,
    /// Room the blinds belong to
    pub room_id: String,
    /// Current position
    pub state: BlindsState,
}

impl BlindsDevice {
    /// Create new blinds in the open position
    pub fn new(id: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self { id: id.into(), room_id: room_id.into(), state: BlindsState::Open }
    }
}

/// A booked meeting occupying a room for `[start_time, end_time)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    /// Simulated start time
    pub start_time: NaiveDateTime,
    /// Simulated end time (exclusive)
    pub end_time: NaiveDateTime,
    /// Meeting title
    pub title: String,
}

impl Meeting {
    /// Create a new meeting
    pub fn new(start_time: NaiveDateTime, end_time: NaiveDateTime, title: impl Into<String>) -> Self {
        Self { start_time, end_time, title: title.into() }
    }

    /// Check whether this meeting intersects the half-open interval `[start, end)`
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start_time < end && start < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_printer_percentages_serialize_as_integers() {
        let printer = PrinterDevice::new("printer_208", "room_208", 41.6, 0.2);
        let json = serde_json::to_value(&printer).unwrap();
        assert_eq!(json["toner_level"], 42);
        assert_eq!(json["paper_level"], 0);
        assert_eq!(json["state"], "OFF");
    }

    #[test]
    fn test_printer_levels_are_clamped() {
        let printer = PrinterDevice::new("p", "r", 140.0, -3.0);
        assert_eq!(printer.toner_level, 100.0);
        assert_eq!(printer.paper_level, 0.0);
        assert!(!printer.has_resources());
    }

    #[test]
    fn test_temperature_sensor_clamps() {
        let mut sensor = TemperatureSensor::new("temp_1", "room_1", 40.0);
        assert_eq!(sensor.temperature, MAX_ROOM_TEMPERATURE);
        sensor.set(3.0);
        assert_eq!(sensor.temperature, MIN_ROOM_TEMPERATURE);
        sensor.set(f64::NAN);
        assert_eq!(sensor.temperature, MIN_ROOM_TEMPERATURE);
    }

    #[test]
    fn test_motion_time_never_moves_backwards() {
        let mut sensor = MotionSensor::new("motion_1", "room_1");
        sensor.trigger(at(10, 0));
        sensor.trigger(at(9, 0));
        assert_eq!(sensor.last_motion_time, Some(at(10, 0)));
        sensor.clear();
        assert!(!sensor.motion_detected);
        assert_eq!(sensor.last_motion_time, Some(at(10, 0)));
    }

    #[test]
    fn test_meeting_overlap_is_half_open() {
        let meeting = Meeting::new(at(10, 0), at(10, 30), "Sync");
        assert!(meeting.overlaps(at(10, 15), at(10, 45)));
        assert!(!meeting.overlaps(at(10, 30), at(11, 0)));
        assert!(!meeting.overlaps(at(9, 30), at(10, 0)));
    }
}
