//! Office layout and room construction
//!
//! This module holds the static room configuration list the engine is built
//! from, its validation, and the construction of live rooms (with randomly
//! seeded printer levels) from that list.

use crate::facility::devices::{
    BlindsDevice, LightDevice, MotionSensor, PrinterDevice, TemperatureSensor,
};
use crate::facility::room::Room;
use crate::types::ConfigValidationError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Range printer toner and paper levels are seeded from at startup
pub const INITIAL_PRINTER_LEVEL_RANGE: (f64, f64) = (50.0, 100.0);

/// Range initial room temperatures are drawn from (°C)
pub const INITIAL_ROOM_TEMPERATURE_RANGE: (f64, f64) = (19.0, 23.0);

fn default_light_count() -> usize {
    2
}

/// Static description of one room in the office layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSpec {
    /// Room identifier, e.g. `room_208`
    pub id: String,
    /// Display name
    pub name: String,
    /// Number of ceiling lights
    #[serde(default = "default_light_count")]
    pub lights: usize,
    /// Whether the room has a printer
    #[serde(default)]
    pub printer: bool,
    /// Whether the room has blinds
    #[serde(default)]
    pub blinds: bool,
}

impl RoomSpec {
    /// Create an entry with the default light count and no optional devices
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lights: default_light_count(),
            printer: false,
            blinds: false,
        }
    }

    /// Set the number of lights
    pub fn with_lights(mut self, lights: usize) -> Self {
        self.lights = lights;
        self
    }

    /// Add a printer
    pub fn with_printer(mut self) -> Self {
        self.printer = true;
        self
    }

    /// Add blinds
    pub fn with_blinds(mut self) -> Self {
        self.blinds = true;
        self
    }

    /// Suffix shared by all device ids of this room (`room_208` -> `208`)
    pub fn device_suffix(&self) -> &str {
        self.id.strip_prefix("room_").unwrap_or(&self.id)
    }

    /// Id of the n-th light (1-based)
    pub fn light_id(&self, index: usize) -> String {
        format!("light_{}_{}", self.device_suffix(), index)
    }

    /// Id of the printer
    pub fn printer_id(&self) -> String {
        format!("printer_{}", self.device_suffix())
    }

    /// Id of the motion sensor
    pub fn motion_sensor_id(&self) -> String {
        format!("motion_{}", self.device_suffix())
    }

    /// Id of the temperature sensor
    pub fn temperature_sensor_id(&self) -> String {
        format!("temp_{}", self.device_suffix())
    }

    /// Id of the blinds
    pub fn blinds_id(&self) -> String {
        format!("blinds_{}", self.device_suffix())
    }

    /// All device ids this entry produces
    pub fn device_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = (1..=self.lights).map(|i| self.light_id(i)).collect();
        if self.printer {
            ids.push(self.printer_id());
        }
        if self.blinds {
            ids.push(self.blinds_id());
        }
        ids.push(self.motion_sensor_id());
        ids.push(self.temperature_sensor_id());
        ids
    }
}

/// The office the simulator models when no layout is configured
pub fn default_office_layout() -> Vec<RoomSpec> {
    vec![
        RoomSpec::new("room_101", "Reception").with_lights(2).with_blinds(),
        RoomSpec::new("room_102", "Open Office").with_lights(4).with_printer().with_blinds(),
        RoomSpec::new("room_201", "Conference Room A").with_lights(2).with_blinds(),
        RoomSpec::new("room_202", "Conference Room B").with_lights(2),
        RoomSpec::new("room_208", "Team Office").with_lights(3).with_printer().with_blinds(),
        RoomSpec::new("room_301", "Executive Office").with_lights(2).with_printer().with_blinds(),
    ]
}

/// Check that a layout is non-empty and all room and device ids are unique
pub fn validate_layout(entries: &[RoomSpec]) -> Result<(), ConfigValidationError> {
    if entries.is_empty() {
        return Err(ConfigValidationError::EmptyLayout);
    }

    let mut room_ids = HashSet::new();
    let mut device_ids = HashSet::new();
    for entry in entries {
        if entry.id.trim().is_empty() {
            return Err(ConfigValidationError::BlankRoomId);
        }
        if !room_ids.insert(entry.id.as_str()) {
            return Err(ConfigValidationError::DuplicateRoomId(entry.id.clone()));
        }
        for device_id in entry.device_ids() {
            if !device_ids.insert(device_id.clone()) {
                return Err(ConfigValidationError::DuplicateDeviceId(device_id));
            }
        }
    }
    Ok(())
}

/// Build a live room from its layout entry
///
/// Printers start OFF with toner and paper each drawn uniformly from 50-100%.
pub fn build_room<R: Rng>(entry: &RoomSpec, heating_on: bool, rng: &mut R) -> Room {
    let (min_temp, max_temp) = INITIAL_ROOM_TEMPERATURE_RANGE;
    let temperature = rng.gen_range(min_temp..=max_temp);

    let mut room = Room::new(
        entry.id.clone(),
        entry.name.clone(),
        MotionSensor::new(entry.motion_sensor_id(), entry.id.clone()),
        TemperatureSensor::new(entry.temperature_sensor_id(), entry.id.clone(), temperature),
    );
    room.heating_on = heating_on;
    room.lights = (1..=entry.lights).map(|i| LightDevice::new(entry.light_id(i), entry.id.clone())).collect();

    if entry.printer {
        let (min_level, max_level) = INITIAL_PRINTER_LEVEL_RANGE;
        let toner = rng.gen_range(min_level..=max_level).round();
        let paper = rng.gen_range(min_level..=max_level).round();
        room.printer = Some(PrinterDevice::new(entry.printer_id(), entry.id.clone(), toner, paper));
    }
    if entry.blinds {
        room.blinds = Some(BlindsDevice::new(entry.blinds_id(), entry.id.clone()));
    }

    debug!(
        "Built room {} with {} lights, printer: {}, blinds: {}",
        entry.id, entry.lights, entry.printer, entry.blinds
    );
    room
}

/// Build every room of a layout in order
pub fn build_rooms<R: Rng>(entries: &[RoomSpec], heating_on: bool, rng: &mut R) -> Vec<Room> {
    entries.iter().map(|entry| build_room(entry, heating_on, rng)).collect()
}
