//! The environment snapshot and its read-side views
//!
//! `EnvironmentState` is the single unit of truth every tick stage rewrites.
//! The summary types here are derived views handed to callers.

use crate::facility::{BlindsDevice, LightDevice, PrinterDevice, Room};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Default outside temperature at engine construction (°C)
pub const INITIAL_EXTERNAL_TEMPERATURE: f64 = 10.0;

/// Default daylight intensity at engine construction
pub const INITIAL_DAYLIGHT_INTENSITY: f64 = 0.7;

/// Complete, self-consistent state of the simulated office
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    /// Current simulated time
    pub simulation_time: NaiveDateTime,
    /// All rooms in layout order
    pub rooms: Vec<Room>,
    /// Outside temperature (°C), within [-10,35]
    pub external_temperature: f64,
    /// Multiplier applied to every tick's simulated minutes
    pub time_speed: f64,
    /// Whether building power is out
    pub power_outage: bool,
    /// Daylight intensity in [0,1]
    pub daylight_intensity: f64,
}

impl EnvironmentState {
    /// Create a state around the given rooms
    pub fn new(simulation_time: NaiveDateTime, rooms: Vec<Room>, time_speed: f64) -> Self {
        Self {
            simulation_time,
            rooms,
            external_temperature: INITIAL_EXTERNAL_TEMPERATURE,
            time_speed,
            power_outage: false,
            daylight_intensity: INITIAL_DAYLIGHT_INTENSITY,
        }
    }

    /// Get a room by id
    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == room_id)
    }

    /// Get a mutable room by id
    pub fn room_mut(&mut self, room_id: &str) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|room| room.id == room_id)
    }

    /// Get a light by id
    pub fn light(&self, light_id: &str) -> Option<&LightDevice> {
        self.rooms.iter().find_map(|room| room.light(light_id))
    }

    /// Get a mutable light by id
    pub fn light_mut(&mut self, light_id: &str) -> Option<&mut LightDevice> {
        self.rooms.iter_mut().find_map(|room| room.light_mut(light_id))
    }

    /// Get a printer by id
    pub fn printer(&self, printer_id: &str) -> Option<&PrinterDevice> {
        self.rooms.iter().find_map(|room| room.printer_with_id(printer_id))
    }

    /// Get the room holding a printer, for in-place printer updates
    pub fn room_with_printer_mut(&mut self, printer_id: &str) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|room| room.printer_with_id(printer_id).is_some())
    }

    /// Get blinds by id
    pub fn blinds(&self, blinds_id: &str) -> Option<&BlindsDevice> {
        self.rooms.iter().find_map(|room| room.blinds_with_id(blinds_id))
    }

    /// Get mutable blinds by id
    pub fn blinds_mut(&mut self, blinds_id: &str) -> Option<&mut BlindsDevice> {
        self.rooms
            .iter_mut()
            .find_map(|room| room.blinds.as_mut().filter(|blinds| blinds.id == blinds_id))
    }

    /// Room that owns a device id
    pub fn room_of_device(&self, device_id: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| {
            room.light(device_id).is_some()
                || room.printer_with_id(device_id).is_some()
                || room.blinds_with_id(device_id).is_some()
                || room.motion_sensor.id == device_id
                || room.temperature_sensor.id == device_id
        })
    }

    /// Total number of people in the office
    pub fn total_occupancy(&self) -> u32 {
        self.rooms.iter().map(|room| room.occupancy).sum()
    }

    /// Every device of every room as one flat list
    pub fn devices(&self) -> Vec<DeviceInfo> {
        let mut devices = Vec::new();
        for room in &self.rooms {
            devices.extend(room.lights.iter().cloned().map(DeviceInfo::Light));
            if let Some(printer) = &room.printer {
                devices.push(DeviceInfo::Printer(printer.clone()));
            }
            devices.push(DeviceInfo::MotionSensor(room.motion_sensor.clone()));
            devices.push(DeviceInfo::TemperatureSensor(room.temperature_sensor.clone()));
            if let Some(blinds) = &room.blinds {
                devices.push(DeviceInfo::Blinds(blinds.clone()));
            }
        }
        devices
    }

    /// Per-room temperatures plus the office average and outside temperature
    pub fn temperature_summary(&self) -> TemperatureSummary {
        let rooms: Vec<RoomTemperature> = self
            .rooms
            .iter()
            .map(|room| RoomTemperature {
                room_id: room.id.clone(),
                room_name: room.name.clone(),
                temperature: room.temperature(),
                heating_on: room.heating_on,
            })
            .collect();
        let average_temperature = if rooms.is_empty() {
            0.0
        } else {
            rooms.iter().map(|room| room.temperature).sum::<f64>() / rooms.len() as f64
        };

        TemperatureSummary {
            timestamp: self.simulation_time,
            external_temperature: self.external_temperature,
            average_temperature,
            power_outage: self.power_outage,
            rooms,
        }
    }

    /// Per-room motion state and headcount
    pub fn motion_summary(&self) -> MotionSummary {
        let rooms: Vec<RoomMotion> = self
            .rooms
            .iter()
            .map(|room| RoomMotion {
                room_id: room.id.clone(),
                room_name: room.name.clone(),
                sensor_id: room.motion_sensor.id.clone(),
                motion_detected: room.motion_sensor.motion_detected,
                last_motion_time: room.motion_sensor.last_motion_time,
                occupancy: room.occupancy,
            })
            .collect();

        MotionSummary {
            timestamp: self.simulation_time,
            rooms_with_motion: rooms.iter().filter(|room| room.motion_detected).count(),
            total_occupancy: self.total_occupancy(),
            rooms,
        }
    }
}

/// One device of the flattened device listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "device_type", rename_all = "snake_case")]
pub enum DeviceInfo {
    /// A light
    Light(LightDevice),
    /// A printer
    Printer(PrinterDevice),
    /// A motion sensor
    MotionSensor(crate::facility::MotionSensor),
    /// A temperature sensor
    TemperatureSensor(crate::facility::TemperatureSensor),
    /// A set of blinds
    Blinds(BlindsDevice),
}

impl DeviceInfo {
    /// Id of the device
    pub fn id(&self) -> &str {
        match self {
            DeviceInfo::Light(device) => &device.id,
            DeviceInfo::Printer(device) => &device.id,
            DeviceInfo::MotionSensor(device) => &device.id,
            DeviceInfo::TemperatureSensor(device) => &device.id,
            DeviceInfo::Blinds(device) => &device.id,
        }
    }

    /// Room of the device
    pub fn room_id(&self) -> &str {
        match self {
            DeviceInfo::Light(device) => &device.room_id,
            DeviceInfo::Printer(device) => &device.room_id,
            DeviceInfo::MotionSensor(device) => &device.room_id,
            DeviceInfo::TemperatureSensor(device) => &device.room_id,
            DeviceInfo::Blinds(device) => &device.room_id,
        }
    }
}

/// Temperature of one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTemperature {
    /// Room id
    pub room_id: String,
    /// Room display name
    pub room_name: String,
    /// Current reading (°C)
    pub temperature: f64,
    /// Heating flag of the room
    pub heating_on: bool,
}

/// Office-wide temperature view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSummary {
    /// Simulated time of the view
    pub timestamp: NaiveDateTime,
    /// Outside temperature (°C)
    pub external_temperature: f64,
    /// Mean of all room readings (°C)
    pub average_temperature: f64,
    /// Whether power is out (heating is then forced off)
    pub power_outage: bool,
    /// Per-room readings
    pub rooms: Vec<RoomTemperature>,
}

/// Motion state of one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMotion {
    /// Room id
    pub room_id: String,
    /// Room display name
    pub room_name: String,
    /// Motion sensor id
    pub sensor_id: String,
    /// Whether motion is currently detected
    pub motion_detected: bool,
    /// Latest detection time
    pub last_motion_time: Option<NaiveDateTime>,
    /// Current headcount
    pub occupancy: u32,
}

/// Office-wide motion view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSummary {
    /// Simulated time of the view
    pub timestamp: NaiveDateTime,
    /// Number of rooms currently reporting motion
    pub rooms_with_motion: usize,
    /// Total headcount
    pub total_occupancy: u32,
    /// Per-room state
    pub rooms: Vec<RoomMotion>,
}
