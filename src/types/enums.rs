//! Enumeration types for the office environment simulator
//!
//! This module contains all enumeration types used throughout the simulation system,
//! including device states, log classifications, and the engine behavior switches.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Power state of a light or printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    /// Device is powered and operating
    On,
    /// Device is powered down
    Off,
    /// Device has failed; only an external repair leaves this state
    Broken,
}

impl DeviceState {
    /// Check if the device is broken
    pub fn is_broken(&self) -> bool {
        *self == DeviceState::Broken
    }

    /// Check if the device is on
    pub fn is_on(&self) -> bool {
        *self == DeviceState::On
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::On => write!(f, "ON"),
            DeviceState::Off => write!(f, "OFF"),
            DeviceState::Broken => write!(f, "BROKEN"),
        }
    }
}

impl FromStr for DeviceState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" => Ok(DeviceState::On),
            "off" => Ok(DeviceState::Off),
            "broken" => Ok(DeviceState::Broken),
            _ => Err(format!("Unknown device state: {}", s)),
        }
    }
}

/// Position of a set of blinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlindsState {
    /// Blinds are raised
    Open,
    /// Blinds are lowered
    Closed,
}

impl fmt::Display for BlindsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlindsState::Open => write!(f, "OPEN"),
            BlindsState::Closed => write!(f, "CLOSED"),
        }
    }
}

impl FromStr for BlindsState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(BlindsState::Open),
            "closed" | "close" => Ok(BlindsState::Closed),
            _ => Err(format!("Unknown blinds state: {}", s)),
        }
    }
}

/// Severity attached to an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational notice
    Info,
    /// Something needs attention soon
    Warning,
    /// Something is broken
    Error,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "info"),
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Error => write!(f, "error"),
        }
    }
}

impl FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(AlertSeverity::Info),
            "warning" | "warn" => Ok(AlertSeverity::Warning),
            "error" => Ok(AlertSeverity::Error),
            _ => Err(format!("Unknown alert severity: {}", s)),
        }
    }
}

/// Speech-act type of an inter-agent message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Ask another agent to do something
    Request,
    /// Share a fact
    Inform,
    /// Ask another agent for information
    Query,
    /// Answer to a request or query
    Response,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Request => write!(f, "REQUEST"),
            MessageType::Inform => write!(f, "INFORM"),
            MessageType::Query => write!(f, "QUERY"),
            MessageType::Response => write!(f, "RESPONSE"),
        }
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "request" => Ok(MessageType::Request),
            "inform" => Ok(MessageType::Inform),
            "query" => Ok(MessageType::Query),
            "response" => Ok(MessageType::Response),
            _ => Err(format!("Unknown message type: {}", s)),
        }
    }
}

/// Type tag of an environment event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// People arrived in a room and tripped its motion sensor
    Motion,
    /// A device broke or a sensor stopped reporting
    DeviceFailure,
    /// Building power failed
    PowerOutage,
    /// Building power came back
    PowerRestored,
    /// Outside temperature jumped
    ExternalTemperatureChange,
    /// Daylight intensity changed
    DaylightChange,
    /// A printer ran out of toner or paper
    PrinterResourceDepleted,
    /// A printer was switched off because it could no longer run
    PrinterAutoOff,
    /// A depleted printer resource was refilled
    PrinterReplenished,
    /// A meeting was booked into a room
    MeetingScheduled,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            EventType::Motion => "motion",
            EventType::DeviceFailure => "device_failure",
            EventType::PowerOutage => "power_outage",
            EventType::PowerRestored => "power_restored",
            EventType::ExternalTemperatureChange => "external_temperature_change",
            EventType::DaylightChange => "daylight_change",
            EventType::PrinterResourceDepleted => "printer_resource_depleted",
            EventType::PrinterAutoOff => "printer_auto_off",
            EventType::PrinterReplenished => "printer_replenished",
            EventType::MeetingScheduled => "meeting_scheduled",
        };
        write!(f, "{}", tag)
    }
}

/// Consumable resources of a printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterResource {
    /// Toner cartridge level
    Toner,
    /// Paper tray level
    Paper,
}

impl fmt::Display for PrinterResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrinterResource::Toner => write!(f, "toner"),
            PrinterResource::Paper => write!(f, "paper"),
        }
    }
}

/// Which occupancy process drives room headcounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyModel {
    /// Arrivals extend a per-room stay deadline; departures happen once it passes
    StayDuration,
    /// Headcount is redrawn from scratch every tick
    Redraw,
}

impl fmt::Display for OccupancyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccupancyModel::StayDuration => write!(f, "stay_duration"),
            OccupancyModel::Redraw => write!(f, "redraw"),
        }
    }
}

impl FromStr for OccupancyModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "stay_duration" | "stay" => Ok(OccupancyModel::StayDuration),
            "redraw" | "simple" => Ok(OccupancyModel::Redraw),
            _ => Err(format!("Unknown occupancy model: {}", s)),
        }
    }
}

/// Who drives printer toner and paper consumption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterConsumption {
    /// Levels only change through explicit level-set commands
    External,
    /// The engine consumes resources while a printer is on
    SelfConsuming,
}

impl fmt::Display for PrinterConsumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrinterConsumption::External => write!(f, "external"),
            PrinterConsumption::SelfConsuming => write!(f, "self_consuming"),
        }
    }
}

impl FromStr for PrinterConsumption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "external" => Ok(PrinterConsumption::External),
            "self_consuming" | "self" | "internal" => Ok(PrinterConsumption::SelfConsuming),
            _ => Err(format!("Unknown printer consumption mode: {}", s)),
        }
    }
}

/// Who decides whether lights are on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightControl {
    /// An external controller switches lights; the engine only forces them off
    External,
    /// Lights follow the room's motion sensor
    MotionDriven,
}

impl fmt::Display for LightControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightControl::External => write!(f, "external"),
            LightControl::MotionDriven => write!(f, "motion_driven"),
        }
    }
}

impl FromStr for LightControl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "external" => Ok(LightControl::External),
            "motion_driven" | "motion" => Ok(LightControl::MotionDriven),
            _ => Err(format!("Unknown light control mode: {}", s)),
        }
    }
}

/// Coarse classification of a simulated hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourBand {
    /// 08:00 to 17:00
    Working,
    /// 17:00 to 22:00
    Evening,
    /// Everything else
    Night,
}
