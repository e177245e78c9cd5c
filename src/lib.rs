//! Office Environment Simulator
//!
//! A tick-driven simulation of a multi-room office that external control
//! agents observe and manipulate.
//!
//! # Overview
//!
//! The engine keeps a simulated clock and, for every room, the people in it,
//! its temperature, its devices and its meeting calendar. Each tick advances
//! the clock and runs occupancy, temperature relaxation, device failures,
//! building-wide macro-events, device state derivation, printer
//! replenishment and meeting scheduling. Agents read the resulting state and
//! drive it back through a small set of control commands.
//!
//! ## Key Features
//!
//! - **Simulated Clock**: Scalable time speed and a working-day calendar
//! - **Occupancy**: Stay-duration or hourly redraw models with motion sensing
//! - **Environment**: Temperature relaxation, power outages, daylight and weather jumps
//! - **Device Lifecycle**: Failures, printer resource consumption and replenishment
//! - **Meetings**: Idempotent rolling schedule per room
//! - **Bounded Logs**: Events, the 100 latest alerts and the 200 latest agent messages
//! - **Control Surface**: Validated commands with explicit success or failure
//!
//! ## Quick Start
//!
//! ```rust
//! use office_environment_simulator::*;
//!
//! let config = SimulationConfig {
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut engine = SimulationEngine::new(config)?;
//! for _ in 0..60 {
//!     engine.update(1.0)?;
//! }
//!
//! let summary = engine.temperature_summary();
//! println!("{} rooms, average {:.1} C", summary.rooms.len(), summary.average_temperature);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Identifiers, enums and configuration
//! - [`facility`]: Devices, rooms and the office layout
//! - [`events`]: Event, alert and agent-message logs
//! - [`simulation`]: Engine, stages, control surface and tick driver
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │  Facility   │    │   Events    │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Devices     │    │ EventLog    │
//! │ Enums       │    │ Rooms       │    │ AlertLog    │
//! │ Config      │    │ Layout      │    │ MessageLog  │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   ▲                   ▲
//!        │                   │                   │
//!        └─────────┬─────────┴───────────────────┘
//!                  │
//!          ┌─────────────┐    ┌─────────────┐
//!          │ Simulation  │◄───┤ TickDriver  │
//!          │             │    │             │
//!          │ Engine      │    │ EngineHandle│
//!          │ Commands    │    │             │
//!          └─────────────┘    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod events;
pub mod facility;
pub mod simulation;
pub mod types;

// Core types and identifiers
pub use types::{
    AlertId, AlertSeverity, BlindsState, ConfigValidationError, DeviceState, EventType,
    LightControl, MessageId, MessageType, OccupancyModel, PrinterConsumption, PrinterResource,
    SimulationConfig,
};

// Facility types
pub use facility::{
    BlindsDevice, LightDevice, Meeting, MotionSensor, PrinterDevice, Room, RoomSpec,
    TemperatureSensor,
};

// Logs
pub use events::{
    AgentMessage, Alert, AlertLog, EnvironmentEvent, EventLog, MessageFilter, MessageLog,
    NewAlert, NewMessage,
};

// Simulation types and functionality
pub use simulation::{
    CommandError, CommandOutcome, ControlCommand, DeviceInfo, EngineHandle, EnvironmentState,
    MotionSummary, SimulationEngine, SimulationError, SimulationStatistics, StateReport,
    TemperatureSummary, TickDriver, TickReport, TimeManager,
};
