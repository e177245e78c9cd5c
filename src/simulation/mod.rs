//! Simulation engine and control
//!
//! This module contains the tick engine, the stages it runs, the control
//! surface agents use, statistics collection, and error handling.
//!
//! # Overview
//!
//! - **SimulationEngine**: Owns the environment state and runs one tick per `update`
//! - **TimeManager**: Simulated clock arithmetic and working-day calendar
//! - **OccupancyTracker**: Arrivals, departures and motion per room
//! - **MeetingScheduler**: Rolling, slot-based meeting generation
//! - **ControlCommand**: Operations external agents apply to the environment
//! - **EngineHandle / TickDriver**: Shared access and a periodic real-time driver
//! - **SimulationStatistics**: Counters and the exit report
//!
//! # Usage Example
//!
//! ```rust
//! use office_environment_simulator::simulation::*;
//! use office_environment_simulator::types::*;
//!
//! let config = SimulationConfig {
//!     seed: Some(7),
//!     ..Default::default()
//! };
//!
//! let mut engine = SimulationEngine::new(config).unwrap();
//! engine.update(5.0).unwrap();
//!
//! let outcome = engine.apply_command(ControlCommand::SetExternalTemperature { temperature: 18.0 });
//! assert!(outcome.success);
//! assert_eq!(engine.state().external_temperature, 18.0);
//! ```

pub mod control;
pub mod driver;
pub mod engine;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod meetings;
pub mod occupancy;
pub mod state;
pub mod statistics;
pub mod time_manager;

// Re-export the public types for convenience
pub use control::*;
pub use driver::*;
pub use engine::*;
pub use error::*;
pub use logging::*;
pub use meetings::*;
pub use occupancy::*;
pub use state::*;
pub use statistics::*;
pub use time_manager::*;
