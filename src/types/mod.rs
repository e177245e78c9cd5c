//! Core types, identifiers and configuration for the office environment simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: UUID-based identifiers for alerts and agent messages
//! - **Enums**: Device states, log classifications, and engine behavior switches
//! - **Configuration**: Simulation configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use office_environment_simulator::types::*;
//!
//! let alert_id = AlertId::new();
//! assert!(alert_id.to_string().starts_with("ALERT_"));
//!
//! let config = SimulationConfig {
//!     time_speed: 10.0,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
