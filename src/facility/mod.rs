//! Rooms, devices and the office layout
//!
//! # Overview
//!
//! - **Devices**: lights, printers, motion and temperature sensors, blinds
//! - **Room**: the devices of one room plus its headcount, heating flag and meetings
//! - **Layout**: the static room list the engine is built from
//!
//! # Usage Example
//!
//! ```rust
//! use office_environment_simulator::facility::*;
//! use rand::SeedableRng;
//!
//! let entry = RoomSpec::new("room_208", "Team Office").with_printer();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let room = build_room(&entry, true, &mut rng);
//! assert_eq!(room.printer.unwrap().id, "printer_208");
//! ```

pub mod devices;
pub mod layout;
pub mod room;

// Re-export all public types for convenience
pub use devices::{
    clamp_room_temperature, BlindsDevice, LightDevice, Meeting, MotionSensor, PrinterDevice,
    TemperatureSensor, MAX_ROOM_TEMPERATURE, MIN_ROOM_TEMPERATURE,
};
pub use layout::{build_room, build_rooms, default_office_layout, validate_layout, RoomSpec};
pub use room::Room;
