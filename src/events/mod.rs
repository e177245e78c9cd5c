//! Event, alert and agent-message logs
//!
//! # Overview
//!
//! - **EventLog**: append-only record of what happened, cleared only on request
//! - **AlertLog**: the 100 most recent alerts
//! - **MessageLog**: the 200 most recent inter-agent messages, with filtering
//!
//! # Usage Example
//!
//! ```rust
//! use office_environment_simulator::events::*;
//! use office_environment_simulator::types::MessageType;
//! use chrono::NaiveDate;
//!
//! let now = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let mut messages = MessageLog::new();
//! messages.push(NewMessage::broadcast("facility", MessageType::Inform, "Fire drill at 10").into_message(now));
//! assert_eq!(messages.query(&MessageFilter::inbox("printing")).len(), 1);
//! ```

pub mod alert;
pub mod bounded;
pub mod environment_event;
pub mod message;

// Re-export all public types for convenience
pub use alert::*;
pub use bounded::*;
pub use environment_event::*;
pub use message::*;
