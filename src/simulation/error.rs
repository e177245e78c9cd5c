//! Error types and handling
//!
//! This module contains the engine's error types: `SimulationError` for failures
//! inside a tick or during construction, and `CommandError` for control
//! operations that name an unknown target or would break a device invariant.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Errors that can occur while building or ticking the simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// Simulated time arithmetic failed
    #[error("Time management error: {0}")]
    TimeError(String),

    /// A tick stage failed for one room or as a whole
    #[error("Stage '{stage}' failed: {message}")]
    StageError {
        /// Name of the failing stage
        stage: &'static str,
        /// What went wrong
        message: String,
    },

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<crate::types::ConfigValidationError> for SimulationError {
    fn from(error: crate::types::ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a time management error
    pub fn time_error(msg: impl Into<String>) -> Self {
        Self::TimeError(msg.into())
    }

    /// Create a stage error
    pub fn stage_error(stage: &'static str, msg: impl Into<String>) -> Self {
        Self::StageError { stage, message: msg.into() }
    }

    /// Check if the tick can carry on after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::ConfigurationError(_) => false,
            SimulationError::TimeError(_) => true,
            SimulationError::StageError { .. } => true,
            SimulationError::IoError(_) => true,
            SimulationError::SerializationError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::TimeError(_) => "Time Management",
            SimulationError::StageError { .. } => "Stage",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }

    /// Log the error at a level matching its category
    pub fn log(&self) {
        if self.is_recoverable() {
            warn!("Recoverable error in {}: {}", self.category(), self);
        } else {
            error!("Critical error in {}: {}", self.category(), self);
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

/// Why a control command did not take effect
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The referenced room or device does not exist
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Kind of target, e.g. `printer`
        kind: &'static str,
        /// The id that was looked up
        id: String,
    },

    /// The command would violate a device invariant
    #[error("{reason}")]
    Rejected {
        /// Human-readable reason
        reason: String,
    },
}

impl CommandError {
    /// Create a not-found error
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    /// Create an invariant-violation error
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected { reason: reason.into() }
    }

    /// Check if the target did not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CommandError::NotFound { .. })
    }
}

/// Result type for control commands
pub type CommandResult<T = ()> = Result<T, CommandError>;

/// Serializable success indicator handed back to a transport shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Whether the command took effect
    pub success: bool,
    /// Set when the command failed because its target does not exist
    pub not_found: bool,
    /// Human-readable result
    pub message: String,
}

impl CommandOutcome {
    /// Successful outcome with a message
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, not_found: false, message: message.into() }
    }
}

impl From<CommandError> for CommandOutcome {
    fn from(error: CommandError) -> Self {
        Self { success: false, not_found: error.is_not_found(), message: error.to_string() }
    }
}
