//! Environmental model
//!
//! Per-room temperature relaxation plus the office-wide random processes:
//! building power, the outside temperature and daylight.

use crate::events::EnvironmentEvent;
use crate::facility::Room;
use crate::simulation::{EnvironmentState, SimulationError, SimulationResult};
use crate::types::EventType;
use rand::Rng;
use tracing::{debug, info, warn};

/// Temperature the heating controller aims for (°C)
pub const HEATING_TARGET: f64 = 22.0;

/// Lowest outside temperature (°C)
pub const MIN_EXTERNAL_TEMPERATURE: f64 = -10.0;

/// Highest outside temperature (°C)
pub const MAX_EXTERNAL_TEMPERATURE: f64 = 35.0;

/// Chance per tick that power fails
pub const POWER_FAILURE_PROBABILITY: f64 = 0.005;

/// Chance per tick that power comes back during an outage
pub const POWER_RESTORE_PROBABILITY: f64 = 0.1;

/// Chance per tick of an outside temperature jump
pub const EXTERNAL_TEMPERATURE_JUMP_PROBABILITY: f64 = 0.01;

/// Chance per tick of a daylight change
pub const DAYLIGHT_CHANGE_PROBABILITY: f64 = 0.02;

/// Clamp an outside temperature into its allowed range
pub fn clamp_external_temperature(temperature: f64) -> f64 {
    if temperature.is_nan() {
        return MIN_EXTERNAL_TEMPERATURE;
    }
    temperature.clamp(MIN_EXTERNAL_TEMPERATURE, MAX_EXTERNAL_TEMPERATURE)
}

/// Move a room's temperature one tick toward its target
///
/// Heating only acts while power is available.
pub fn relax_temperature<R: Rng>(
    room: &mut Room,
    external_temperature: f64,
    power_outage: bool,
    rng: &mut R,
) -> SimulationResult<()> {
    let current = room.temperature();
    let heating = room.heating_on && !power_outage;

    let next = if heating {
        let adjustment = (HEATING_TARGET - current) * 0.1;
        let noise = if adjustment == 0.0 { 0.0 } else { rng.gen_range(0.0..0.2) * adjustment.signum() };
        current + adjustment + noise
    } else if current > external_temperature {
        current - ((current - external_temperature) * 0.05 + rng.gen_range(0.0..0.1))
    } else {
        current - rng.gen_range(0.0..0.02)
    };

    if !next.is_finite() {
        return Err(SimulationError::stage_error(
            "environmental",
            format!("{}: temperature diverged from {:.2}", room.id, current),
        ));
    }

    room.temperature_sensor.set(next);
    Ok(())
}

/// Office-wide changes made by one macro-event pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacroEventOutcome {
    /// Power went out this tick
    pub outage_started: bool,
    /// Power came back this tick
    pub power_restored: bool,
    /// Events to record
    pub events: Vec<EnvironmentEvent>,
}

/// Run the power toggle, the outside temperature jump and the daylight reset
///
/// An outage forces every room's heating flag off. Flags stay off after power
/// returns until a command switches them back on.
pub fn apply_macro_events<R: Rng>(state: &mut EnvironmentState, rng: &mut R) -> MacroEventOutcome {
    let now = state.simulation_time;
    let mut outcome = MacroEventOutcome::default();

    if state.power_outage {
        if rng.gen_bool(POWER_RESTORE_PROBABILITY) {
            state.power_outage = false;
            outcome.power_restored = true;
            info!("Power restored at {}", now);
            outcome
                .events
                .push(EnvironmentEvent::new(EventType::PowerRestored, now, "Building power restored"));
        }
    } else if rng.gen_bool(POWER_FAILURE_PROBABILITY) {
        state.power_outage = true;
        outcome.outage_started = true;
        for room in &mut state.rooms {
            room.heating_on = false;
        }
        warn!("Power outage at {}, heating off in all rooms", now);
        outcome
            .events
            .push(EnvironmentEvent::new(EventType::PowerOutage, now, "Building power failed"));
    }

    if rng.gen_bool(EXTERNAL_TEMPERATURE_JUMP_PROBABILITY) {
        let previous = state.external_temperature;
        state.external_temperature = clamp_external_temperature(previous + rng.gen_range(-5.0..=10.0));
        debug!("External temperature {:.1} -> {:.1}", previous, state.external_temperature);
        outcome.events.push(EnvironmentEvent::new(
            EventType::ExternalTemperatureChange,
            now,
            format!(
                "External temperature changed from {:.1}°C to {:.1}°C",
                previous, state.external_temperature
            ),
        ));
    }

    if rng.gen_bool(DAYLIGHT_CHANGE_PROBABILITY) {
        state.daylight_intensity = rng.gen_range(0.3..=1.0);
        outcome.events.push(EnvironmentEvent::new(
            EventType::DaylightChange,
            now,
            format!("Daylight intensity is now {:.2}", state.daylight_intensity),
        ));
    }

    outcome
}
