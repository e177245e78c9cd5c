//! Device lifecycle
//!
//! Failure injection, device-state derivation (including optional printer
//! self-consumption), depletion bookkeeping and replenishment.
//!
//! The printer invariant (ON implies toner and paper above zero) is restored by
//! [`derive_device_states`] every tick and by every control command that could
//! break it, so no published snapshot ever violates it.

use crate::events::EnvironmentEvent;
use crate::facility::{PrinterDevice, Room};
use crate::types::{DeviceState, EventType, LightControl, PrinterConsumption, PrinterResource};
use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Minutes a resource must stay depleted before it can be refilled
pub const REPLENISH_AFTER_MINUTES: i64 = 60;

/// Self-consumption leaving less than this is rounded down to empty
pub const DEPLETION_SNAP_THRESHOLD: f64 = 1.0;

/// Kind of device a failure hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// A light
    Light,
    /// A printer
    Printer,
    /// A motion sensor
    MotionSensor,
}

/// One injected failure
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceFailure {
    /// Failed device
    pub device_id: String,
    /// Kind of the failed device
    pub kind: DeviceKind,
}

/// One resource that went from non-zero to zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Depletion {
    /// Printer whose resource ran out
    pub printer_id: String,
    /// Resource that ran out
    pub resource: PrinterResource,
}

/// Result of the derivation pass for one room
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivationOutcome {
    /// Printers switched off to keep the printer invariant
    pub printers_auto_off: usize,
    /// Lights switched off by power loss or motion control
    pub lights_switched_off: usize,
    /// Resources emptied by self-consumption
    pub depletions: Vec<Depletion>,
}

/// Break lights and printers, and drop motion readings, at the configured rate
///
/// `failure_probability` is an hourly rate; the per-tick chance is one sixtieth
/// of it for lights and printers and half that for motion sensors.
pub fn inject_failures<R: Rng>(
    room: &mut Room,
    failure_probability: f64,
    now: NaiveDateTime,
    rng: &mut R,
    events: &mut Vec<EnvironmentEvent>,
) -> Vec<DeviceFailure> {
    let device_rate = (failure_probability / 60.0).clamp(0.0, 1.0);
    let sensor_rate = (failure_probability / 2.0 / 60.0).clamp(0.0, 1.0);
    let mut failures = Vec::new();

    for light in room.lights.iter_mut().filter(|light| !light.state.is_broken()) {
        if rng.gen_bool(device_rate) {
            light.state = DeviceState::Broken;
            failures.push(DeviceFailure { device_id: light.id.clone(), kind: DeviceKind::Light });
        }
    }

    if let Some(printer) = room.printer.as_mut().filter(|printer| !printer.state.is_broken()) {
        if rng.gen_bool(device_rate) {
            printer.state = DeviceState::Broken;
            failures.push(DeviceFailure { device_id: printer.id.clone(), kind: DeviceKind::Printer });
        }
    }

    if room.motion_sensor.motion_detected && rng.gen_bool(sensor_rate) {
        room.motion_sensor.clear();
        failures.push(DeviceFailure {
            device_id: room.motion_sensor.id.clone(),
            kind: DeviceKind::MotionSensor,
        });
    }

    for failure in &failures {
        info!("Device {} failed in {}", failure.device_id, room.id);
        let description = match failure.kind {
            DeviceKind::MotionSensor => format!("Motion sensor {} missed a reading", failure.device_id),
            _ => format!("Device {} is broken", failure.device_id),
        };
        events.push(
            EnvironmentEvent::new(EventType::DeviceFailure, now, description)
                .in_room(&room.id)
                .for_device(&failure.device_id),
        );
    }

    failures
}

/// Bring lights and printers into line with power, occupancy and resources
pub fn derive_device_states<R: Rng>(
    room: &mut Room,
    power_outage: bool,
    consumption: PrinterConsumption,
    light_control: LightControl,
    now: NaiveDateTime,
    rng: &mut R,
    events: &mut Vec<EnvironmentEvent>,
) -> DerivationOutcome {
    let mut outcome = DerivationOutcome::default();
    let occupied = room.is_occupied();
    let motion = room.motion_sensor.motion_detected;

    if let Some(printer) = room.printer.as_mut() {
        if consumption == PrinterConsumption::SelfConsuming && !power_outage {
            outcome.depletions = consume_resources(printer, occupied, rng);
            for depletion in &outcome.depletions {
                events.push(
                    EnvironmentEvent::new(
                        EventType::PrinterResourceDepleted,
                        now,
                        format!("Printer {} ran out of {}", printer.id, depletion.resource),
                    )
                    .in_room(&room.id)
                    .for_device(&printer.id),
                );
            }
        }

        if printer.state.is_on() && (!printer.has_resources() || power_outage) {
            printer.state = DeviceState::Off;
            outcome.printers_auto_off += 1;
            let reason = if power_outage { "power outage" } else { "empty toner or paper" };
            debug!("Printer {} switched off ({})", printer.id, reason);
            events.push(
                EnvironmentEvent::new(
                    EventType::PrinterAutoOff,
                    now,
                    format!("Printer {} turned off: {}", printer.id, reason),
                )
                .in_room(&room.id)
                .for_device(&printer.id),
            );
        }
    }

    for light in room.lights.iter_mut().filter(|light| !light.state.is_broken()) {
        let wanted = match light_control {
            _ if power_outage => DeviceState::Off,
            LightControl::External => light.state,
            LightControl::MotionDriven if motion => DeviceState::On,
            LightControl::MotionDriven => DeviceState::Off,
        };
        if wanted != light.state {
            if wanted == DeviceState::Off {
                outcome.lights_switched_off += 1;
            }
            light.state = wanted;
        }
    }

    outcome
}

/// Burn toner and paper on a printer that is on
///
/// Returns the resources that ran out during this tick.
fn consume_resources<R: Rng>(printer: &mut PrinterDevice, occupied: bool, rng: &mut R) -> Vec<Depletion> {
    if !printer.state.is_on() || !printer.has_resources() {
        return Vec::new();
    }

    let (toner_use, paper_use) = if occupied {
        (rng.gen_range(0.5..=1.5), rng.gen_range(1.0..=2.5))
    } else {
        (rng.gen_range(0.15..=0.45), rng.gen_range(0.3..=0.75))
    };

    let mut depletions = Vec::new();
    for (resource, level, usage) in [
        (PrinterResource::Toner, &mut printer.toner_level, toner_use),
        (PrinterResource::Paper, &mut printer.paper_level, paper_use),
    ] {
        let remaining = *level - usage;
        *level = if remaining < DEPLETION_SNAP_THRESHOLD { 0.0 } else { remaining };
        if *level == 0.0 {
            depletions.push(Depletion { printer_id: printer.id.clone(), resource });
        }
    }
    depletions
}

/// When each printer resource last ran out
///
/// Entries exist only while the resource is at zero.
#[derive(Debug, Clone, Default)]
pub struct DepletionLedger {
    toner: HashMap<String, NaiveDateTime>,
    paper: HashMap<String, NaiveDateTime>,
}

impl DepletionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, resource: PrinterResource) -> &HashMap<String, NaiveDateTime> {
        match resource {
            PrinterResource::Toner => &self.toner,
            PrinterResource::Paper => &self.paper,
        }
    }

    fn table_mut(&mut self, resource: PrinterResource) -> &mut HashMap<String, NaiveDateTime> {
        match resource {
            PrinterResource::Toner => &mut self.toner,
            PrinterResource::Paper => &mut self.paper,
        }
    }

    /// Time the resource ran out, if it is currently depleted
    pub fn depleted_at(&self, printer_id: &str, resource: PrinterResource) -> Option<NaiveDateTime> {
        self.table(resource).get(printer_id).copied()
    }

    /// Track a level change
    ///
    /// Non-zero to zero records `now`; any level above zero clears the entry.
    /// Returns true when a new depletion was recorded.
    pub fn observe(
        &mut self,
        printer_id: &str,
        resource: PrinterResource,
        previous: f64,
        level: f64,
        now: NaiveDateTime,
    ) -> bool {
        if level > 0.0 {
            self.table_mut(resource).remove(printer_id);
            false
        } else if previous > 0.0 {
            self.table_mut(resource).insert(printer_id.to_string(), now);
            true
        } else {
            false
        }
    }

    /// Record a depletion found by self-consumption
    pub fn record(&mut self, depletion: &Depletion, now: NaiveDateTime) {
        self.table_mut(depletion.resource).insert(depletion.printer_id.clone(), now);
    }

    /// Forget a depletion after a refill
    pub fn clear(&mut self, printer_id: &str, resource: PrinterResource) {
        self.table_mut(resource).remove(printer_id);
    }

    /// Number of depleted resources across all printers
    pub fn len(&self) -> usize {
        self.toner.len() + self.paper.len()
    }

    /// Check if nothing is depleted
    pub fn is_empty(&self) -> bool {
        self.toner.is_empty() && self.paper.is_empty()
    }
}

/// Refill a room's depleted printer resources that are due
///
/// A resource is due once it has been empty for at least an hour while
/// somebody is in the room. Toner and paper are checked independently.
pub fn replenish_room(
    room: &mut Room,
    ledger: &DepletionLedger,
    now: NaiveDateTime,
    events: &mut Vec<EnvironmentEvent>,
) -> Vec<Depletion> {
    let mut refilled = Vec::new();
    if !room.is_occupied() {
        return refilled;
    }
    let Some(printer) = room.printer.as_mut() else {
        return refilled;
    };

    for resource in [PrinterResource::Toner, PrinterResource::Paper] {
        let Some(depleted_at) = ledger.depleted_at(&printer.id, resource) else {
            continue;
        };
        if now - depleted_at < Duration::minutes(REPLENISH_AFTER_MINUTES) {
            continue;
        }

        match resource {
            PrinterResource::Toner => printer.toner_level = 100.0,
            PrinterResource::Paper => printer.paper_level = 100.0,
        }
        info!("Replenished {} of printer {}", resource, printer.id);
        events.push(
            EnvironmentEvent::new(
                EventType::PrinterReplenished,
                now,
                format!("Printer {} {} refilled to 100%", printer.id, resource),
            )
            .in_room(&room.id)
            .for_device(&printer.id),
        );
        refilled.push(Depletion { printer_id: printer.id.clone(), resource });
    }

    refilled
}
