//! Simulation engine
//!
//! `SimulationEngine` owns the environment state and everything derived from
//! it. One call to [`SimulationEngine::update`] is one tick: the clock moves,
//! then occupancy, temperature, failures, macro-events, device derivation,
//! replenishment and meeting scheduling run in that order.
//!
//! Each per-room stage works on a copy of the room. A room whose stage fails
//! keeps its pre-stage value, the failure is logged and counted, and the tick
//! carries on with the next room and the next stage.

use crate::events::{Alert, AlertLog, EnvironmentEvent, EventLog, MessageFilter, MessageLog, NewAlert};
use crate::events::AgentMessage;
use crate::facility::{build_rooms, BlindsDevice, LightDevice, PrinterDevice, Room};
use crate::simulation::environment::{apply_macro_events, relax_temperature};
use crate::simulation::lifecycle::{
    derive_device_states, inject_failures, replenish_room, DepletionLedger, DeviceKind,
};
use crate::simulation::{
    DeviceInfo, EnvironmentState, MeetingScheduler, MotionSummary, OccupancyTracker,
    SimulationError, SimulationResult, SimulationStatistics, TemperatureSummary, TimeManager,
};
use crate::types::{AlertSeverity, PrinterResource, SimulationConfig};
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, instrument};

/// State document written at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateReport {
    /// Final environment state
    pub state: EnvironmentState,
    /// Stored alerts
    pub alerts: Vec<Alert>,
    /// Stored agent messages
    pub messages: Vec<AgentMessage>,
    /// Run counters
    pub statistics: SimulationStatistics,
}

/// What one tick did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Sequence number of the tick, starting at 1
    pub tick: u64,
    /// Simulated time after the tick
    pub simulation_time: NaiveDateTime,
    /// Events recorded during the tick
    pub events_recorded: usize,
    /// Rooms or stages that failed and were rolled back
    pub stage_failures: u64,
}

/// The office simulation engine
#[derive(Debug)]
pub struct SimulationEngine {
    pub(crate) config: SimulationConfig,
    pub(crate) state: EnvironmentState,
    pub(crate) rng: StdRng,
    pub(crate) occupancy: OccupancyTracker,
    pub(crate) meetings: MeetingScheduler,
    pub(crate) depletion: DepletionLedger,
    pub(crate) events: EventLog,
    pub(crate) alerts: AlertLog,
    pub(crate) messages: MessageLog,
    pub(crate) statistics: SimulationStatistics,
    time_manager: TimeManager,
}

impl SimulationEngine {
    /// Build an engine from a validated configuration
    ///
    /// Printers start with uniformly random 50-100% toner and paper. Without a
    /// configured seed the random generator is seeded from entropy.
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let start = config.start_time.unwrap_or_else(TimeManager::wall_clock_start);
        let rooms = build_rooms(&config.rooms, config.initial_heating, &mut rng);
        let state = EnvironmentState::new(start, rooms, config.time_speed);

        let time_manager = TimeManager::new();
        let statistics = SimulationStatistics::new(state.rooms.len(), state.devices().len(), start);

        info!(
            "Initialized office simulation with {} rooms and {} devices at {}",
            statistics.total_rooms, statistics.total_devices, start
        );
        crate::sim_event!(
            info,
            "engine_created",
            rooms = statistics.total_rooms,
            occupancy_model = tracing::field::display(config.occupancy_model),
            printer_consumption = tracing::field::display(config.printer_consumption),
            light_control = tracing::field::display(config.light_control),
        );

        Ok(Self {
            occupancy: OccupancyTracker::new(config.occupancy_model, time_manager.clone()),
            meetings: MeetingScheduler::new(time_manager.clone()),
            depletion: DepletionLedger::new(),
            events: EventLog::new(),
            alerts: AlertLog::new(),
            messages: MessageLog::new(),
            statistics,
            time_manager,
            config,
            state,
            rng,
        })
    }

    /// Run one tick covering `delta_minutes × time_speed` simulated minutes
    ///
    /// Only a clock failure aborts the tick; every later stage is contained.
    #[instrument(skip(self), fields(tick = self.statistics.ticks + 1))]
    pub fn update(&mut self, delta_minutes: f64) -> SimulationResult<TickReport> {
        let events_before = self.events.len();
        let failures_before = self.statistics.stage_failures;
        let time_speed = self.state.time_speed;

        let now = self.time_manager.advance(self.state.simulation_time, delta_minutes, time_speed)?;
        self.state.simulation_time = now;

        self.run_occupancy(now);
        self.run_environmental();
        self.run_failures(now);
        self.run_macro_events();
        self.run_device_derivation(now);
        self.run_replenishment(now);
        self.run_meetings(now);

        self.statistics.record_tick(delta_minutes * time_speed);
        let report = TickReport {
            tick: self.statistics.ticks,
            simulation_time: now,
            events_recorded: self.events.len().saturating_sub(events_before),
            stage_failures: self.statistics.stage_failures - failures_before,
        };
        debug!(
            "Tick {} reached {} with {} new events",
            report.tick, report.simulation_time, report.events_recorded
        );
        Ok(report)
    }

    fn run_occupancy(&mut self, now: NaiveDateTime) {
        let tracker = &self.occupancy;
        let rng = &mut self.rng;
        let steps = run_contained(
            "occupancy",
            &mut self.state.rooms,
            &mut self.events,
            &mut self.statistics,
            |room, pending| tracker.step_room(room, now, rng, pending),
        );

        for step in &steps {
            self.statistics.arrivals += u64::from(step.arrivals);
            self.statistics.departures += u64::from(step.departures);
            self.occupancy.commit(step);
        }
    }

    fn run_environmental(&mut self) {
        let external = self.state.external_temperature;
        let outage = self.state.power_outage;
        let rng = &mut self.rng;
        run_contained(
            "environmental",
            &mut self.state.rooms,
            &mut self.events,
            &mut self.statistics,
            |room, _| relax_temperature(room, external, outage, rng),
        );
    }

    fn run_failures(&mut self, now: NaiveDateTime) {
        let probability = self.config.failure_probability;
        let rng = &mut self.rng;
        let failures = run_contained(
            "failures",
            &mut self.state.rooms,
            &mut self.events,
            &mut self.statistics,
            |room, pending| Ok(inject_failures(room, probability, now, rng, pending)),
        );

        for failure in failures.into_iter().flatten() {
            self.statistics.device_failures += 1;
            // Motion drop-outs are silent sensor failures
            if self.config.auto_alerts && failure.kind != DeviceKind::MotionSensor {
                self.raise_alert(NewAlert::new(
                    "device_failure",
                    failure.device_id.clone(),
                    format!("Device {} is broken", failure.device_id),
                    AlertSeverity::Error,
                ));
            }
        }
    }

    fn run_macro_events(&mut self) {
        let outcome = apply_macro_events(&mut self.state, &mut self.rng);
        if outcome.outage_started {
            self.statistics.power_outages += 1;
            crate::sim_event!(warn, "power_outage", at = tracing::field::display(self.state.simulation_time));
        }
        for event in outcome.events {
            self.events.record(event);
        }
    }

    fn run_device_derivation(&mut self, now: NaiveDateTime) {
        let outage = self.state.power_outage;
        let consumption = self.config.printer_consumption;
        let light_control = self.config.light_control;
        let rng = &mut self.rng;
        let outcomes = run_contained(
            "device_derivation",
            &mut self.state.rooms,
            &mut self.events,
            &mut self.statistics,
            |room, pending| {
                Ok(derive_device_states(room, outage, consumption, light_control, now, rng, pending))
            },
        );

        for outcome in outcomes {
            self.statistics.printer_auto_offs += outcome.printers_auto_off as u64;
            for depletion in outcome.depletions {
                self.depletion.record(&depletion, now);
                self.statistics.resource_depletions += 1;
                self.raise_depletion_alert(&depletion.printer_id, depletion.resource);
            }
        }
    }

    fn run_replenishment(&mut self, now: NaiveDateTime) {
        let ledger = &self.depletion;
        let refills = run_contained(
            "replenishment",
            &mut self.state.rooms,
            &mut self.events,
            &mut self.statistics,
            |room, pending| Ok(replenish_room(room, ledger, now, pending)),
        );

        for refill in refills.into_iter().flatten() {
            self.depletion.clear(&refill.printer_id, refill.resource);
            self.statistics.replenishments += 1;
        }
    }

    fn run_meetings(&mut self, now: NaiveDateTime) {
        let horizon = match self.meetings.horizon(now) {
            Ok(horizon) => horizon,
            Err(err) => {
                error!("Meeting scheduling skipped: {}", err);
                self.statistics.record_stage_failure();
                return;
            }
        };

        let scheduler = &self.meetings;
        let rng = &mut self.rng;
        let passes = run_contained(
            "meetings",
            &mut self.state.rooms,
            &mut self.events,
            &mut self.statistics,
            |room, pending| scheduler.schedule_room(room, now, horizon, rng, pending),
        );

        for pass in passes {
            self.statistics.meetings_scheduled += pass.created as u64;
            self.meetings.commit(pass, now);
        }
    }

    /// Store an alert, filling in the room of its device from the layout
    pub(crate) fn raise_alert(&mut self, mut alert: NewAlert) -> Alert {
        if alert.room_id.is_none() || alert.room_name.is_none() {
            if let Some(room) = self.state.room_of_device(&alert.device_id) {
                alert.room_id.get_or_insert_with(|| room.id.clone());
                alert.room_name.get_or_insert_with(|| room.name.clone());
            }
        }
        let alert = alert.into_alert(self.state.simulation_time);
        debug!("Alert {} ({}) for {}", alert.id, alert.severity, alert.device_id);
        self.alerts.push(alert.clone());
        alert
    }

    pub(crate) fn raise_depletion_alert(&mut self, printer_id: &str, resource: PrinterResource) {
        if !self.config.auto_alerts {
            return;
        }
        self.raise_alert(NewAlert::new(
            format!("{}_empty", resource),
            printer_id,
            format!("Printer {} is out of {}", printer_id, resource),
            AlertSeverity::Warning,
        ));
    }

    // Queries

    /// Active configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Borrow the live state
    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }

    /// Clone the full state
    pub fn snapshot(&self) -> EnvironmentState {
        self.state.clone()
    }

    /// Current simulated time
    pub fn simulation_time(&self) -> NaiveDateTime {
        self.state.simulation_time
    }

    /// Every recorded event, oldest first
    pub fn events(&self) -> &[EnvironmentEvent] {
        self.events.events()
    }

    /// One room with all its devices and meetings
    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.state.room(room_id)
    }

    /// Office-wide temperature view
    pub fn temperature_summary(&self) -> TemperatureSummary {
        self.state.temperature_summary()
    }

    /// Office-wide motion view
    pub fn motion_summary(&self) -> MotionSummary {
        self.state.motion_summary()
    }

    /// Every device as one flat list
    pub fn devices(&self) -> Vec<DeviceInfo> {
        self.state.devices()
    }

    /// Look up a light
    pub fn light(&self, light_id: &str) -> Option<&LightDevice> {
        self.state.light(light_id)
    }

    /// Look up a printer
    pub fn printer(&self, printer_id: &str) -> Option<&PrinterDevice> {
        self.state.printer(printer_id)
    }

    /// Look up blinds
    pub fn blinds(&self, blinds_id: &str) -> Option<&BlindsDevice> {
        self.state.blinds(blinds_id)
    }

    /// All stored alerts, oldest first
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.alerts()
    }

    /// Alerts strictly newer than `after`
    pub fn alerts_since(&self, after: NaiveDateTime) -> Vec<Alert> {
        self.alerts.since(after)
    }

    /// Stored messages matching a filter, oldest first
    pub fn messages(&self, filter: &MessageFilter) -> Vec<AgentMessage> {
        self.messages.query(filter)
    }

    /// When a printer resource ran out, if it is currently empty
    pub fn depleted_at(&self, printer_id: &str, resource: PrinterResource) -> Option<NaiveDateTime> {
        self.depletion.depleted_at(printer_id, resource)
    }

    /// Current stay deadline of a room
    pub fn stay_until(&self, room_id: &str) -> Option<NaiveDateTime> {
        self.occupancy.stay_until(room_id)
    }

    /// Running counters
    pub fn statistics(&self) -> &SimulationStatistics {
        &self.statistics
    }

    /// Everything an agent or a later run needs to inspect the final state
    pub fn state_report(&self) -> StateReport {
        StateReport {
            state: self.snapshot(),
            alerts: self.alerts(),
            messages: self.messages(&MessageFilter::all()),
            statistics: self.statistics.clone(),
        }
    }

    /// Write [`Self::state_report`] as pretty JSON
    pub fn write_state_report(&self, path: impl AsRef<Path>) -> SimulationResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.state_report())?;
        fs::write(path, json)?;
        info!("Wrote state report to {}", path.display());
        Ok(())
    }

    /// Put back a state taken with [`SimulationEngine::snapshot`]
    pub(crate) fn restore_state(&mut self, state: EnvironmentState) {
        self.state = state;
    }

    /// Mutable access to the state for scenario set-up in tests
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut EnvironmentState {
        &mut self.state
    }
}

/// Run a per-room step against a copy of every room
///
/// Successful rooms and their events are committed; a failing room is left as
/// it was before the stage and its events are dropped.
fn run_contained<T, F>(
    stage: &'static str,
    rooms: &mut [Room],
    events: &mut EventLog,
    statistics: &mut SimulationStatistics,
    mut step: F,
) -> Vec<T>
where
    F: FnMut(&mut Room, &mut Vec<EnvironmentEvent>) -> SimulationResult<T>,
{
    let mut outputs = Vec::with_capacity(rooms.len());
    for room in rooms.iter_mut() {
        let mut working = room.clone();
        let mut pending = Vec::new();
        match step(&mut working, &mut pending) {
            Ok(output) => {
                *room = working;
                for event in pending {
                    events.record(event);
                }
                outputs.push(output);
            }
            Err(err) => {
                let err = match err {
                    SimulationError::StageError { .. } => err,
                    other => SimulationError::stage_error(stage, format!("{}: {}", room.id, other)),
                };
                error!("Room {} kept its previous state: {}", room.id, err);
                statistics.record_stage_failure();
            }
        }
    }
    outputs
}
