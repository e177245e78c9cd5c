//! Room occupancy process
//!
//! Two models are available. The stay-duration model keeps a per-room
//! "stay until" deadline: people arrive with an hour-dependent probability and
//! leave in groups once the deadline passes. The redraw model throws the
//! headcount away every tick and draws a new one, which is handy when a test
//! wants occupancy that does not depend on history.

use crate::events::EnvironmentEvent;
use crate::facility::Room;
use crate::simulation::{SimulationResult, TimeManager};
use crate::types::{EventType, HourBand, OccupancyModel};
use chrono::{NaiveDateTime, Timelike};
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// Most people a room will hold
pub const MAX_ROOM_OCCUPANCY: u32 = 8;

/// Chance per tick that an occupied room reports motion without new arrivals
pub const MOTION_WHILE_OCCUPIED_PROBABILITY: f64 = 0.3;

/// Result of one occupancy step for one room
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyStep {
    /// Room the step was computed for
    pub room_id: String,
    /// New stay deadline of the room
    pub stay_until: Option<NaiveDateTime>,
    /// People who entered
    pub arrivals: u32,
    /// People who left
    pub departures: u32,
}

/// Per-room arrival/departure process
#[derive(Debug, Clone)]
pub struct OccupancyTracker {
    model: OccupancyModel,
    time_manager: TimeManager,
    stay_until: HashMap<String, NaiveDateTime>,
}

impl OccupancyTracker {
    /// Create a tracker for the given model
    pub fn new(model: OccupancyModel, time_manager: TimeManager) -> Self {
        Self { model, time_manager, stay_until: HashMap::new() }
    }

    /// Active occupancy model
    pub fn model(&self) -> OccupancyModel {
        self.model
    }

    /// Current stay deadline of a room
    pub fn stay_until(&self, room_id: &str) -> Option<NaiveDateTime> {
        self.stay_until.get(room_id).copied()
    }

    /// Arrival probability for the stay-duration model at `now`
    pub fn arrival_probability(&self, now: NaiveDateTime) -> f64 {
        match self.time_manager.hour_band(now) {
            HourBand::Working if !self.time_manager.is_working_day(now.date()) => 0.02,
            HourBand::Working => match now.hour() {
                8 => 0.15,
                9..=11 => 0.10,
                12 | 13 => 0.07,
                14 | 15 => 0.05,
                _ => 0.03,
            },
            HourBand::Evening | HourBand::Night => 0.01,
        }
    }

    /// Advance one room by one tick
    ///
    /// The room is mutated in place; the returned step carries the side-table
    /// update, which only takes effect once passed to [`OccupancyTracker::commit`].
    pub fn step_room<R: Rng>(
        &self,
        room: &mut Room,
        now: NaiveDateTime,
        rng: &mut R,
        events: &mut Vec<EnvironmentEvent>,
    ) -> SimulationResult<OccupancyStep> {
        match self.model {
            OccupancyModel::StayDuration => self.step_stay_duration(room, now, rng, events),
            OccupancyModel::Redraw => Ok(self.step_redraw(room, now, rng, events)),
        }
    }

    /// Store the stay deadline computed by a successful step
    pub fn commit(&mut self, step: &OccupancyStep) {
        match step.stay_until {
            Some(deadline) => {
                self.stay_until.insert(step.room_id.clone(), deadline);
            }
            None => {
                self.stay_until.remove(&step.room_id);
            }
        }
    }

    fn step_stay_duration<R: Rng>(
        &self,
        room: &mut Room,
        now: NaiveDateTime,
        rng: &mut R,
        events: &mut Vec<EnvironmentEvent>,
    ) -> SimulationResult<OccupancyStep> {
        let mut stay_until = self.stay_until(&room.id);
        let mut departures = 0;

        if room.occupancy > 0 {
            match stay_until {
                Some(deadline) if now >= deadline => {
                    let share = rng.gen_range(0.5..=1.0);
                    let leaving =
                        ((room.occupancy as f64 * share).round() as u32).clamp(1, room.occupancy);
                    room.occupancy -= leaving;
                    departures = leaving;
                    stay_until = if room.occupancy > 0 {
                        Some(self.time_manager.add_minutes(now, rng.gen_range(5..=15))?)
                    } else {
                        None
                    };
                }
                Some(_) => {}
                None => {
                    stay_until = Some(self.time_manager.add_minutes(now, rng.gen_range(5..=15))?);
                }
            }
        }

        let mut arrivals = 0;
        if rng.gen_bool(self.arrival_probability(now)) {
            let group = rng.gen_range(1..=3);
            let joining = group.min(MAX_ROOM_OCCUPANCY.saturating_sub(room.occupancy));
            if joining > 0 {
                room.occupancy += joining;
                arrivals = joining;
                let deadline = self.time_manager.add_minutes(now, rng.gen_range(30..=120))?;
                stay_until = Some(stay_until.map_or(deadline, |current| current.max(deadline)));
                events.push(
                    EnvironmentEvent::new(
                        EventType::Motion,
                        now,
                        format!("{} people entered {}", joining, room.name),
                    )
                    .in_room(&room.id)
                    .for_device(&room.motion_sensor.id),
                );
            }
        }

        if arrivals > 0 || (room.occupancy > 0 && rng.gen_bool(MOTION_WHILE_OCCUPIED_PROBABILITY)) {
            room.motion_sensor.trigger(now);
        } else {
            room.motion_sensor.clear();
        }

        if arrivals > 0 || departures > 0 {
            debug!(
                "Room {} occupancy now {} (+{} -{})",
                room.id, room.occupancy, arrivals, departures
            );
        }

        Ok(OccupancyStep { room_id: room.id.clone(), stay_until, arrivals, departures })
    }

    fn step_redraw<R: Rng>(
        &self,
        room: &mut Room,
        now: NaiveDateTime,
        rng: &mut R,
        events: &mut Vec<EnvironmentEvent>,
    ) -> OccupancyStep {
        let base_probability = match self.time_manager.hour_band(now) {
            HourBand::Working => rng.gen_range(0.1..=0.4),
            HourBand::Evening | HourBand::Night => 0.05,
        };
        let previous = room.occupancy;

        if rng.gen_bool(base_probability) {
            room.occupancy = rng.gen_range(1..=4);
            room.motion_sensor.trigger(now);
            events.push(
                EnvironmentEvent::new(EventType::Motion, now, format!("Motion detected in {}", room.name))
                    .in_room(&room.id)
                    .for_device(&room.motion_sensor.id),
            );
        } else {
            room.occupancy = 0;
            room.motion_sensor.clear();
        }

        OccupancyStep {
            room_id: room.id.clone(),
            stay_until: None,
            arrivals: room.occupancy.saturating_sub(previous),
            departures: previous.saturating_sub(room.occupancy),
        }
    }
}
