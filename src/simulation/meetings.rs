//! Meeting scheduler
//!
//! Every room gets a rolling one-working-day window of meetings. Each 30-minute
//! slot in the window is rolled exactly once per room; the set of slots that
//! have been rolled is kept until it is two simulated days old.

use crate::events::EnvironmentEvent;
use crate::facility::{Meeting, Room};
use crate::simulation::{SimulationResult, TimeManager, SLOT_MINUTES};
use crate::types::{EventType, HourBand};
use chrono::{Duration, NaiveDateTime, Timelike};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Days of slot bookkeeping kept per room
pub const EVALUATED_SLOT_RETENTION_DAYS: i64 = 2;

/// Titles given to generated meetings
pub const MEETING_TITLES: &[&str] = &[
    "Team Standup",
    "Design Review",
    "Sprint Planning",
    "Client Call",
    "One-on-One",
    "Project Sync",
    "Budget Review",
    "Retrospective",
    "All Hands Prep",
    "Interview",
];

/// Result of scheduling one room
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPass {
    /// Room the pass ran for
    pub room_id: String,
    /// Slots rolled during this pass
    pub evaluated: Vec<NaiveDateTime>,
    /// Meetings created during this pass
    pub created: usize,
}

/// Slot-based, idempotent meeting generator
#[derive(Debug, Clone, Default)]
pub struct MeetingScheduler {
    time_manager: TimeManager,
    evaluated: HashMap<String, BTreeSet<NaiveDateTime>>,
}

impl MeetingScheduler {
    /// Create a scheduler with no evaluated slots
    pub fn new(time_manager: TimeManager) -> Self {
        Self { time_manager, evaluated: HashMap::new() }
    }

    /// Whether a slot was already rolled for a room
    pub fn is_evaluated(&self, room_id: &str, slot: NaiveDateTime) -> bool {
        self.evaluated.get(room_id).map_or(false, |slots| slots.contains(&slot))
    }

    /// Number of slots remembered for a room
    pub fn evaluated_count(&self, room_id: &str) -> usize {
        self.evaluated.get(room_id).map_or(0, BTreeSet::len)
    }

    /// Booking probability of a slot starting at `slot`
    pub fn booking_probability(&self, slot: NaiveDateTime) -> f64 {
        match self.time_manager.hour_band(slot) {
            // The last working hour books like the evening
            HourBand::Working if slot.hour() + 1 < self.time_manager.work_end_hour() => 0.5,
            HourBand::Working | HourBand::Evening => 0.2,
            HourBand::Night => 0.0,
        }
    }

    /// End of the scheduling window for `now`
    pub fn horizon(&self, now: NaiveDateTime) -> SimulationResult<NaiveDateTime> {
        self.time_manager.working_day_horizon(now)
    }

    /// Refresh one room's meetings up to `horizon`
    pub fn schedule_room<R: Rng>(
        &self,
        room: &mut Room,
        now: NaiveDateTime,
        horizon: NaiveDateTime,
        rng: &mut R,
        events: &mut Vec<EnvironmentEvent>,
    ) -> SimulationResult<SlotPass> {
        room.meetings.retain(|meeting| meeting.end_time > now && meeting.start_time < horizon);

        let slot_length = Duration::minutes(i64::from(SLOT_MINUTES));
        let mut slot = self.time_manager.floor_to_slot(now);
        let mut evaluated = Vec::new();
        let mut created = 0;

        while slot < horizon {
            let end = self.time_manager.add_minutes(slot, i64::from(SLOT_MINUTES))?;
            if !self.is_evaluated(&room.id, slot) {
                let probability = self.booking_probability(slot);
                if !room.has_meeting_overlap(slot, end) && rng.gen_bool(probability) {
                    let title = MEETING_TITLES.choose(rng).copied().unwrap_or("Meeting");
                    room.meetings.push(Meeting::new(slot, end, title));
                    created += 1;
                    events.push(
                        EnvironmentEvent::new(
                            EventType::MeetingScheduled,
                            now,
                            format!("{} booked in {} at {}", title, room.name, slot.format("%Y-%m-%d %H:%M")),
                        )
                        .in_room(&room.id),
                    );
                }
                evaluated.push(slot);
            }
            slot += slot_length;
        }

        room.meetings.sort_by_key(|meeting| meeting.start_time);
        if created > 0 {
            debug!("Scheduled {} meetings in {}", created, room.id);
        }

        Ok(SlotPass { room_id: room.id.clone(), evaluated, created })
    }

    /// Remember the slots of a successful pass and forget stale ones
    pub fn commit(&mut self, pass: SlotPass, now: NaiveDateTime) {
        let slots = self.evaluated.entry(pass.room_id).or_default();
        slots.extend(pass.evaluated);
        if let Some(cutoff) = now.checked_sub_signed(Duration::days(EVALUATED_SLOT_RETENTION_DAYS)) {
            *slots = slots.split_off(&cutoff);
        }
    }
}
