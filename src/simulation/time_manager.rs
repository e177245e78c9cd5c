//! Simulated clock and calendar predicates
//!
//! This module maps ticks onto simulated time and classifies simulated
//! timestamps into the bands the probability tables are keyed on.

use crate::simulation::{SimulationError, SimulationResult};
use crate::types::HourBand;
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike, Weekday};
use tracing::{debug, instrument};

/// Length of one meeting slot in minutes
pub const SLOT_MINUTES: u32 = 30;

/// First working hour of the day
pub const WORKING_HOURS_START: u32 = 8;

/// First hour after the working day
pub const WORKING_HOURS_END: u32 = 17;

/// First hour of the night band
pub const EVENING_END: u32 = 22;

/// Time management for the simulated office clock
#[derive(Debug, Clone)]
pub struct TimeManager {
    work_start_hour: u32,
    work_end_hour: u32,
}

impl TimeManager {
    /// Create a new TimeManager with standard 08:00-17:00 working hours
    pub fn new() -> Self {
        Self { work_start_hour: WORKING_HOURS_START, work_end_hour: WORKING_HOURS_END }
    }

    /// Local wall-clock time truncated to the minute, used as the default start
    pub fn wall_clock_start() -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(now)
    }

    /// Advance a simulated timestamp by one tick
    ///
    /// The tick covers `delta_minutes × time_speed` simulated minutes at
    /// millisecond resolution.
    #[instrument(skip(self))]
    pub fn advance(
        &self,
        now: NaiveDateTime,
        delta_minutes: f64,
        time_speed: f64,
    ) -> SimulationResult<NaiveDateTime> {
        let simulated_minutes = delta_minutes * time_speed;
        if !simulated_minutes.is_finite() || simulated_minutes < 0.0 {
            return Err(SimulationError::time_error(format!(
                "cannot advance clock by {} minutes (delta {} × speed {})",
                simulated_minutes, delta_minutes, time_speed
            )));
        }

        let millis = (simulated_minutes * 60_000.0).round() as i64;
        let next = now.checked_add_signed(Duration::milliseconds(millis)).ok_or_else(|| {
            SimulationError::time_error(format!("clock overflow advancing {} by {}ms", now, millis))
        })?;

        debug!("Advanced simulated clock from {} to {}", now, next);
        Ok(next)
    }

    /// Add whole minutes to a timestamp with overflow checking
    pub fn add_minutes(&self, at: NaiveDateTime, minutes: i64) -> SimulationResult<NaiveDateTime> {
        at.checked_add_signed(Duration::minutes(minutes)).ok_or_else(|| {
            SimulationError::time_error(format!("clock overflow adding {} minutes to {}", minutes, at))
        })
    }

    /// First hour after the working day
    pub fn work_end_hour(&self) -> u32 {
        self.work_end_hour
    }

    /// Check if a date is Monday to Friday
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Check if the hour falls inside 08:00-17:00, regardless of weekday
    pub fn is_within_working_hours(&self, timestamp: NaiveDateTime) -> bool {
        (self.work_start_hour..self.work_end_hour).contains(&timestamp.hour())
    }

    /// Check if the time is inside working hours on a working day
    pub fn is_working_time(&self, timestamp: NaiveDateTime) -> bool {
        self.is_working_day(timestamp.date()) && self.is_within_working_hours(timestamp)
    }

    /// Classify the hour of a timestamp
    pub fn hour_band(&self, timestamp: NaiveDateTime) -> HourBand {
        let hour = timestamp.hour();
        if (self.work_start_hour..self.work_end_hour).contains(&hour) {
            HourBand::Working
        } else if (self.work_end_hour..EVENING_END).contains(&hour) {
            HourBand::Evening
        } else {
            HourBand::Night
        }
    }

    /// End of the meeting horizon: 23:59:59 on the next weekday after `now`'s date
    ///
    /// On a weekday this is the following weekday (Friday rolls to Monday); on a
    /// weekend it is the coming Monday.
    pub fn working_day_horizon(&self, now: NaiveDateTime) -> SimulationResult<NaiveDateTime> {
        let mut date = now.date();
        loop {
            date = date.succ_opt().ok_or_else(|| {
                SimulationError::time_error(format!("no calendar day after {}", date))
            })?;
            if self.is_working_day(date) {
                break;
            }
        }
        date.and_hms_opt(23, 59, 59)
            .ok_or_else(|| SimulationError::time_error(format!("invalid end of day for {}", date)))
    }

    /// Round a timestamp down to the start of its 30-minute slot
    pub fn floor_to_slot(&self, timestamp: NaiveDateTime) -> NaiveDateTime {
        let minute = timestamp.minute() - timestamp.minute() % SLOT_MINUTES;
        timestamp
            .date()
            .and_hms_opt(timestamp.hour(), minute, 0)
            .unwrap_or(timestamp)
    }
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new()
    }
}
