//! Tests for the simulated clock and working-day calendar
//!
//! These tests exercise the clock through both the `TimeManager` and a live
//! engine, including the time-speed multiplier.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use office_environment_simulator::simulation::{SimulationEngine, TimeManager, SLOT_MINUTES};
use office_environment_simulator::types::{HourBand, SimulationConfig};

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    // 2024-01-08 is a Monday
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap().and_hms_opt(hour, minute, 0).unwrap()
}

/// Test that ticks scale with the speed multiplier
#[test]
fn test_engine_clock_follows_time_speed() {
    let config = SimulationConfig {
        seed: Some(1),
        start_time: Some(at(8, 8, 0)),
        time_speed: 10.0,
        ..Default::default()
    };
    let mut engine = SimulationEngine::new(config).unwrap();

    engine.update(1.0).unwrap();
    assert_eq!(engine.simulation_time(), at(8, 8, 10));

    // Changing the speed takes effect on the next tick
    engine.set_time_speed(0.5).unwrap();
    engine.update(2.0).unwrap();
    assert_eq!(engine.simulation_time(), at(8, 8, 11));
    assert_eq!(engine.statistics().simulated_minutes, 11.0);
}

/// Test fractional ticks at millisecond resolution
#[test]
fn test_fractional_minutes() {
    let tm = TimeManager::new();
    let next = tm.advance(at(8, 9, 0), 0.25, 1.0).unwrap();
    assert_eq!(next, at(8, 9, 0) + Duration::seconds(15));

    let next = tm.advance(at(8, 9, 0), 1.0, 0.001).unwrap();
    assert_eq!(next, at(8, 9, 0) + Duration::milliseconds(60));
}

/// Test that an unusable clock step fails the tick
#[test]
fn test_invalid_clock_step_is_an_error() {
    let config = SimulationConfig { seed: Some(2), start_time: Some(at(8, 9, 0)), ..Default::default() };
    let mut engine = SimulationEngine::new(config).unwrap();

    assert!(engine.update(-1.0).is_err());
    assert!(engine.update(f64::NAN).is_err());
    assert_eq!(engine.simulation_time(), at(8, 9, 0));
    assert_eq!(engine.statistics().ticks, 0);

    assert!(engine.set_time_speed(0.0).is_err());
    assert!(engine.set_time_speed(f64::INFINITY).is_err());
}

/// Test hour bands and working days
#[test]
fn test_calendar_classification() {
    let tm = TimeManager::default();

    assert_eq!(tm.hour_band(at(8, 7, 59)), HourBand::Night);
    assert_eq!(tm.hour_band(at(8, 8, 0)), HourBand::Working);
    assert_eq!(tm.hour_band(at(8, 16, 59)), HourBand::Working);
    assert_eq!(tm.hour_band(at(8, 17, 0)), HourBand::Evening);
    assert_eq!(tm.hour_band(at(8, 21, 59)), HourBand::Evening);
    assert_eq!(tm.hour_band(at(8, 22, 0)), HourBand::Night);

    assert!(tm.is_working_time(at(12, 10, 0))); // Friday
    assert!(!tm.is_working_time(at(13, 10, 0))); // Saturday
    assert!(tm.is_within_working_hours(at(13, 10, 0)));
}

/// Test the one-working-day meeting horizon across a week
#[test]
fn test_working_day_horizon_over_a_week() {
    let tm = TimeManager::new();

    for day in 8..=14 {
        let now = at(day, 12, 0);
        let horizon = tm.working_day_horizon(now).unwrap();

        assert!(horizon > now);
        assert!(tm.is_working_day(horizon.date()));
        assert_eq!((horizon.hour(), horizon.minute(), horizon.second()), (23, 59, 59));

        match now.weekday() {
            Weekday::Fri | Weekday::Sat | Weekday::Sun => assert_eq!(horizon.weekday(), Weekday::Mon),
            _ => assert_eq!(horizon.date(), now.date().succ_opt().unwrap()),
        }
    }
}

/// Test slot flooring
#[test]
fn test_floor_to_slot() {
    let tm = TimeManager::new();
    assert_eq!(SLOT_MINUTES, 30);
    assert_eq!(tm.floor_to_slot(at(8, 9, 10)), at(8, 9, 0));
    assert_eq!(tm.floor_to_slot(at(8, 9, 30)), at(8, 9, 30));
    assert_eq!(tm.floor_to_slot(at(8, 9, 59)), at(8, 9, 30));
}
