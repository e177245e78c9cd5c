//! Statistics collection and reporting
//!
//! This module contains the counters the engine keeps while ticking and the
//! text summary the binary prints at exit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Running counters for one simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStatistics {
    // Infrastructure stats
    /// Number of rooms in the layout
    pub total_rooms: usize,
    /// Number of devices in the layout
    pub total_devices: usize,

    // Clock
    /// Simulated start time
    pub started_at: Option<NaiveDateTime>,
    /// Ticks completed
    pub ticks: u64,
    /// Simulated minutes elapsed
    pub simulated_minutes: f64,

    // Occupancy
    /// People who entered a room
    pub arrivals: u64,
    /// People who left a room
    pub departures: u64,

    // Devices
    /// Injected light, printer and motion sensor failures
    pub device_failures: u64,
    /// Power outages started
    pub power_outages: u64,
    /// Printers switched off to keep the printer invariant
    pub printer_auto_offs: u64,
    /// Printer resources that ran out
    pub resource_depletions: u64,
    /// Printer resources refilled
    pub replenishments: u64,

    // Meetings
    /// Meetings booked
    pub meetings_scheduled: u64,

    // Control surface
    /// Commands that took effect
    pub commands_applied: u64,
    /// Commands that failed
    pub commands_failed: u64,

    // Errors
    /// Room or stage failures that were contained
    pub stage_failures: u64,
}

impl SimulationStatistics {
    /// Create counters for a layout
    pub fn new(total_rooms: usize, total_devices: usize, started_at: NaiveDateTime) -> Self {
        Self { total_rooms, total_devices, started_at: Some(started_at), ..Self::default() }
    }

    /// Count one completed tick
    pub fn record_tick(&mut self, simulated_minutes: f64) {
        self.ticks += 1;
        self.simulated_minutes += simulated_minutes;
    }

    /// Count a contained failure
    pub fn record_stage_failure(&mut self) {
        self.stage_failures += 1;
    }

    /// Count the result of a control command
    pub fn record_command(&mut self, success: bool) {
        if success {
            self.commands_applied += 1;
        } else {
            self.commands_failed += 1;
        }
    }

    /// Simulated hours elapsed
    pub fn simulated_hours(&self) -> f64 {
        self.simulated_minutes / 60.0
    }

    /// Average occupancy turnover per simulated hour
    pub fn arrivals_per_hour(&self) -> f64 {
        if self.simulated_minutes <= 0.0 {
            0.0
        } else {
            self.arrivals as f64 / self.simulated_hours()
        }
    }

    /// Get a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} ticks | {:.1} simulated hours | {} arrivals | {} failures | {} outages | {} meetings",
            self.ticks,
            self.simulated_hours(),
            self.arrivals,
            self.device_failures,
            self.power_outages,
            self.meetings_scheduled
        )
    }

    /// Generate the multi-line report printed at exit
    pub fn generate_summary_output(&self) -> String {
        let mut output = String::new();
        output.push_str("=== Simulation Summary ===\n");
        if let Some(started_at) = self.started_at {
            output.push_str(&format!("Started at: {}\n", started_at));
        }
        output.push_str(&format!(
            "Layout: {} rooms, {} devices\n",
            self.total_rooms, self.total_devices
        ));
        output.push_str(&format!(
            "Ticks: {} ({:.1} simulated hours)\n\n",
            self.ticks,
            self.simulated_hours()
        ));

        output.push_str("Occupancy:\n");
        output.push_str(&format!(
            "  • Arrivals: {} ({:.2}/h)\n",
            self.arrivals,
            self.arrivals_per_hour()
        ));
        output.push_str(&format!("  • Departures: {}\n", self.departures));

        output.push_str("\nDevices:\n");
        output.push_str(&format!("  • Failures: {}\n", self.device_failures));
        output.push_str(&format!("  • Power outages: {}\n", self.power_outages));
        output.push_str(&format!("  • Printer auto-offs: {}\n", self.printer_auto_offs));
        output.push_str(&format!(
            "  • Resource depletions / refills: {} / {}\n",
            self.resource_depletions, self.replenishments
        ));

        output.push_str("\nMeetings:\n");
        output.push_str(&format!("  • Scheduled: {}\n", self.meetings_scheduled));

        output.push_str("\nControl:\n");
        output.push_str(&format!(
            "  • Commands applied / failed: {} / {}\n",
            self.commands_applied, self.commands_failed
        ));
        if self.stage_failures > 0 {
            output.push_str(&format!("\nContained stage failures: {}\n", self.stage_failures));
        }

        output
    }
}

impl fmt::Display for SimulationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(8, 0, 0).unwrap()
    }

    #[test]
    fn test_tick_accounting() {
        let mut stats = SimulationStatistics::new(6, 35, start());
        for _ in 0..120 {
            stats.record_tick(1.0);
        }
        stats.arrivals = 30;
        assert_eq!(stats.ticks, 120);
        assert_eq!(stats.simulated_hours(), 2.0);
        assert_eq!(stats.arrivals_per_hour(), 15.0);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = SimulationStatistics::default();
        assert_eq!(stats.arrivals_per_hour(), 0.0);
        assert!(stats.started_at.is_none());
    }

    #[test]
    fn test_summary_output() {
        let mut stats = SimulationStatistics::new(6, 35, start());
        stats.record_tick(15.0);
        stats.record_command(true);
        stats.record_command(false);
        stats.record_stage_failure();

        let output = stats.generate_summary_output();
        assert!(output.contains("6 rooms, 35 devices"));
        assert!(output.contains("Commands applied / failed: 1 / 1"));
        assert!(output.contains("Contained stage failures: 1"));
        assert!(stats.to_string().starts_with("1 ticks"));
    }
}
