//! Configuration structures for the office environment simulator
//!
//! This module contains the simulation configuration structure, its command line
//! and file sources, and the validation logic used to control the engine.

use super::{LightControl, OccupancyModel, PrinterConsumption};
use crate::facility::layout::{default_office_layout, validate_layout, RoomSpec};
use chrono::NaiveDateTime;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "office-simulator",
    version = "0.1.0",
    about = "Office Environment Simulator - a time-varying office world for control agents",
    long_about = "Simulates a multi-room office (lights, printers, motion and temperature sensors, blinds, meetings) \
one tick at a time so that external control agents can be exercised against a plausible, changing world.

EXAMPLES:
    # Run with default settings until interrupted
    office-simulator

    # Use a configuration file
    office-simulator --config office.json

    # Run 600 ticks as fast as possible from a fixed start time
    office-simulator --ticks 600 --tick-interval-ms 1 --start-time 2024-01-08T07:00:00 --seed 42

    # Generate configuration template
    office-simulator --print-config > office.json

    # Validate configuration without running
    office-simulator --config office.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Real milliseconds between two ticks
    #[arg(long, help = "Real milliseconds between ticks")]
    pub tick_interval_ms: Option<u64>,

    /// Simulated minutes per tick before the speed multiplier
    #[arg(long, help = "Simulated minutes advanced per tick")]
    pub minutes_per_tick: Option<f64>,

    /// Time-speed multiplier applied to every tick
    #[arg(long, help = "Time-speed multiplier")]
    pub time_speed: Option<f64>,

    /// Hourly device failure rate (0.0-1.0)
    #[arg(
        long,
        help = "Hourly device failure rate (0.0-1.0)",
        long_help = "Per-hour failure rate of lights and printers; divided by 60 for the per-tick chance. Default: 0.01"
    )]
    pub failure_probability: Option<f64>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Simulated start time
    #[arg(long, help = "Simulated start time, e.g. 2024-01-08T08:00:00")]
    pub start_time: Option<NaiveDateTime>,

    /// Occupancy model
    #[arg(long, help = "Occupancy model (stay_duration or redraw)")]
    pub occupancy_model: Option<OccupancyModel>,

    /// Printer consumption mode
    #[arg(long, help = "Printer consumption (external or self_consuming)")]
    pub printer_consumption: Option<PrinterConsumption>,

    /// Light control mode
    #[arg(long, help = "Light control (external or motion_driven)")]
    pub light_control: Option<LightControl>,

    /// Disable automatically raised alerts
    #[arg(long, help = "Do not raise alerts for failures and depletions")]
    pub no_auto_alerts: bool,

    /// Stop after this many ticks
    #[arg(long, help = "Stop after this many ticks")]
    pub ticks: Option<u64>,

    /// Where to write the final state snapshot
    #[arg(long, help = "Write the final state snapshot as JSON to this path")]
    pub state_output: Option<String>,

    /// JSON-lines file of control commands applied before the first tick
    #[arg(long, help = "JSON-lines control command script applied at startup")]
    pub command_script: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    /// Also write logs to daily rolling files in this directory
    #[arg(long, help = "Directory for rolling log files")]
    pub log_dir: Option<String>,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Real milliseconds between two ticks
    pub tick_interval_ms: Option<u64>,
    /// Simulated minutes per tick before the speed multiplier
    pub minutes_per_tick: Option<f64>,
    /// Time-speed multiplier
    pub time_speed: Option<f64>,
    /// Hourly device failure rate
    pub failure_probability: Option<f64>,
    /// Random seed
    pub seed: Option<u64>,
    /// Simulated start time
    pub start_time: Option<NaiveDateTime>,
    /// Occupancy model
    pub occupancy_model: Option<OccupancyModel>,
    /// Printer consumption mode
    pub printer_consumption: Option<PrinterConsumption>,
    /// Light control mode
    pub light_control: Option<LightControl>,
    /// Whether the engine raises alerts on its own
    pub auto_alerts: Option<bool>,
    /// Initial heating flag of every room
    pub initial_heating: Option<bool>,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
    /// Final snapshot output path
    pub state_output: Option<String>,
    /// Startup command script path
    pub command_script: Option<String>,
    /// Room layout
    pub rooms: Option<Vec<RoomSpec>>,
}

/// Configuration for the office environment simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Real milliseconds between two ticks of the periodic driver
    pub tick_interval_ms: u64,

    /// Simulated minutes advanced per tick, before the time-speed multiplier
    pub minutes_per_tick: f64,

    /// Initial time-speed multiplier
    pub time_speed: f64,

    /// Hourly failure rate of lights and printers (0.0-1.0)
    pub failure_probability: f64,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// Simulated start time; the local wall clock when absent
    pub start_time: Option<NaiveDateTime>,

    /// Occupancy process driving room headcounts
    pub occupancy_model: OccupancyModel,

    /// Who consumes printer toner and paper
    pub printer_consumption: PrinterConsumption,

    /// Who switches lights on
    pub light_control: LightControl,

    /// Whether the engine raises alerts for failures and depletions
    pub auto_alerts: bool,

    /// Initial heating flag of every room
    pub initial_heating: bool,

    /// Stop the driver after this many ticks
    pub max_ticks: Option<u64>,

    /// Write the final state snapshot to this path
    pub state_output: Option<String>,

    /// JSON-lines control command script applied before the first tick
    pub command_script: Option<String>,

    /// Static room layout
    pub rooms: Vec<RoomSpec>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for simulation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Tick interval is zero
    #[error("Tick interval must be greater than 0 ms, got {0}")]
    InvalidTickInterval(u64),

    /// Minutes per tick is not a positive finite number
    #[error("Minutes per tick must be a positive number, got {0}")]
    InvalidMinutesPerTick(f64),

    /// Time speed is not a positive finite number
    #[error("Time speed must be a positive number, got {0}")]
    InvalidTimeSpeed(f64),

    /// Probability value is out of range
    #[error("Invalid probability for {field}: {value} (must be between 0.0 and 1.0)")]
    InvalidProbability {
        /// Name of the field with invalid probability
        field: String,
        /// The invalid value
        value: f64,
    },

    /// The layout has no rooms
    #[error("Room layout must contain at least one room")]
    EmptyLayout,

    /// A room id is empty
    #[error("Room ids must not be blank")]
    BlankRoomId,

    /// Two rooms share an id
    #[error("Duplicate room id in layout: {0}")]
    DuplicateRoomId(String),

    /// Two devices share an id
    #[error("Duplicate device id in layout: {0}")]
    DuplicateDeviceId(String),
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            minutes_per_tick: 1.0,
            time_speed: 1.0,
            failure_probability: 0.01,
            seed: None,
            start_time: None,
            occupancy_model: OccupancyModel::StayDuration,
            printer_consumption: PrinterConsumption::External,
            light_control: LightControl::External,
            auto_alerts: true,
            initial_heating: true,
            max_ticks: None,
            state_output: None,
            command_script: None,
            rooms: default_office_layout(),
        }
    }
}

impl SimulationConfig {
    /// Create configuration from parsed CLI arguments and optional config file
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        // Start with default configuration
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            tick_interval_ms: config_file.tick_interval_ms.unwrap_or(defaults.tick_interval_ms),
            minutes_per_tick: config_file.minutes_per_tick.unwrap_or(defaults.minutes_per_tick),
            time_speed: config_file.time_speed.unwrap_or(defaults.time_speed),
            failure_probability: config_file
                .failure_probability
                .unwrap_or(defaults.failure_probability),
            seed: config_file.seed.or(defaults.seed),
            start_time: config_file.start_time.or(defaults.start_time),
            occupancy_model: config_file.occupancy_model.unwrap_or(defaults.occupancy_model),
            printer_consumption: config_file
                .printer_consumption
                .unwrap_or(defaults.printer_consumption),
            light_control: config_file.light_control.unwrap_or(defaults.light_control),
            auto_alerts: config_file.auto_alerts.unwrap_or(defaults.auto_alerts),
            initial_heating: config_file.initial_heating.unwrap_or(defaults.initial_heating),
            max_ticks: config_file.max_ticks.or(defaults.max_ticks),
            state_output: config_file.state_output.or(defaults.state_output),
            command_script: config_file.command_script.or(defaults.command_script),
            rooms: config_file.rooms.unwrap_or(defaults.rooms),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.tick_interval_ms {
            config.tick_interval_ms = value;
        }
        if let Some(value) = args.minutes_per_tick {
            config.minutes_per_tick = value;
        }
        if let Some(value) = args.time_speed {
            config.time_speed = value;
        }
        if let Some(value) = args.failure_probability {
            config.failure_probability = value;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
        if let Some(value) = args.start_time {
            config.start_time = Some(value);
        }
        if let Some(value) = args.occupancy_model {
            config.occupancy_model = value;
        }
        if let Some(value) = args.printer_consumption {
            config.printer_consumption = value;
        }
        if let Some(value) = args.light_control {
            config.light_control = value;
        }
        if args.no_auto_alerts {
            config.auto_alerts = false;
        }
        if let Some(value) = args.ticks {
            config.max_ticks = Some(value);
        }
        if let Some(value) = args.state_output {
            config.state_output = Some(value);
        }
        if let Some(value) = args.command_script {
            config.command_script = Some(value);
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigValidationError::InvalidTickInterval(self.tick_interval_ms));
        }

        if !(self.minutes_per_tick.is_finite() && self.minutes_per_tick > 0.0) {
            return Err(ConfigValidationError::InvalidMinutesPerTick(self.minutes_per_tick));
        }

        if !(self.time_speed.is_finite() && self.time_speed > 0.0) {
            return Err(ConfigValidationError::InvalidTimeSpeed(self.time_speed));
        }

        if !(0.0..=1.0).contains(&self.failure_probability) {
            return Err(ConfigValidationError::InvalidProbability {
                field: "failure_probability".to_string(),
                value: self.failure_probability,
            });
        }

        validate_layout(&self.rooms)
    }

    /// Simulated minutes one tick advances, including the speed multiplier
    pub fn simulated_minutes_per_tick(&self) -> f64 {
        self.minutes_per_tick * self.time_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn empty_args() -> CliArgs {
        CliArgs::try_parse_from(["test"]).unwrap()
    }

    #[test]
    fn test_simulation_config_default() {
        let config = SimulationConfig::default();

        assert_eq!(config.tick_interval_ms, 1_000);
        assert_eq!(config.minutes_per_tick, 1.0);
        assert_eq!(config.time_speed, 1.0);
        assert_eq!(config.failure_probability, 0.01);
        assert_eq!(config.occupancy_model, OccupancyModel::StayDuration);
        assert_eq!(config.printer_consumption, PrinterConsumption::External);
        assert_eq!(config.light_control, LightControl::External);
        assert!(config.auto_alerts);
        assert!(config.seed.is_none());
        assert_eq!(config.rooms.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_parsing() {
        let args = CliArgs::try_parse_from([
            "test",
            "--ticks",
            "120",
            "--occupancy-model",
            "redraw",
            "--start-time",
            "2024-01-08T08:00:00",
            "--no-auto-alerts",
        ])
        .unwrap();
        assert_eq!(args.ticks, Some(120));
        assert_eq!(args.occupancy_model, Some(OccupancyModel::Redraw));
        assert!(args.start_time.is_some());

        let config = SimulationConfig::from_cli_args(args).unwrap();
        assert_eq!(config.max_ticks, Some(120));
        assert_eq!(config.occupancy_model, OccupancyModel::Redraw);
        assert!(!config.auto_alerts);

        assert!(CliArgs::try_parse_from(["test", "--light-control", "sometimes"]).is_err());
    }

    #[test]
    fn test_config_file_loading() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "time_speed": 5.0,
                "seed": 9,
                "printer_consumption": "self_consuming",
                "rooms": [{{"id": "room_1", "name": "Lab", "printer": true}}]
            }}"#
        )
        .unwrap();

        let config = SimulationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.time_speed, 5.0);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.printer_consumption, PrinterConsumption::SelfConsuming);
        assert_eq!(config.rooms.len(), 1);
        assert_eq!(config.rooms[0].lights, 2);
        // Untouched fields keep their defaults
        assert_eq!(config.minutes_per_tick, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"time_speed": 5.0, "seed": 9}}"#).unwrap();

        let mut args = empty_args();
        args.config = Some(file.path().display().to_string());
        args.seed = Some(11);

        let config = SimulationConfig::from_cli_args(args).unwrap();
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.time_speed, 5.0);
    }

    #[test]
    fn test_config_file_errors() {
        assert!(matches!(
            SimulationConfig::from_file("/definitely/not/here.json"),
            Err(ConfigError::FileNotFound(_))
        ));

        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            SimulationConfig::from_file(file.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = SimulationConfig::default();
        config.tick_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidTickInterval(0))));

        let mut config = SimulationConfig::default();
        config.minutes_per_tick = -1.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.time_speed = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.failure_probability = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidProbability { .. })
        ));

        let mut config = SimulationConfig::default();
        config.rooms.clear();
        assert!(matches!(config.validate(), Err(ConfigValidationError::EmptyLayout)));
    }

    #[test]
    fn test_print_and_save_round_trip() {
        let config = SimulationConfig { seed: Some(3), ..Default::default() };
        let json = config.print_json().unwrap();
        assert!(json.contains("\"occupancy_model\": \"stay_duration\""));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");
        config.save_to_file(&path).unwrap();
        let loaded = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(loaded.seed, Some(3));
        assert_eq!(loaded.rooms, config.rooms);
    }

    #[test]
    fn test_simulated_minutes_per_tick() {
        let config = SimulationConfig { minutes_per_tick: 2.0, time_speed: 3.0, ..Default::default() };
        assert_eq!(config.simulated_minutes_per_tick(), 6.0);
    }
}
