//! Tests for CLI argument parsing, configuration files and run output
//!
//! These tests verify that command line arguments are properly parsed and
//! layered over configuration files, and that a configured run writes its
//! final state where asked.

use clap::Parser;
use office_environment_simulator::simulation::{ControlCommand, SimulationEngine, StateReport};
use office_environment_simulator::types::config::{CliArgs, ConfigError, SimulationConfig};
use office_environment_simulator::types::{DeviceState, LightControl, PrinterConsumption};
use std::io::Write;

/// Test the default values when no flag is given
#[test]
fn test_no_arguments() {
    let args = CliArgs::try_parse_from(["office-simulator"]).unwrap();
    assert!(args.config.is_none());
    assert!(args.ticks.is_none());
    assert!(!args.dry_run);
    assert!(!args.print_config);

    let config = SimulationConfig::from_cli_args(args).unwrap();
    assert_eq!(config.tick_interval_ms, 1_000);
    assert!(config.max_ticks.is_none());
    assert!(config.validate().is_ok());
}

/// Test every engine switch on the command line
#[test]
fn test_engine_switches() {
    let args = CliArgs::try_parse_from([
        "office-simulator",
        "--tick-interval-ms",
        "10",
        "--minutes-per-tick",
        "0.5",
        "--time-speed",
        "4",
        "--failure-probability",
        "0.2",
        "--seed",
        "99",
        "--printer-consumption",
        "self_consuming",
        "--light-control",
        "motion_driven",
        "--state-output",
        "final.json",
        "--command-script",
        "setup.jsonl",
    ])
    .unwrap();

    let config = SimulationConfig::from_cli_args(args).unwrap();
    assert_eq!(config.tick_interval_ms, 10);
    assert_eq!(config.simulated_minutes_per_tick(), 2.0);
    assert_eq!(config.failure_probability, 0.2);
    assert_eq!(config.seed, Some(99));
    assert_eq!(config.printer_consumption, PrinterConsumption::SelfConsuming);
    assert_eq!(config.light_control, LightControl::MotionDriven);
    assert_eq!(config.state_output.as_deref(), Some("final.json"));
    assert_eq!(config.command_script.as_deref(), Some("setup.jsonl"));
}

/// Test that invalid values parse but fail validation
#[test]
fn test_invalid_values_fail_validation() {
    let args = CliArgs::try_parse_from(["office-simulator", "--failure-probability", "3"]).unwrap();
    let config = SimulationConfig::from_cli_args(args).unwrap();
    assert!(config.validate().is_err());
    assert!(SimulationEngine::new(config).is_err());

    let args = CliArgs::try_parse_from(["office-simulator", "--time-speed", "0"]).unwrap();
    assert!(SimulationConfig::from_cli_args(args).unwrap().validate().is_err());

    assert!(CliArgs::try_parse_from(["office-simulator", "--ticks", "many"]).is_err());
}

/// Test a custom layout from a configuration file
#[test]
fn test_layout_from_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "seed": 5,
            "rooms": [
                {{"id": "room_1", "name": "Lab", "lights": 1, "printer": true}},
                {{"id": "room_2", "name": "Store", "blinds": true}}
            ]
        }}"#
    )
    .unwrap();

    let args = CliArgs::try_parse_from(["office-simulator", "--config", file.path().to_str().unwrap()]).unwrap();
    let config = SimulationConfig::from_cli_args(args).unwrap();
    let engine = SimulationEngine::new(config).unwrap();

    assert_eq!(engine.state().rooms.len(), 2);
    assert!(engine.printer("printer_1").is_some());
    assert!(engine.blinds("blinds_2").is_some());
    assert!(engine.light("light_1_1").is_some());
    assert!(engine.light("light_1_2").is_none());
    // 1 light + printer + 2 sensors, then 2 lights + blinds + 2 sensors
    assert_eq!(engine.devices().len(), 9);
}

/// Test that duplicate room ids are refused
#[test]
fn test_duplicate_rooms_rejected() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"rooms": [{{"id": "room_1", "name": "A"}}, {{"id": "room_1", "name": "B"}}]}}"#).unwrap();

    let config = SimulationConfig::from_file(file.path()).unwrap();
    assert!(config.validate().is_err());
}

/// Test that a missing or malformed file is reported
#[test]
fn test_config_file_errors() {
    let args = CliArgs::try_parse_from(["office-simulator", "--config", "/no/such/office.json"]).unwrap();
    assert!(matches!(SimulationConfig::from_cli_args(args), Err(ConfigError::FileNotFound(_))));

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "{{ not json").unwrap();
    assert!(matches!(SimulationConfig::from_file(file.path()), Err(ConfigError::JsonError(_))));
}

/// Test the state report written at the end of a run
#[test]
fn test_state_report_output() {
    let config = SimulationConfig { seed: Some(8), ..Default::default() };
    let mut engine = SimulationEngine::new(config).unwrap();
    let outcome = engine.apply_command(ControlCommand::SetPrinterToner {
        printer_id: "printer_102".into(),
        level: 0.0,
    });
    assert!(outcome.success);
    for _ in 0..10 {
        engine.update(1.0).unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    engine.write_state_report(&path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["statistics"]["ticks"], 10);
    assert_eq!(json["state"]["rooms"].as_array().unwrap().len(), 6);
    assert_eq!(json["alerts"][0]["type"], "toner_empty");

    let report: StateReport = serde_json::from_value(json).unwrap();
    assert_eq!(report.state.printer("printer_102").unwrap().toner_percent(), 0);
    assert_ne!(report.state.printer("printer_102").unwrap().state, DeviceState::On);

    assert!(engine.write_state_report(dir.path().join("missing/state.json")).is_err());
}
