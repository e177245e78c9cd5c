//! Tests for the control surface as agents use it
//!
//! Every scenario here goes through public commands only: typed methods,
//! wire-format `ControlCommand`s and JSON-lines scripts.

use chrono::{NaiveDate, NaiveDateTime};
use office_environment_simulator::events::{ALERT_LOG_CAPACITY, MESSAGE_LOG_CAPACITY};
use office_environment_simulator::simulation::{ControlCommand, SimulationEngine};
use office_environment_simulator::types::{
    AlertSeverity, BlindsState, DeviceState, EventType, MessageType, PrinterResource, SimulationConfig,
};
use office_environment_simulator::{MessageFilter, NewAlert, NewMessage};

fn monday(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(hour, minute, 0).unwrap()
}

fn engine() -> SimulationEngine {
    let config = SimulationConfig {
        seed: Some(42),
        start_time: Some(monday(9, 0)),
        failure_probability: 0.0,
        ..Default::default()
    };
    SimulationEngine::new(config).unwrap()
}

/// Turning a printer on, emptying its toner, and trying to turn it back on
#[test]
fn test_printer_208_toner_scenario() {
    let mut engine = engine();
    engine.set_printer_toner("printer_208", 80.0).unwrap();
    engine.set_printer_paper("printer_208", 80.0).unwrap();

    let on = engine.apply_command(ControlCommand::SetPrinterState {
        printer_id: "printer_208".into(),
        state: DeviceState::On,
    });
    assert!(on.success, "{}", on.message);

    let emptied = engine.apply_command(ControlCommand::SetPrinterToner {
        printer_id: "printer_208".into(),
        level: 0.0,
    });
    assert!(emptied.success);

    // Printer went off in the same command
    let printer = engine.printer("printer_208").unwrap();
    assert_eq!(printer.state, DeviceState::Off);
    assert_eq!(printer.toner_percent(), 0);
    assert_eq!(engine.depleted_at("printer_208", PrinterResource::Toner), Some(monday(9, 0)));

    let kinds: Vec<EventType> = engine.events().iter().map(|event| event.event_type).collect();
    assert!(kinds.contains(&EventType::PrinterAutoOff));
    assert!(kinds.contains(&EventType::PrinterResourceDepleted));

    let alert = engine.alerts().into_iter().find(|alert| alert.alert_type == "toner_empty").unwrap();
    assert_eq!(alert.severity, AlertSeverity::Warning);
    assert_eq!(alert.room_id.as_deref(), Some("room_208"));

    let refused = engine.apply_command(ControlCommand::SetPrinterState {
        printer_id: "printer_208".into(),
        state: DeviceState::On,
    });
    assert!(!refused.success);
    assert!(!refused.not_found);
    assert!(refused.message.contains("toner"));
    assert_eq!(engine.printer("printer_208").unwrap().state, DeviceState::Off);

    // A refill makes it usable again
    assert_eq!(engine.set_printer_toner("printer_208", 100.0), Ok(100));
    assert!(engine.depleted_at("printer_208", PrinterResource::Toner).is_none());
    assert_eq!(engine.set_printer_state("printer_208", DeviceState::On), Ok(DeviceState::On));
}

/// Unknown ids surface as not-found outcomes and change nothing
#[test]
fn test_unknown_targets() {
    let mut engine = engine();
    let before = engine.snapshot();

    let commands = vec![
        ControlCommand::SetLightState { light_id: "light_999_1".into(), state: DeviceState::On },
        ControlCommand::SetLightBrightness { light_id: "nope".into(), brightness: 10 },
        ControlCommand::SetBlindsState { blinds_id: "blinds_202".into(), state: BlindsState::Closed },
        ControlCommand::SetPrinterState { printer_id: "printer_101".into(), state: DeviceState::On },
        ControlCommand::SetPrinterPaper { printer_id: "printer_0".into(), level: 50.0 },
        ControlCommand::SetHeating { room_id: Some("room_404".into()), on: true },
    ];
    for command in commands {
        let outcome = engine.apply_command(command);
        assert!(!outcome.success);
        assert!(outcome.not_found, "{}", outcome.message);
    }

    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.statistics().commands_failed, 6);
}

/// A JSON-lines script applied command by command
#[test]
fn test_command_script() {
    let mut engine = engine();
    let script = r#"
# morning routine
{"command": "set_external_temperature", "temperature": 3.5}
{"command": "set_blinds_state", "blinds_id": "blinds_208", "state": "CLOSED"}
{"command": "set_light_state", "light_id": "light_208_1", "state": "ON"}
{"command": "set_light_brightness", "light_id": "light_208_1", "brightness": 140}
{"command": "set_heating", "room_id": "room_201", "on": false}
{"command": "add_message", "sender": "hvac", "recipient": "broadcast", "type": "INFORM", "content": "Heating schedule updated"}
{"command": "set_printer_state", "printer_id": "printer_999", "state": "ON"}
"#;

    let outcomes: Vec<_> = ControlCommand::parse_script(script)
        .unwrap()
        .into_iter()
        .map(|command| engine.apply_command(command))
        .collect();

    assert_eq!(outcomes.len(), 7);
    assert!(outcomes[..6].iter().all(|outcome| outcome.success));
    assert!(outcomes[6].not_found);

    assert_eq!(engine.state().external_temperature, 3.5);
    assert_eq!(engine.blinds("blinds_208").unwrap().state, BlindsState::Closed);
    let light = engine.light("light_208_1").unwrap();
    assert_eq!(light.state, DeviceState::On);
    assert_eq!(light.brightness, 100);
    assert!(!engine.room("room_201").unwrap().heating_on);
    assert_eq!(engine.messages(&MessageFilter::inbox("lighting")).len(), 1);
}

/// Alert and message logs keep only their most recent entries
#[test]
fn test_log_capacities() {
    let mut engine = engine();

    for n in 0..(ALERT_LOG_CAPACITY + 50) {
        engine
            .add_alert(NewAlert::new("custom", "printer_102", format!("alert {}", n), AlertSeverity::Info))
            .unwrap();
    }
    let alerts = engine.alerts();
    assert_eq!(alerts.len(), ALERT_LOG_CAPACITY);
    assert_eq!(alerts[0].message, "alert 50");
    assert_eq!(alerts[ALERT_LOG_CAPACITY - 1].message, format!("alert {}", ALERT_LOG_CAPACITY + 49));

    for n in 0..(MESSAGE_LOG_CAPACITY + 25) {
        engine
            .add_message(NewMessage::new("printing", "lighting", MessageType::Inform, format!("msg {}", n)))
            .unwrap();
    }
    let messages = engine.messages(&MessageFilter::all());
    assert_eq!(messages.len(), MESSAGE_LOG_CAPACITY);
    assert_eq!(messages[0].content, "msg 25");

    // The event log is never trimmed on its own
    for _ in 0..300 {
        engine.set_printer_paper("printer_102", 0.0).unwrap();
        engine.set_printer_paper("printer_102", 50.0).unwrap();
    }
    assert!(engine.events().len() >= 300);
    let depletions = engine.statistics().resource_depletions as usize;
    assert_eq!(engine.clear_events(), depletions);
    assert!(engine.events().is_empty());
}

/// Message filters combine recipient, sender and time
#[test]
fn test_message_filters() {
    let mut engine = engine();
    engine.add_message(NewMessage::new("hvac", "lighting", MessageType::Request, "Dim room 201")).unwrap();
    engine.add_message(NewMessage::new("printing", "hvac", MessageType::Inform, "Toner low")).unwrap();
    engine.update(10.0).unwrap();
    engine.add_message(NewMessage::broadcast("security", MessageType::Inform, "Door sensor offline")).unwrap();

    let lighting = engine.messages(&MessageFilter::inbox("lighting"));
    assert_eq!(lighting.len(), 2);
    assert!(lighting[1].is_broadcast());

    let from_hvac = engine.messages(&MessageFilter::all().from_sender("hvac"));
    assert_eq!(from_hvac.len(), 1);

    let recent = engine.messages(&MessageFilter::all().after(monday(9, 0)));
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].sender, "security");
}

/// Alerts are read back oldest first and can be filtered by time
#[test]
fn test_alerts_since() {
    let mut engine = engine();
    engine.add_alert(NewAlert::new("door", "blinds_101", "Stuck", AlertSeverity::Warning)).unwrap();
    engine.update(5.0).unwrap();
    engine.add_alert(NewAlert::new("door", "blinds_102", "Stuck", AlertSeverity::Warning)).unwrap();

    let since = engine.alerts_since(monday(9, 0));
    assert_eq!(since.len(), 1);
    assert_eq!(since[0].device_id, "blinds_102");
    assert_eq!(since[0].room_name.as_deref(), Some("Open Office"));

    assert!(engine.add_alert(NewAlert::new("x", " ", "blank", AlertSeverity::Info)).is_err());
}
