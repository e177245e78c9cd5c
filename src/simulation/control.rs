//! Control commands
//!
//! Everything an external agent can do to the office goes through the methods
//! in this module. Commands either succeed, name something that does not exist
//! ([`CommandError::NotFound`]), or would break a device contract
//! ([`CommandError::Rejected`]). Out-of-range levels are clamped, not rejected.
//!
//! [`ControlCommand`] is the serializable request schema a transport shell or
//! a command script feeds into [`SimulationEngine::apply_command`].

use crate::events::{EnvironmentEvent, NewAlert, NewMessage};
use crate::simulation::environment::clamp_external_temperature;
use crate::simulation::{
    CommandError, CommandOutcome, CommandResult, SimulationEngine, SimulationError, SimulationResult,
};
use crate::types::{AlertId, BlindsState, DeviceState, EventType, MessageId, PrinterResource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A control request in its wire form
///
/// ```rust
/// use office_environment_simulator::simulation::ControlCommand;
///
/// let command: ControlCommand =
///     serde_json::from_str(r#"{"command": "set_printer_toner", "printer_id": "printer_208", "level": 0}"#).unwrap();
/// assert_eq!(command.name(), "set_printer_toner");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlCommand {
    /// Set the outside temperature (clamped to [-10,35])
    SetExternalTemperature {
        /// Temperature in °C
        temperature: f64,
    },
    /// Switch heating for one room, or every room when `room_id` is absent
    SetHeating {
        /// Room to change
        #[serde(default)]
        room_id: Option<String>,
        /// New heating flag
        on: bool,
    },
    /// Switch a light on or off
    SetLightState {
        /// Light to change
        light_id: String,
        /// ON or OFF
        state: DeviceState,
    },
    /// Dim a light (clamped to [0,100])
    SetLightBrightness {
        /// Light to change
        light_id: String,
        /// Brightness in percent
        brightness: i64,
    },
    /// Open or close blinds
    SetBlindsState {
        /// Blinds to change
        blinds_id: String,
        /// OPEN or CLOSED
        state: BlindsState,
    },
    /// Switch a printer on or off
    SetPrinterState {
        /// Printer to change
        printer_id: String,
        /// ON or OFF
        state: DeviceState,
    },
    /// Set a printer's toner level (clamped to [0,100])
    SetPrinterToner {
        /// Printer to change
        printer_id: String,
        /// Level in percent
        level: f64,
    },
    /// Set a printer's paper level (clamped to [0,100])
    SetPrinterPaper {
        /// Printer to change
        printer_id: String,
        /// Level in percent
        level: f64,
    },
    /// Change the time-speed multiplier
    SetTimeSpeed {
        /// New multiplier, must be positive
        speed: f64,
    },
    /// Append an alert
    AddAlert(NewAlert),
    /// Append an agent message
    AddMessage(NewMessage),
    /// Drop every event
    ClearEvents,
    /// Drop every alert
    ClearAlerts,
    /// Drop every message
    ClearMessages,
}

impl ControlCommand {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            ControlCommand::SetExternalTemperature { .. } => "set_external_temperature",
            ControlCommand::SetHeating { .. } => "set_heating",
            ControlCommand::SetLightState { .. } => "set_light_state",
            ControlCommand::SetLightBrightness { .. } => "set_light_brightness",
            ControlCommand::SetBlindsState { .. } => "set_blinds_state",
            ControlCommand::SetPrinterState { .. } => "set_printer_state",
            ControlCommand::SetPrinterToner { .. } => "set_printer_toner",
            ControlCommand::SetPrinterPaper { .. } => "set_printer_paper",
            ControlCommand::SetTimeSpeed { .. } => "set_time_speed",
            ControlCommand::AddAlert(_) => "add_alert",
            ControlCommand::AddMessage(_) => "add_message",
            ControlCommand::ClearEvents => "clear_events",
            ControlCommand::ClearAlerts => "clear_alerts",
            ControlCommand::ClearMessages => "clear_messages",
        }
    }

    /// Parse a JSON-lines command script
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse_script(script: &str) -> SimulationResult<Vec<ControlCommand>> {
        script
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
            .map(|(number, line)| {
                serde_json::from_str(line).map_err(|err| {
                    SimulationError::configuration_error(format!("command script line {}: {}", number, err))
                })
            })
            .collect()
    }
}

impl SimulationEngine {
    /// Apply a wire command and report the outcome
    pub fn apply_command(&mut self, command: ControlCommand) -> CommandOutcome {
        let name = command.name();
        let result = match command {
            ControlCommand::SetExternalTemperature { temperature } => self
                .set_external_temperature(temperature)
                .map(|t| format!("External temperature set to {:.1}°C", t)),
            ControlCommand::SetHeating { room_id, on } => self
                .set_heating(room_id.as_deref(), on)
                .map(|rooms| format!("Heating {} in {} room(s)", if on { "on" } else { "off" }, rooms)),
            ControlCommand::SetLightState { light_id, state } => self
                .set_light_state(&light_id, state)
                .map(|()| format!("Light {} is {}", light_id, state)),
            ControlCommand::SetLightBrightness { light_id, brightness } => self
                .set_light_brightness(&light_id, brightness)
                .map(|b| format!("Light {} brightness {}", light_id, b)),
            ControlCommand::SetBlindsState { blinds_id, state } => self
                .set_blinds_state(&blinds_id, state)
                .map(|()| format!("Blinds {} are {}", blinds_id, state)),
            ControlCommand::SetPrinterState { printer_id, state } => self
                .set_printer_state(&printer_id, state)
                .map(|s| format!("Printer {} is {}", printer_id, s)),
            ControlCommand::SetPrinterToner { printer_id, level } => self
                .set_printer_toner(&printer_id, level)
                .map(|l| format!("Printer {} toner at {}%", printer_id, l)),
            ControlCommand::SetPrinterPaper { printer_id, level } => self
                .set_printer_paper(&printer_id, level)
                .map(|l| format!("Printer {} paper at {}%", printer_id, l)),
            ControlCommand::SetTimeSpeed { speed } => {
                self.set_time_speed(speed).map(|()| format!("Time speed set to {}", speed))
            }
            ControlCommand::AddAlert(alert) => self.add_alert(alert).map(|id| format!("Alert {} added", id)),
            ControlCommand::AddMessage(message) => {
                self.add_message(message).map(|id| format!("Message {} added", id))
            }
            ControlCommand::ClearEvents => Ok(format!("Cleared {} events", self.clear_events())),
            ControlCommand::ClearAlerts => Ok(format!("Cleared {} alerts", self.clear_alerts())),
            ControlCommand::ClearMessages => Ok(format!("Cleared {} messages", self.clear_messages())),
        };

        match result {
            Ok(message) => {
                debug!("Command {} applied: {}", name, message);
                CommandOutcome::ok(message)
            }
            Err(err) => {
                warn!("Command {} failed: {}", name, err);
                err.into()
            }
        }
    }

    fn tally<T>(&mut self, result: CommandResult<T>) -> CommandResult<T> {
        self.statistics.record_command(result.is_ok());
        result
    }

    /// Set the outside temperature, returning the clamped value
    pub fn set_external_temperature(&mut self, temperature: f64) -> CommandResult<f64> {
        let clamped = clamp_external_temperature(temperature);
        self.state.external_temperature = clamped;
        info!("External temperature set to {:.1}", clamped);
        self.tally(Ok(clamped))
    }

    /// Switch heating for one room or, with `None`, for every room
    ///
    /// Switching heating on is refused during a power outage. Returns how many
    /// rooms were changed.
    pub fn set_heating(&mut self, room_id: Option<&str>, on: bool) -> CommandResult<usize> {
        let outage = self.state.power_outage;
        let result = match room_id {
            Some(room_id) if on && outage && self.state.room(room_id).is_some() => {
                Err(CommandError::rejected("Cannot turn on heating during a power outage"))
            }
            None if on && outage => Err(CommandError::rejected("Cannot turn on heating during a power outage")),
            Some(room_id) => match self.state.room_mut(room_id) {
                Some(room) => {
                    room.heating_on = on;
                    Ok(1)
                }
                None => Err(CommandError::not_found("room", room_id)),
            },
            None => {
                for room in &mut self.state.rooms {
                    room.heating_on = on;
                }
                Ok(self.state.rooms.len())
            }
        };
        self.tally(result)
    }

    /// Switch a light on or off
    ///
    /// Broken lights accept no state change, and no light can be switched on
    /// during a power outage.
    pub fn set_light_state(&mut self, light_id: &str, state: DeviceState) -> CommandResult {
        let outage = self.state.power_outage;
        let result = match self.state.light_mut(light_id) {
            None => Err(CommandError::not_found("light", light_id)),
            Some(_) if state.is_broken() => {
                Err(CommandError::rejected("Lights cannot be set to BROKEN by command"))
            }
            Some(light) if light.state.is_broken() => {
                Err(CommandError::rejected(format!("Light {} is broken", light_id)))
            }
            Some(_) if state.is_on() && outage => {
                Err(CommandError::rejected("Cannot turn on lights during a power outage"))
            }
            Some(light) => {
                light.state = state;
                Ok(())
            }
        };
        self.tally(result)
    }

    /// Set a light's brightness, returning the clamped value
    ///
    /// Brightness may be changed on any light, broken or not.
    pub fn set_light_brightness(&mut self, light_id: &str, brightness: i64) -> CommandResult<u8> {
        let result = match self.state.light_mut(light_id) {
            Some(light) => {
                light.brightness = brightness.clamp(0, 100) as u8;
                Ok(light.brightness)
            }
            None => Err(CommandError::not_found("light", light_id)),
        };
        self.tally(result)
    }

    /// Open or close blinds
    pub fn set_blinds_state(&mut self, blinds_id: &str, state: BlindsState) -> CommandResult {
        let result = match self.state.blinds_mut(blinds_id) {
            Some(blinds) => {
                blinds.state = state;
                Ok(())
            }
            None => Err(CommandError::not_found("blinds", blinds_id)),
        };
        self.tally(result)
    }

    /// Switch a printer on or off, returning its resulting state
    ///
    /// ON is refused for a broken printer, during a power outage, or when toner
    /// or paper is empty. OFF always succeeds; a broken printer stays BROKEN.
    pub fn set_printer_state(&mut self, printer_id: &str, state: DeviceState) -> CommandResult<DeviceState> {
        let outage = self.state.power_outage;
        let result = match self.state.room_with_printer_mut(printer_id).and_then(|room| room.printer.as_mut()) {
            None => Err(CommandError::not_found("printer", printer_id)),
            Some(_) if state.is_broken() => {
                Err(CommandError::rejected("Printers cannot be set to BROKEN by command"))
            }
            Some(printer) if state == DeviceState::Off => {
                if !printer.state.is_broken() {
                    printer.state = DeviceState::Off;
                }
                Ok(printer.state)
            }
            Some(printer) if printer.state.is_broken() => {
                Err(CommandError::rejected(format!("Printer {} is broken", printer_id)))
            }
            Some(_) if outage => Err(CommandError::rejected("Cannot turn on printer during a power outage")),
            Some(printer) if printer.toner_level <= 0.0 => {
                Err(CommandError::rejected(format!("Printer {} is out of toner", printer_id)))
            }
            Some(printer) if printer.paper_level <= 0.0 => {
                Err(CommandError::rejected(format!("Printer {} is out of paper", printer_id)))
            }
            Some(printer) => {
                printer.state = DeviceState::On;
                Ok(DeviceState::On)
            }
        };
        self.tally(result)
    }

    /// Set a printer's toner level, returning the emitted percentage
    pub fn set_printer_toner(&mut self, printer_id: &str, level: f64) -> CommandResult<u8> {
        let result = self.set_printer_resource(printer_id, PrinterResource::Toner, level);
        self.tally(result)
    }

    /// Set a printer's paper level, returning the emitted percentage
    pub fn set_printer_paper(&mut self, printer_id: &str, level: f64) -> CommandResult<u8> {
        let result = self.set_printer_resource(printer_id, PrinterResource::Paper, level);
        self.tally(result)
    }

    /// Write a resource level and restore the printer invariant in one step
    ///
    /// A printer that is ON when a resource hits zero is switched off before
    /// the lock is released. Depletion and refill are tracked in the ledger.
    fn set_printer_resource(
        &mut self,
        printer_id: &str,
        resource: PrinterResource,
        level: f64,
    ) -> CommandResult<u8> {
        let now = self.state.simulation_time;
        // Stored at the emitted whole percent, so a level that reads as 0 is 0
        let level = if level.is_nan() { 0.0 } else { level.clamp(0.0, 100.0).round() };

        let room = self
            .state
            .room_with_printer_mut(printer_id)
            .ok_or_else(|| CommandError::not_found("printer", printer_id))?;
        let room_id = room.id.clone();
        let Some(printer) = room.printer.as_mut() else {
            return Err(CommandError::not_found("printer", printer_id));
        };

        let slot = match resource {
            PrinterResource::Toner => &mut printer.toner_level,
            PrinterResource::Paper => &mut printer.paper_level,
        };
        let previous = *slot;
        *slot = level;

        let mut pending = Vec::new();
        if !printer.has_resources() && printer.state.is_on() {
            printer.state = DeviceState::Off;
            self.statistics.printer_auto_offs += 1;
            pending.push(
                EnvironmentEvent::new(
                    EventType::PrinterAutoOff,
                    now,
                    format!("Printer {} turned off: {} is empty", printer_id, resource),
                )
                .in_room(&room_id)
                .for_device(printer_id),
            );
        }
        let emitted = match resource {
            PrinterResource::Toner => printer.toner_percent(),
            PrinterResource::Paper => printer.paper_percent(),
        };

        if self.depletion.observe(printer_id, resource, previous, level, now) {
            self.statistics.resource_depletions += 1;
            pending.push(
                EnvironmentEvent::new(
                    EventType::PrinterResourceDepleted,
                    now,
                    format!("Printer {} ran out of {}", printer_id, resource),
                )
                .in_room(&room_id)
                .for_device(printer_id),
            );
            self.raise_depletion_alert(printer_id, resource);
        }
        for event in pending {
            self.events.record(event);
        }

        info!("Printer {} {} set to {}%", printer_id, resource, emitted);
        Ok(emitted)
    }

    /// Change the time-speed multiplier
    pub fn set_time_speed(&mut self, speed: f64) -> CommandResult {
        let result = if speed.is_finite() && speed > 0.0 {
            self.state.time_speed = speed;
            Ok(())
        } else {
            Err(CommandError::rejected(format!("Time speed must be positive, got {}", speed)))
        };
        self.tally(result)
    }

    /// Append an alert stamped with the current simulated time
    ///
    /// Missing room information is filled in from the layout when the device
    /// is known; unknown devices are accepted as-is.
    pub fn add_alert(&mut self, alert: NewAlert) -> CommandResult<AlertId> {
        let result = if alert.device_id.trim().is_empty() {
            Err(CommandError::rejected("Alert needs a device id"))
        } else {
            Ok(self.raise_alert(alert).id)
        };
        self.tally(result)
    }

    /// Append an agent message stamped with the current simulated time
    pub fn add_message(&mut self, message: NewMessage) -> CommandResult<MessageId> {
        let result = if message.sender.trim().is_empty() || message.recipient.trim().is_empty() {
            Err(CommandError::rejected("Message needs a sender and a recipient"))
        } else {
            let message = message.into_message(self.state.simulation_time);
            let id = message.id;
            debug!("Message {} from {} to {}", id, message.sender, message.recipient);
            self.messages.push(message);
            Ok(id)
        };
        self.tally(result)
    }

    /// Drop every event, returning how many were removed
    pub fn clear_events(&mut self) -> usize {
        self.events.clear()
    }

    /// Drop every alert, returning how many were removed
    pub fn clear_alerts(&mut self) -> usize {
        let removed = self.alerts.len();
        self.alerts.clear();
        removed
    }

    /// Drop every message, returning how many were removed
    pub fn clear_messages(&mut self) -> usize {
        let removed = self.messages.len();
        self.messages.clear();
        removed
    }
}
