//! Telemetry decoding.
//!
//! Maps the fixed byte offsets of a [`ValidatedFrame`] onto physical values.
//! Decoding is total: a validated frame always has every offset present, and
//! unmapped run-state or error codes fall back to an `Unknown(code)` variant.

use core::fmt::{self, Write};

use heapless::String;

use crate::fields::{BinaryField, NumericField, TextField};
use crate::frame::{be_u16, controller, heater, Half};
use crate::validate::ValidatedFrame;

/// Capacity of a rendered text value.
pub const TEXT_CAPACITY: usize = 40;

/// Rendered text value handed to text sinks.
pub type TextValue = String<TEXT_CAPACITY>;

/// Command byte sent by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// No command, regular status poll.
    None,
    /// Start request.
    Start,
    /// Stop request.
    Stop,
    /// Any other value, kept raw.
    Other(u8),
}

impl Command {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Command::None,
            0xA0 => Command::Start,
            0x05 => Command::Stop,
            other => Command::Other(other),
        }
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Command::None => 0x00,
            Command::Start => 0xA0,
            Command::Stop => 0x05,
            Command::Other(raw) => raw,
        }
    }
}

/// Heater run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    Standby,
    StartAcknowledge,
    GlowPlugPreheat,
    FailedIgnition,
    Ignited,
    Running,
    StopAcknowledge,
    Stopping,
    Cooldown,
    Unknown(u8),
}

impl RunState {
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => RunState::Standby,
            1 => RunState::StartAcknowledge,
            2 => RunState::GlowPlugPreheat,
            3 => RunState::FailedIgnition,
            4 => RunState::Ignited,
            5 => RunState::Running,
            6 => RunState::StopAcknowledge,
            7 => RunState::Stopping,
            8 => RunState::Cooldown,
            other => RunState::Unknown(other),
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            RunState::Standby => 0,
            RunState::StartAcknowledge => 1,
            RunState::GlowPlugPreheat => 2,
            RunState::FailedIgnition => 3,
            RunState::Ignited => 4,
            RunState::Running => 5,
            RunState::StopAcknowledge => 6,
            RunState::Stopping => 7,
            RunState::Cooldown => 8,
            RunState::Unknown(code) => code,
        }
    }

    /// Table label, or `None` for an unmapped code.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        Some(match self {
            RunState::Standby => "Off / Standby",
            RunState::StartAcknowledge => "Start Acknowledge",
            RunState::GlowPlugPreheat => "Glow Plug Pre-heat",
            RunState::FailedIgnition => "Failed Ignition - Pause for Retry",
            RunState::Ignited => "Ignited - Heating to Full Temp",
            RunState::Running => "Running",
            RunState::StopAcknowledge => "Stop Acknowledge",
            RunState::Stopping => "Stopping - Post Run Glow Re-heat",
            RunState::Cooldown => "Cooldown",
            RunState::Unknown(_) => return None,
        })
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "Unknown Run State ({})", self.code()),
        }
    }
}

/// Heater error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    NoError,
    NoErrorStarted,
    VoltageTooLow,
    VoltageTooHigh,
    IgnitionPlugFailure,
    PumpOverCurrent,
    TooHot,
    MotorFailure,
    SerialConnectionLost,
    FireExtinguished,
    TemperatureSensorFailure,
    Unknown(u8),
}

impl ErrorCode {
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => ErrorCode::NoError,
            1 => ErrorCode::NoErrorStarted,
            2 => ErrorCode::VoltageTooLow,
            3 => ErrorCode::VoltageTooHigh,
            4 => ErrorCode::IgnitionPlugFailure,
            5 => ErrorCode::PumpOverCurrent,
            6 => ErrorCode::TooHot,
            7 => ErrorCode::MotorFailure,
            8 => ErrorCode::SerialConnectionLost,
            9 => ErrorCode::FireExtinguished,
            10 => ErrorCode::TemperatureSensorFailure,
            other => ErrorCode::Unknown(other),
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            ErrorCode::NoError => 0,
            ErrorCode::NoErrorStarted => 1,
            ErrorCode::VoltageTooLow => 2,
            ErrorCode::VoltageTooHigh => 3,
            ErrorCode::IgnitionPlugFailure => 4,
            ErrorCode::PumpOverCurrent => 5,
            ErrorCode::TooHot => 6,
            ErrorCode::MotorFailure => 7,
            ErrorCode::SerialConnectionLost => 8,
            ErrorCode::FireExtinguished => 9,
            ErrorCode::TemperatureSensorFailure => 10,
            ErrorCode::Unknown(code) => code,
        }
    }

    /// Table label, or `None` for an unmapped code.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        Some(match self {
            ErrorCode::NoError => "No Error",
            ErrorCode::NoErrorStarted => "No Error, But Started",
            ErrorCode::VoltageTooLow => "Voltage Too Low",
            ErrorCode::VoltageTooHigh => "Voltage Too High",
            ErrorCode::IgnitionPlugFailure => "Ignition Plug Failure",
            ErrorCode::PumpOverCurrent => "Pump Failure - Over Current",
            ErrorCode::TooHot => "Too Hot",
            ErrorCode::MotorFailure => "Motor Failure",
            ErrorCode::SerialConnectionLost => "Serial Connection Lost",
            ErrorCode::FireExtinguished => "Fire Extinguished",
            ErrorCode::TemperatureSensorFailure => "Temperature Sensor Failure",
            ErrorCode::Unknown(_) => return None,
        })
    }

    /// Whether the heater reports a fault.
    #[must_use]
    pub const fn is_fault(self) -> bool {
        !matches!(self, ErrorCode::NoError | ErrorCode::NoErrorStarted)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "Unknown Error Code ({})", self.code()),
        }
    }
}

/// Unscaled controller-half fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerHalf {
    pub command: u8,
    pub current_temperature: u8,
    pub desired_temperature: u8,
    /// 0.1 Hz units.
    pub min_pump_frequency: u8,
    /// 0.1 Hz units.
    pub max_pump_frequency: u8,
    pub min_fan_speed: u16,
    pub max_fan_speed: u16,
    /// 0.1 V units.
    pub operating_voltage: u8,
    pub thermostat_mode: u8,
}

impl ControllerHalf {
    fn parse(bytes: &[u8]) -> Self {
        Self {
            command: bytes[controller::COMMAND],
            current_temperature: bytes[controller::CURRENT_TEMPERATURE],
            desired_temperature: bytes[controller::DESIRED_TEMPERATURE],
            min_pump_frequency: bytes[controller::MIN_PUMP_FREQUENCY],
            max_pump_frequency: bytes[controller::MAX_PUMP_FREQUENCY],
            min_fan_speed: be_u16(bytes, controller::MIN_FAN_SPEED),
            max_fan_speed: be_u16(bytes, controller::MAX_FAN_SPEED),
            operating_voltage: bytes[controller::OPERATING_VOLTAGE],
            thermostat_mode: bytes[controller::THERMOSTAT_MODE],
        }
    }
}

/// Unscaled heater-half fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaterHalf {
    pub run_state: u8,
    pub on_off: u8,
    /// 0.1 V units.
    pub supply_voltage: u16,
    pub fan_speed: u16,
    /// 0.1 V units.
    pub fan_voltage: u16,
    pub heat_exchanger_temperature: u16,
    /// 0.1 V units.
    pub glow_plug_voltage: u16,
    /// 0.01 A units.
    pub glow_plug_current: u16,
    /// 0.1 Hz units.
    pub pump_frequency: u8,
    pub error_code: u8,
}

impl HeaterHalf {
    fn parse(bytes: &[u8]) -> Self {
        Self {
            run_state: bytes[heater::RUN_STATE],
            on_off: bytes[heater::ON_OFF],
            supply_voltage: be_u16(bytes, heater::SUPPLY_VOLTAGE),
            fan_speed: be_u16(bytes, heater::FAN_SPEED),
            fan_voltage: be_u16(bytes, heater::FAN_VOLTAGE),
            heat_exchanger_temperature: be_u16(bytes, heater::HEAT_EXCHANGER_TEMPERATURE),
            glow_plug_voltage: be_u16(bytes, heater::GLOW_PLUG_VOLTAGE),
            glow_plug_current: be_u16(bytes, heater::GLOW_PLUG_CURRENT),
            pump_frequency: bytes[heater::PUMP_FREQUENCY],
            error_code: bytes[heater::ERROR_CODE],
        }
    }
}

/// Controller settings carried alongside each exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerSettings {
    pub command: Command,
    /// Hz.
    pub min_pump_frequency: f32,
    /// Hz.
    pub max_pump_frequency: f32,
    /// RPM.
    pub min_fan_speed: f32,
    /// RPM.
    pub max_fan_speed: f32,
    /// V.
    pub operating_voltage: f32,
    pub thermostat: bool,
}

/// One fully decoded exchange, in physical units.
///
/// Every field comes from the same validated frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetrySnapshot {
    /// °C
    pub current_temperature: f32,
    /// °C
    pub heat_exchanger_temperature: f32,
    /// °C
    pub desired_temperature: f32,
    /// RPM
    pub fan_speed: f32,
    /// V
    pub fan_voltage: f32,
    /// V
    pub supply_voltage: f32,
    /// V
    pub glow_plug_voltage: f32,
    /// A
    pub glow_plug_current: f32,
    /// Hz
    pub pump_frequency: f32,
    pub run_state: RunState,
    pub error_code: ErrorCode,
    pub on: bool,
    pub controller: ControllerSettings,
}

impl TelemetrySnapshot {
    /// Value of a numeric field.
    #[must_use]
    pub fn numeric(&self, field: NumericField) -> f32 {
        match field {
            NumericField::CurrentTemperature => self.current_temperature,
            NumericField::FanSpeed => self.fan_speed,
            NumericField::SupplyVoltage => self.supply_voltage,
            NumericField::HeatExchangerTemperature => self.heat_exchanger_temperature,
            NumericField::GlowPlugVoltage => self.glow_plug_voltage,
            NumericField::GlowPlugCurrent => self.glow_plug_current,
            NumericField::PumpFrequency => self.pump_frequency,
            NumericField::DesiredTemperature => self.desired_temperature,
            NumericField::FanVoltage => self.fan_voltage,
        }
    }

    /// Rendered value of a text field.
    #[must_use]
    pub fn text(&self, field: TextField) -> TextValue {
        let mut out = TextValue::new();
        // Longest rendering is well below TEXT_CAPACITY.
        let _ = match field {
            TextField::RunState => write!(out, "{}", self.run_state),
            TextField::ErrorCode => write!(out, "{}", self.error_code),
        };
        out
    }

    /// Value of a binary field.
    #[must_use]
    pub fn binary(&self, field: BinaryField) -> bool {
        match field {
            BinaryField::OnOffState => self.on,
        }
    }
}

/// Split a validated frame into its unscaled halves.
#[must_use]
pub fn decode_raw(frame: &ValidatedFrame) -> (ControllerHalf, HeaterHalf) {
    (
        ControllerHalf::parse(frame.half(Half::Controller)),
        HeaterHalf::parse(frame.half(Half::Heater)),
    )
}

/// Decode a validated frame into a snapshot.
#[must_use]
pub fn decode(frame: ValidatedFrame) -> TelemetrySnapshot {
    let (ctrl, htr) = decode_raw(&frame);

    TelemetrySnapshot {
        current_temperature: f32::from(ctrl.current_temperature),
        heat_exchanger_temperature: f32::from(htr.heat_exchanger_temperature),
        desired_temperature: f32::from(ctrl.desired_temperature),
        fan_speed: f32::from(htr.fan_speed),
        fan_voltage: deci(htr.fan_voltage),
        supply_voltage: deci(htr.supply_voltage),
        glow_plug_voltage: deci(htr.glow_plug_voltage),
        glow_plug_current: f32::from(htr.glow_plug_current) / 100.0,
        pump_frequency: deci(u16::from(htr.pump_frequency)),
        run_state: RunState::from_code(htr.run_state),
        error_code: ErrorCode::from_code(htr.error_code),
        on: htr.on_off == 1,
        controller: ControllerSettings {
            command: Command::from_raw(ctrl.command),
            min_pump_frequency: deci(u16::from(ctrl.min_pump_frequency)),
            max_pump_frequency: deci(u16::from(ctrl.max_pump_frequency)),
            min_fan_speed: f32::from(ctrl.min_fan_speed),
            max_fan_speed: f32::from(ctrl.max_fan_speed),
            operating_voltage: deci(u16::from(ctrl.operating_voltage)),
            thermostat: ctrl.thermostat_mode != 0,
        },
    }
}

/// Tenths to units.
#[inline]
fn deci(raw: u16) -> f32 {
    f32::from(raw) / 10.0
}
