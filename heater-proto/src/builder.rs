//! Builder API for synthesizing frames.
//!
//! Used to produce known-good frames for tests, bench tools and bus
//! simulators. Values are set in raw wire units; the builder fills in start
//! markers, declared lengths and both CRCs. The controller half carries a
//! non-zero tag unless told otherwise.
//!
//! # Example
//!
//! ```
//! use heater_proto::{decode, validate, FrameBuilder};
//!
//! let frame = FrameBuilder::new()
//!     .current_temperature(19)
//!     .supply_voltage(128) // 12.8 V
//!     .run_state(5)
//!     .build_candidate();
//!
//! let snapshot = decode(validate(&frame).unwrap());
//! assert_eq!(snapshot.current_temperature, 19.0);
//! assert_eq!(snapshot.supply_voltage, 12.8);
//! ```

use crate::crc::calculate_crc16;
use crate::decode::Command;
use crate::frame::{
    controller, heater, CandidateFrame, Half, CRC_OFFSET, DECLARED_LENGTH, FRAME_LEN, HALF_LEN,
    HALF_TAG_OFFSET, START_MARKER,
};

/// Tag written into byte 21 of the controller half by default.
pub const DEFAULT_CONTROLLER_TAG: u8 = 0x01;

/// Fluent builder for a complete 48-byte frame.
///
/// Starts from an idle heater: everything zero, no command.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    bytes: [u8; FRAME_LEN],
}

impl FrameBuilder {
    /// Start from an all-zero frame with a tagged controller half.
    #[must_use]
    pub fn new() -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[HALF_TAG_OFFSET] = DEFAULT_CONTROLLER_TAG;
        Self { bytes }
    }

    #[inline]
    fn set_u8(mut self, half: Half, offset: usize, value: u8) -> Self {
        self.bytes[half.offset() + offset] = value;
        self
    }

    #[inline]
    fn set_u16(mut self, half: Half, offset: usize, value: u16) -> Self {
        let start = half.offset() + offset;
        self.bytes[start..start + 2].copy_from_slice(&value.to_be_bytes());
        self
    }

    /// Override byte 21 of a half.
    ///
    /// Zero on the controller half or non-zero on the heater half produces a
    /// frame the validator rejects as misaligned.
    #[must_use]
    pub fn tag(self, half: Half, tag: u8) -> Self {
        self.set_u8(half, HALF_TAG_OFFSET, tag)
    }

    // --- Controller half ---

    /// Set the controller command byte.
    #[must_use]
    pub fn command(self, command: Command) -> Self {
        self.set_u8(Half::Controller, controller::COMMAND, command.raw())
    }

    /// Set the room temperature reported by the controller (°C).
    #[must_use]
    pub fn current_temperature(self, celsius: u8) -> Self {
        self.set_u8(Half::Controller, controller::CURRENT_TEMPERATURE, celsius)
    }

    /// Set the desired temperature (°C).
    #[must_use]
    pub fn desired_temperature(self, celsius: u8) -> Self {
        self.set_u8(Half::Controller, controller::DESIRED_TEMPERATURE, celsius)
    }

    /// Set pump frequency limits (0.1 Hz units).
    #[must_use]
    pub fn pump_limits(self, min: u8, max: u8) -> Self {
        self.set_u8(Half::Controller, controller::MIN_PUMP_FREQUENCY, min)
            .set_u8(Half::Controller, controller::MAX_PUMP_FREQUENCY, max)
    }

    /// Set fan speed limits (RPM).
    #[must_use]
    pub fn fan_limits(self, min: u16, max: u16) -> Self {
        self.set_u16(Half::Controller, controller::MIN_FAN_SPEED, min)
            .set_u16(Half::Controller, controller::MAX_FAN_SPEED, max)
    }

    /// Set the operating voltage (0.1 V units).
    #[must_use]
    pub fn operating_voltage(self, decivolts: u8) -> Self {
        self.set_u8(Half::Controller, controller::OPERATING_VOLTAGE, decivolts)
    }

    /// Set the thermostat mode flag.
    #[must_use]
    pub fn thermostat(self, enabled: bool) -> Self {
        self.set_u8(Half::Controller, controller::THERMOSTAT_MODE, enabled as u8)
    }

    // --- Heater half ---

    /// Set the raw run-state code.
    #[must_use]
    pub fn run_state(self, code: u8) -> Self {
        self.set_u8(Half::Heater, heater::RUN_STATE, code)
    }

    /// Set the on/off flag.
    #[must_use]
    pub fn on(self, on: bool) -> Self {
        self.set_u8(Half::Heater, heater::ON_OFF, on as u8)
    }

    /// Set the supply voltage (0.1 V units).
    #[must_use]
    pub fn supply_voltage(self, decivolts: u16) -> Self {
        self.set_u16(Half::Heater, heater::SUPPLY_VOLTAGE, decivolts)
    }

    /// Set the fan speed (RPM).
    #[must_use]
    pub fn fan_speed(self, rpm: u16) -> Self {
        self.set_u16(Half::Heater, heater::FAN_SPEED, rpm)
    }

    /// Set the fan voltage (0.1 V units).
    #[must_use]
    pub fn fan_voltage(self, decivolts: u16) -> Self {
        self.set_u16(Half::Heater, heater::FAN_VOLTAGE, decivolts)
    }

    /// Set the heat-exchanger temperature (°C).
    #[must_use]
    pub fn heat_exchanger_temperature(self, celsius: u16) -> Self {
        self.set_u16(Half::Heater, heater::HEAT_EXCHANGER_TEMPERATURE, celsius)
    }

    /// Set the glow-plug voltage (0.1 V units).
    #[must_use]
    pub fn glow_plug_voltage(self, decivolts: u16) -> Self {
        self.set_u16(Half::Heater, heater::GLOW_PLUG_VOLTAGE, decivolts)
    }

    /// Set the glow-plug current (0.01 A units).
    #[must_use]
    pub fn glow_plug_current(self, centiamps: u16) -> Self {
        self.set_u16(Half::Heater, heater::GLOW_PLUG_CURRENT, centiamps)
    }

    /// Set the pump frequency (0.1 Hz units).
    #[must_use]
    pub fn pump_frequency(self, decihertz: u8) -> Self {
        self.set_u8(Half::Heater, heater::PUMP_FREQUENCY, decihertz)
    }

    /// Set the raw error code.
    #[must_use]
    pub fn error_code(self, code: u8) -> Self {
        self.set_u8(Half::Heater, heater::ERROR_CODE, code)
    }

    /// Finish the frame: markers, declared lengths and CRCs are filled in.
    #[must_use]
    pub fn build(mut self) -> [u8; FRAME_LEN] {
        for half in [Half::Controller, Half::Heater] {
            let start = half.offset();
            let bytes = &mut self.bytes[start..start + HALF_LEN];
            bytes[0] = START_MARKER;
            bytes[1] = DECLARED_LENGTH;
            let crc = calculate_crc16(&bytes[..CRC_OFFSET]);
            bytes[CRC_OFFSET..].copy_from_slice(&crc.to_be_bytes());
        }
        self.bytes
    }

    /// Finish the frame and wrap it as a [`CandidateFrame`].
    #[must_use]
    pub fn build_candidate(self) -> CandidateFrame {
        CandidateFrame::new(self.build())
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::calculate_crc16;

    #[test]
    fn test_build_sets_markers_and_lengths() {
        let bytes = FrameBuilder::new().build();
        assert_eq!(bytes[0], START_MARKER);
        assert_eq!(bytes[1], DECLARED_LENGTH);
        assert_eq!(bytes[HALF_LEN], START_MARKER);
        assert_eq!(bytes[HALF_LEN + 1], DECLARED_LENGTH);
    }

    #[test]
    fn test_build_crc_matches_payload() {
        let bytes = FrameBuilder::new().fan_speed(1700).error_code(3).build();
        let heater = &bytes[HALF_LEN..];
        let stored = u16::from_be_bytes([heater[CRC_OFFSET], heater[CRC_OFFSET + 1]]);
        assert_eq!(stored, calculate_crc16(&heater[..CRC_OFFSET]));
    }

    #[test]
    fn test_u16_fields_are_big_endian() {
        let bytes = FrameBuilder::new().supply_voltage(0x0102).build();
        assert_eq!(bytes[HALF_LEN + heater::SUPPLY_VOLTAGE], 0x01);
        assert_eq!(bytes[HALF_LEN + heater::SUPPLY_VOLTAGE + 1], 0x02);
    }

    #[test]
    fn test_halves_are_tagged() {
        let bytes = FrameBuilder::new().build();
        assert_eq!(bytes[HALF_TAG_OFFSET], DEFAULT_CONTROLLER_TAG);
        assert_eq!(bytes[HALF_LEN + HALF_TAG_OFFSET], 0x00);

        let bytes = FrameBuilder::new().tag(Half::Controller, 0x5A).build();
        assert_eq!(bytes[HALF_TAG_OFFSET], 0x5A);
    }

    #[test]
    fn test_command_byte() {
        let bytes = FrameBuilder::new().command(Command::Start).build();
        assert_eq!(bytes[controller::COMMAND], 0xA0);
    }
}
