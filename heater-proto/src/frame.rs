//! Wire layout of a blue-wire exchange.
//!
//! One exchange is a 48-byte frame: the controller's 24-byte request followed
//! by the heater's 24-byte response.
//!
//! ```text
//! ┌──────┬──────┬──────────────────────┬─────────┐
//! │ 0x76 │ 0x16 │ 20 data bytes        │ CRC16BE │   controller half (0..24)
//! ├──────┼──────┼──────────────────────┼─────────┤
//! │ 0x76 │ 0x16 │ 20 data bytes        │ CRC16BE │   heater half (24..48)
//! └──────┴──────┴──────────────────────┴─────────┘
//! ```
//!
//! Marker, length and CRC look the same in both halves. Byte 21 tells them
//! apart: it is non-zero in a controller request and zero in a heater
//! response.

/// Start marker of each half.
pub const START_MARKER: u8 = 0x76;

/// Declared payload length carried in byte 1 of each half.
pub const DECLARED_LENGTH: u8 = 0x16;

/// Size of one half (marker + length + 20 data bytes + CRC).
pub const HALF_LEN: usize = 24;

/// Size of a complete frame (controller half + heater half).
pub const FRAME_LEN: usize = 2 * HALF_LEN;

/// Offset of the heater half within a frame.
pub const HEATER_OFFSET: usize = HALF_LEN;

/// Offset of the CRC within a half.
pub const CRC_OFFSET: usize = 22;

/// Offset of the byte that identifies which half this is.
pub const HALF_TAG_OFFSET: usize = 21;

/// Default serial baud rate of the heater bus.
pub const BAUDRATE: u32 = 25_000;

/// Byte offsets within the controller half.
pub mod controller {
    pub const COMMAND: usize = 2;
    pub const CURRENT_TEMPERATURE: usize = 3;
    pub const DESIRED_TEMPERATURE: usize = 4;
    pub const MIN_PUMP_FREQUENCY: usize = 5;
    pub const MAX_PUMP_FREQUENCY: usize = 6;
    pub const MIN_FAN_SPEED: usize = 7;
    pub const MAX_FAN_SPEED: usize = 9;
    pub const OPERATING_VOLTAGE: usize = 11;
    pub const THERMOSTAT_MODE: usize = 13;
}

/// Byte offsets within the heater half.
pub mod heater {
    pub const RUN_STATE: usize = 2;
    pub const ON_OFF: usize = 3;
    pub const SUPPLY_VOLTAGE: usize = 4;
    pub const FAN_SPEED: usize = 6;
    pub const FAN_VOLTAGE: usize = 8;
    pub const HEAT_EXCHANGER_TEMPERATURE: usize = 10;
    pub const GLOW_PLUG_VOLTAGE: usize = 12;
    pub const GLOW_PLUG_CURRENT: usize = 14;
    pub const PUMP_FREQUENCY: usize = 16;
    pub const ERROR_CODE: usize = 17;
}

/// Which half of a frame a check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Half {
    /// Controller request (bytes 0..24).
    Controller,
    /// Heater response (bytes 24..48).
    Heater,
}

impl Half {
    /// Offset of this half within a frame.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Half::Controller => 0,
            Half::Heater => HEATER_OFFSET,
        }
    }

    /// Whether byte 21 of a half identifies it as this half.
    #[inline]
    #[must_use]
    pub const fn accepts_tag(self, tag: u8) -> bool {
        match self {
            Half::Controller => tag != 0,
            Half::Heater => tag == 0,
        }
    }
}

/// Errors raised while framing or validating a frame.
///
/// None of these are fatal: the framer recovers on its own and the caller
/// simply waits for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// A half declared more bytes than a frame can hold.
    Overflow,
    /// Inter-byte gap exceeded the timeout; the partial frame was dropped.
    Timeout,
    /// Start marker, declared length or half tag wrong for its position.
    Misaligned(Half),
    /// CRC mismatch.
    Corrupt(Half),
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::Overflow => f.write_str("declared length overflows frame"),
            FrameError::Timeout => f.write_str("inter-byte timeout"),
            FrameError::Misaligned(half) => write!(f, "{:?} half misaligned", half),
            FrameError::Corrupt(half) => write!(f, "{:?} half CRC mismatch", half),
        }
    }
}

/// A complete, framing-aligned but not yet validated frame.
///
/// Produced by [`Framer`](crate::Framer) once 48 bytes have been aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateFrame {
    bytes: [u8; FRAME_LEN],
}

impl CandidateFrame {
    /// Wrap raw frame bytes.
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; FRAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Raw frame bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// Bytes of a single half.
    #[inline]
    #[must_use]
    pub fn half(&self, half: Half) -> &[u8] {
        let start = half.offset();
        &self.bytes[start..start + HALF_LEN]
    }
}

/// Read a big-endian `u16` at `offset` of `half`.
#[inline]
pub(crate) fn be_u16(half: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([half[offset], half[offset + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_slices() {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = 1;
        bytes[HEATER_OFFSET] = 2;
        let frame = CandidateFrame::new(bytes);
        assert_eq!(frame.half(Half::Controller)[0], 1);
        assert_eq!(frame.half(Half::Heater)[0], 2);
        assert_eq!(frame.half(Half::Heater).len(), HALF_LEN);
    }

    #[test]
    fn test_half_tags() {
        assert!(Half::Controller.accepts_tag(0x01));
        assert!(!Half::Controller.accepts_tag(0x00));
        assert!(Half::Heater.accepts_tag(0x00));
        assert!(!Half::Heater.accepts_tag(0x76));
    }

    #[test]
    fn test_be_u16() {
        assert_eq!(be_u16(&[0x00, 0x01, 0x2C], 1), 0x012C);
    }
}
