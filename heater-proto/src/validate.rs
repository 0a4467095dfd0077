//! Frame integrity validation.

use crate::crc::calculate_crc16;
use crate::frame::{
    be_u16, CandidateFrame, FrameError, Half, CRC_OFFSET, DECLARED_LENGTH, FRAME_LEN,
    HALF_TAG_OFFSET, START_MARKER,
};

/// A frame whose structure and both CRCs have been verified.
///
/// Only [`validate`] can produce one; [`decode`](crate::decode) consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFrame {
    bytes: [u8; FRAME_LEN],
}

impl ValidatedFrame {
    /// Raw frame bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// Bytes of a single half.
    #[inline]
    pub(crate) fn half(&self, half: Half) -> &[u8] {
        let start = half.offset();
        &self.bytes[start..start + crate::frame::HALF_LEN]
    }
}

/// Verify markers, declared lengths, half tags and CRCs of both halves.
///
/// Pure: the same bytes always produce the same verdict.
pub fn validate(candidate: &CandidateFrame) -> Result<ValidatedFrame, FrameError> {
    for half in [Half::Controller, Half::Heater] {
        check_half(candidate.half(half), half)?;
    }
    Ok(ValidatedFrame {
        bytes: *candidate.as_bytes(),
    })
}

fn check_half(bytes: &[u8], half: Half) -> Result<(), FrameError> {
    if bytes[0] != START_MARKER {
        return Err(FrameError::Misaligned(half));
    }
    if bytes[1] > DECLARED_LENGTH {
        return Err(FrameError::Overflow);
    }
    if bytes[1] < DECLARED_LENGTH || !half.accepts_tag(bytes[HALF_TAG_OFFSET]) {
        return Err(FrameError::Misaligned(half));
    }

    let expected = calculate_crc16(&bytes[..CRC_OFFSET]);
    let received = be_u16(bytes, CRC_OFFSET);
    if expected != received {
        return Err(FrameError::Corrupt(half));
    }
    Ok(())
}
