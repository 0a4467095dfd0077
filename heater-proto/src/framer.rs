//! Byte-stream framer.
//!
//! Aligns the raw bus stream on `0x76` start markers and accumulates exactly
//! one 48-byte frame at a time. Stray bytes are dropped, structural mismatches
//! (including a heater response where a controller request belongs) trigger a
//! resync on the next marker already held in the buffer, and a partial frame
//! is abandoned once the line has been quiet for longer than the inter-byte
//! timeout.

use heapless::Vec;

use crate::frame::{
    CandidateFrame, FrameError, Half, DECLARED_LENGTH, FRAME_LEN, HALF_TAG_OFFSET, HEATER_OFFSET,
    START_MARKER,
};

/// Default inter-byte timeout in milliseconds.
///
/// A whole frame takes ~20 ms on the wire at 25000 baud and exchanges repeat
/// roughly once a second.
pub const DEFAULT_FRAME_TIMEOUT_MS: u32 = 250;

/// Stateful frame assembler.
///
/// Memory use is bounded by a single frame buffer regardless of traffic.
#[derive(Debug, Clone)]
pub struct Framer {
    buffer: Vec<u8, FRAME_LEN>,
    /// Timestamp of the most recently accepted byte (ms).
    last_byte_ms: u64,
    timeout_ms: u32,
    /// Bytes dropped outside any frame since creation.
    discarded: u32,
}

impl Framer {
    /// Create an idle framer with the given inter-byte timeout.
    #[must_use]
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            buffer: Vec::new(),
            last_byte_ms: 0,
            timeout_ms,
            discarded: 0,
        }
    }

    /// Abandon any partial frame and return to idle.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of bytes of the frame currently being assembled.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the framer is waiting for a start marker.
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Total bytes dropped as noise (outside any aligned frame).
    #[inline]
    #[must_use]
    pub fn discarded_bytes(&self) -> u32 {
        self.discarded
    }

    /// Drop the partial frame if the line has been quiet for too long.
    ///
    /// Returns `true` if a partial frame was abandoned.
    pub fn expire(&mut self, now_ms: u64) -> bool {
        if self.buffer.is_empty() {
            return false;
        }
        if now_ms.saturating_sub(self.last_byte_ms) > u64::from(self.timeout_ms) {
            self.discard_all();
            return true;
        }
        false
    }

    /// Feed one byte received at `now_ms`.
    ///
    /// Returns `Ok(Some(frame))` once 48 aligned bytes have been collected,
    /// `Ok(None)` while more bytes are needed. An error reports a desync that
    /// has already been recovered from; the byte itself is never lost: after
    /// a timeout it is treated as the first byte of a fresh search, after a
    /// structural mismatch it takes part in the resync.
    pub fn push_byte(
        &mut self,
        byte: u8,
        now_ms: u64,
    ) -> Result<Option<CandidateFrame>, FrameError> {
        let timed_out = self.expire(now_ms);
        self.last_byte_ms = now_ms;

        let result = self.accept(byte);
        if timed_out {
            // A byte arriving on an idle framer can neither complete nor
            // reject a frame, so nothing from `accept` is hidden here.
            return Err(FrameError::Timeout);
        }
        result
    }

    fn accept(&mut self, byte: u8) -> Result<Option<CandidateFrame>, FrameError> {
        if self.buffer.is_empty() {
            if byte == START_MARKER {
                // Cannot fail on an empty buffer.
                let _ = self.buffer.push(byte);
            } else {
                self.discarded = self.discarded.saturating_add(1);
            }
            return Ok(None);
        }

        if self.buffer.push(byte).is_err() {
            self.discard_all();
            return Err(FrameError::Overflow);
        }

        let pos = self.buffer.len() - 1;
        if let Err(err) = check_structure(pos, byte) {
            self.resync();
            return Err(err);
        }

        if self.buffer.len() == FRAME_LEN {
            let mut bytes = [0u8; FRAME_LEN];
            bytes.copy_from_slice(&self.buffer);
            self.buffer.clear();
            return Ok(Some(CandidateFrame::new(bytes)));
        }

        Ok(None)
    }

    /// Restart alignment at the next start marker after the current one.
    ///
    /// Bytes already buffered are re-examined instead of being thrown away,
    /// so a false start inside noise does not swallow a genuine frame that
    /// began in the middle of it.
    fn resync(&mut self) {
        let mut tail = [0u8; FRAME_LEN];

        loop {
            let len = self.buffer.len().saturating_sub(1);
            tail[..len].copy_from_slice(&self.buffer[1..]);
            self.buffer.clear();

            // The rejected marker is discarded along with any stray bytes.
            let Some(start) = tail[..len].iter().position(|&b| b == START_MARKER) else {
                self.count_discarded(len + 1);
                return;
            };
            self.count_discarded(start + 1);

            if self.buffer.extend_from_slice(&tail[start..len]).is_err() {
                self.buffer.clear();
                return;
            }

            let aligned = self
                .buffer
                .iter()
                .enumerate()
                .all(|(pos, &b)| check_structure(pos, b).is_ok());
            if aligned {
                return;
            }
        }
    }

    fn discard_all(&mut self) {
        self.count_discarded(self.buffer.len());
        self.buffer.clear();
    }

    #[inline]
    fn count_discarded(&mut self, n: usize) {
        self.discarded = self.discarded.saturating_add(n as u32);
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_TIMEOUT_MS)
    }
}

const HEATER_LENGTH: usize = HEATER_OFFSET + 1;
const HEATER_TAG: usize = HEATER_OFFSET + HALF_TAG_OFFSET;

/// Check a byte against the fixed structure of the frame at position `pos`.
fn check_structure(pos: usize, byte: u8) -> Result<(), FrameError> {
    match pos {
        0 | HEATER_OFFSET if byte != START_MARKER => Err(FrameError::Misaligned(half_at(pos))),
        1 | HEATER_LENGTH if byte > DECLARED_LENGTH => Err(FrameError::Overflow),
        1 | HEATER_LENGTH if byte < DECLARED_LENGTH => Err(FrameError::Misaligned(half_at(pos))),
        HALF_TAG_OFFSET | HEATER_TAG if !half_at(pos).accepts_tag(byte) => {
            Err(FrameError::Misaligned(half_at(pos)))
        }
        _ => Ok(()),
    }
}

#[inline]
fn half_at(pos: usize) -> Half {
    if pos < HEATER_OFFSET {
        Half::Controller
    } else {
        Half::Heater
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::builder::FrameBuilder;
    use crate::decode::Command;
    use std::vec::Vec as StdVec;

    /// Feed all bytes at the same instant, collecting frames and errors.
    fn feed(
        framer: &mut Framer,
        bytes: &[u8],
        now_ms: u64,
    ) -> (StdVec<CandidateFrame>, StdVec<FrameError>) {
        let mut frames = StdVec::new();
        let mut errors = StdVec::new();
        for &b in bytes {
            match framer.push_byte(b, now_ms) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }
        (frames, errors)
    }

    #[test]
    fn test_single_frame() {
        let bytes = FrameBuilder::new().fan_speed(2000).build();
        let mut framer = Framer::default();
        let (frames, errors) = feed(&mut framer, &bytes, 0);
        assert_eq!(frames.len(), 1);
        assert!(errors.is_empty());
        assert_eq!(frames[0].as_bytes(), &bytes);
        assert!(framer.is_idle());
    }

    #[test]
    fn test_leading_noise_dropped() {
        let bytes = FrameBuilder::new().build();
        let mut framer = Framer::default();
        let (frames, _) = feed(&mut framer, &[0x00, 0x11, 0xFF], 0);
        assert!(frames.is_empty());
        assert_eq!(framer.discarded_bytes(), 3);

        let (frames, errors) = feed(&mut framer, &bytes, 0);
        assert_eq!(frames.len(), 1);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_false_start_resyncs_on_real_frame() {
        // A stray marker followed by the start of a genuine frame.
        let bytes = FrameBuilder::new().run_state(5).build();
        let mut stream = StdVec::from([START_MARKER]);
        stream.extend_from_slice(&bytes);

        let mut framer = Framer::default();
        let (frames, errors) = feed(&mut framer, &stream, 0);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &bytes);
        // 0x76 in the length slot reads as an oversized declaration.
        assert_eq!(errors, [FrameError::Overflow]);
    }

    #[test]
    fn test_missing_heater_marker() {
        let mut bytes = FrameBuilder::new().build();
        bytes[HEATER_OFFSET] = 0x00;

        let mut framer = Framer::default();
        let (frames, errors) = feed(&mut framer, &bytes, 0);
        assert!(frames.is_empty());
        assert_eq!(errors[0], FrameError::Misaligned(Half::Heater));
        assert!(framer.pending_len() < FRAME_LEN);
    }

    #[test]
    fn test_short_declared_length_is_misaligned() {
        let mut framer = Framer::default();
        let (_, errors) = feed(&mut framer, &[START_MARKER, 0x10], 0);
        assert_eq!(errors, [FrameError::Misaligned(Half::Controller)]);
        assert!(framer.is_idle());
    }

    #[test]
    fn test_timeout_discards_partial_frame() {
        let bytes = FrameBuilder::new().build();
        let mut framer = Framer::new(100);

        let (_, errors) = feed(&mut framer, &bytes[..10], 0);
        assert!(errors.is_empty());
        assert_eq!(framer.pending_len(), 10);

        // Rest of a fresh frame arrives long after: partial is dropped.
        let (frames, errors) = feed(&mut framer, &bytes, 500);
        assert_eq!(errors, [FrameError::Timeout]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &bytes);
    }

    #[test]
    fn test_gap_within_timeout_is_tolerated() {
        let bytes = FrameBuilder::new().build();
        let mut framer = Framer::new(100);
        let (_, _) = feed(&mut framer, &bytes[..24], 0);
        let (frames, errors) = feed(&mut framer, &bytes[24..], 60);
        assert_eq!(frames.len(), 1);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_expire() {
        let mut framer = Framer::new(100);
        let _ = feed(&mut framer, &[START_MARKER, DECLARED_LENGTH], 0);
        assert!(!framer.expire(100));
        assert!(framer.expire(101));
        assert!(framer.is_idle());
        assert!(!framer.expire(1000));
    }

    #[test]
    fn test_mid_exchange_start_skips_heater_half() {
        let first = FrameBuilder::new().fan_speed(1800).build();
        let second = FrameBuilder::new().fan_speed(2400).build();
        let mut stream = StdVec::from(&first[HEATER_OFFSET..]);
        stream.extend_from_slice(&second);

        let mut framer = Framer::default();
        let (frames, errors) = feed(&mut framer, &stream, 0);
        assert_eq!(errors[0], FrameError::Misaligned(Half::Controller));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &second);
    }

    #[test]
    fn test_lone_request_resyncs_one_half_forward() {
        // A request the heater never answered, then a full exchange.
        let unanswered = FrameBuilder::new().command(Command::Start).build();
        let exchange = FrameBuilder::new().run_state(5).build();
        let mut stream = StdVec::from(&unanswered[..HEATER_OFFSET]);
        stream.extend_from_slice(&exchange);

        let mut framer = Framer::default();
        let (frames, errors) = feed(&mut framer, &stream, 0);
        assert_eq!(errors, [FrameError::Misaligned(Half::Heater)]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &exchange);
    }

    #[test]
    fn test_back_to_back_frames() {
        let first = FrameBuilder::new().fan_speed(1).build();
        let second = FrameBuilder::new().fan_speed(2).build();
        let mut stream = StdVec::from(first);
        stream.extend_from_slice(&second);

        let mut framer = Framer::default();
        let (frames, errors) = feed(&mut framer, &stream, 0);
        assert!(errors.is_empty());
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].as_bytes(), &second);
    }
}
