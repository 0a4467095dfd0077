//! Blue-wire diesel heater protocol: framing, validation and decoding.
//!
//! This crate turns the raw byte stream of a parking-heater serial bus into
//! typed telemetry:
//!
//! - **Framing**: [`Framer`] aligns the stream on start markers and assembles
//!   48-byte [`CandidateFrame`]s, recovering from noise, false starts and
//!   stalled transfers on its own.
//! - **Validation**: [`validate()`] checks markers, declared lengths and the
//!   CRC-16/MODBUS of both halves, producing a [`ValidatedFrame`].
//! - **Decoding**: [`decode()`] maps a validated frame to a
//!   [`TelemetrySnapshot`] in physical units.
//! - **Synthesis**: [`FrameBuilder`] produces known-good frames for tests and
//!   bus simulators.
//!
//! # Frame Format
//!
//! ```text
//! controller half (24 bytes)                  heater half (24 bytes)
//! 76 16 <cmd> <temp> <set> ... <crc_hi crc_lo> 76 16 <run> <on> ... <crc_hi crc_lo>
//! ```
//!
//! See [`frame`] for the full offset tables.
//!
//! # Example
//!
//! ```
//! use heater_proto::{decode, validate, FrameBuilder, Framer, RunState};
//!
//! let bytes = FrameBuilder::new().run_state(5).fan_speed(2100).build();
//!
//! let mut framer = Framer::default();
//! let mut snapshot = None;
//! for &b in &bytes {
//!     if let Ok(Some(candidate)) = framer.push_byte(b, 0) {
//!         snapshot = validate(&candidate).ok().map(decode);
//!     }
//! }
//!
//! let snapshot = snapshot.unwrap();
//! assert_eq!(snapshot.run_state, RunState::Running);
//! assert_eq!(snapshot.fan_speed, 2100.0);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod builder;
pub mod crc;
pub mod decode;
pub mod fields;
pub mod frame;
pub mod framer;
pub mod validate;

// Re-export at crate root for convenience
pub use builder::FrameBuilder;
pub use crc::calculate_crc16;
pub use decode::{
    decode, decode_raw, Command, ControllerHalf, ControllerSettings, ErrorCode, HeaterHalf,
    RunState, TelemetrySnapshot, TextValue, TEXT_CAPACITY,
};
pub use fields::{BinaryField, NumericField, TextField};
pub use frame::{
    CandidateFrame, FrameError, Half, BAUDRATE, FRAME_LEN, HALF_LEN, HALF_TAG_OFFSET, START_MARKER,
};
pub use framer::{Framer, DEFAULT_FRAME_TIMEOUT_MS};
pub use validate::{validate, ValidatedFrame};
