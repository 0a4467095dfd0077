//! Platform-agnostic heater telemetry pipeline.
//!
//! This crate connects a serial byte source to telemetry consumers without
//! any platform-specific dependencies. It can be used both in embedded
//! `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! The crate is organized into several modules:
//!
//! - [`input`]: Byte source trait ([`ByteSource`]) and adapters ([`ByteQueue`])
//! - [`sink`]: Sink traits ([`NumericSink`], [`TextSink`], [`BinarySink`]) and
//!   the field binding table ([`SinkBindings`])
//! - [`config`]: Pipeline configuration ([`HeaterConfig`])
//! - [`scheduler`]: Orchestrates bytes-to-sinks flow ([`UpdateScheduler`])
//!
//! Framing, validation and decoding live in [`heater_proto`], re-exported
//! here as [`proto`].
//!
//! # Example
//!
//! ```rust
//! use heater_core::proto::{FrameBuilder, NumericField};
//! use heater_core::{
//!     ByteQueue, NumericSink, SinkBindings, SinkError, TickOutcome, UpdateScheduler,
//! };
//!
//! struct Display(f32);
//!
//! impl NumericSink for Display {
//!     fn push_numeric(&mut self, value: f32) -> Result<(), SinkError> {
//!         self.0 = value;
//!         Ok(())
//!     }
//! }
//!
//! let mut fan = Display(0.0);
//! let sinks = SinkBindings::builder()
//!     .numeric(NumericField::FanSpeed, &mut fan)
//!     .build();
//!
//! let mut queue: ByteQueue<256> = ByteQueue::new();
//! queue.extend(&FrameBuilder::new().fan_speed(1900).build());
//!
//! let mut scheduler = UpdateScheduler::with_defaults(queue, sinks);
//! assert!(matches!(scheduler.tick(0), TickOutcome::Published(_)));
//! drop(scheduler);
//! assert_eq!(fan.0, 1900.0);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through defmt and derive `defmt::Format` (embedded)
//! - **`log`**: Log through the `log` facade (host tools)
//! - **`embedded-io`**: [`ReadyReader`] adapter for `embedded-io` peripherals
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod input;
pub mod scheduler;
pub mod sink;

pub use heater_proto as proto;

// Re-export main types at crate root
pub use config::{
    ConfigError, HeaterConfig, PublishMode, DEFAULT_MAX_BYTES_PER_POLL, DEFAULT_UPDATE_INTERVAL_MS,
};
#[cfg(feature = "embedded-io")]
pub use input::ReadyReader;
pub use input::{ByteQueue, ByteSource, ReadError};
pub use scheduler::{FrameStats, PollReport, PublishReport, TickOutcome, UpdateScheduler};
pub use sink::{
    BinarySink, NumericSink, SinkBindings, SinkBindingsBuilder, SinkError, SinkRef, TextSink,
};
