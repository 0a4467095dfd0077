//! Blue-wire diesel heater telemetry monitor for RP2040.
//!
//! This crate provides the embedded side of the heater telemetry pipeline:
//! it listens to the controller/heater exchange on the blue wire and
//! publishes decoded values to sinks.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Receives bus traffic over UART (25000 baud, 8N1, receive only)
//! 2. Frames, validates and decodes the 48-byte exchanges
//! 3. Publishes the latest snapshot every update interval
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | UART1 TX | 8    | Unused |
//! | UART1 RX | 9    | Blue wire (through a level shifter) |
//! | LED      | 25   | Heater on/off state |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with two concurrent tasks:
//!
//! - **UART Task**: Receives bytes and appends them to a shared queue
//! - **Telemetry Task**: Drains the queue through the
//!   [`UpdateScheduler`](heater_core::UpdateScheduler) on a fixed ticker
//!
//! The queue is a [`ByteQueue`](heater_core::ByteQueue) behind a
//! critical-section mutex, so the scheduler itself never awaits.
//!
//! # Modules
//!
//! - [`uart_input`]: UART receiver and queue-backed byte source ([`QueueSource`])
//! - [`log_sinks`]: RTT log and LED sinks ([`DefmtSink`], [`LedSink`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`publish-on-change`**: Push only values that changed since the last push

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features");

pub use heater_core::{
    ByteQueue, ByteSource, FrameStats, HeaterConfig, PublishMode, SinkBindings, TickOutcome,
    UpdateScheduler,
};

pub mod log_sinks;
pub mod uart_input;

pub use log_sinks::{DefmtSink, LedSink};
pub use uart_input::{new_rx_queue, QueueSource, RxQueue, UartReceiver, RX_QUEUE_LEN};
