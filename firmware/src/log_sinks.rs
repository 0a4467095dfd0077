//! Sinks available on the bare board: RTT log lines and the on-board LED.

use defmt::info;
use embassy_rp::gpio::{Level, Output};
use heater_core::proto::{NumericField, TextField};
use heater_core::{BinarySink, NumericSink, SinkError, TextSink};

/// Writes each pushed value as a defmt log line.
pub struct DefmtSink {
    key: &'static str,
    unit: &'static str,
}

impl DefmtSink {
    /// Sink labelled with a numeric field's key and unit.
    #[must_use]
    pub const fn numeric(field: NumericField) -> Self {
        Self {
            key: field.key(),
            unit: field.unit(),
        }
    }

    /// Sink labelled with a text field's key.
    #[must_use]
    pub const fn text(field: TextField) -> Self {
        Self {
            key: field.key(),
            unit: "",
        }
    }
}

impl NumericSink for DefmtSink {
    fn push_numeric(&mut self, value: f32) -> Result<(), SinkError> {
        info!("{}: {} {}", self.key, value, self.unit);
        Ok(())
    }
}

impl TextSink for DefmtSink {
    fn push_text(&mut self, value: &str) -> Result<(), SinkError> {
        info!("{}: {}", self.key, value);
        Ok(())
    }
}

/// Mirrors an on/off value on a GPIO (the Pico's LED on GPIO 25).
pub struct LedSink<'d> {
    led: Output<'d>,
}

impl<'d> LedSink<'d> {
    pub fn new(led: Output<'d>) -> Self {
        Self { led }
    }
}

impl BinarySink for LedSink<'_> {
    fn push_binary(&mut self, value: bool) -> Result<(), SinkError> {
        self.led.set_level(if value { Level::High } else { Level::Low });
        info!("on_off_state: {}", value);
        Ok(())
    }
}
