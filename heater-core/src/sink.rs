//! Sink traits and the field-to-sink binding table.

use heater_proto::{BinaryField, NumericField, TextField};

use crate::config::ConfigError;

/// Error type for sink pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Downstream not ready (e.g., link not up yet).
    NotReady,
    /// Value refused by the downstream consumer.
    Rejected,
}

impl core::fmt::Display for SinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SinkError::NotReady => f.write_str("sink not ready"),
            SinkError::Rejected => f.write_str("value rejected by sink"),
        }
    }
}

/// Receiver for numeric values.
pub trait NumericSink {
    fn push_numeric(&mut self, value: f32) -> Result<(), SinkError>;
}

/// Receiver for text values.
pub trait TextSink {
    fn push_text(&mut self, value: &str) -> Result<(), SinkError>;
}

/// Receiver for on/off values.
pub trait BinarySink {
    fn push_binary(&mut self, value: bool) -> Result<(), SinkError>;
}

/// A sink of any kind, for binding by configuration key.
pub enum SinkRef<'a> {
    Numeric(&'a mut dyn NumericSink),
    Text(&'a mut dyn TextSink),
    Binary(&'a mut dyn BinarySink),
}

/// Fixed table mapping each telemetry field to at most one sink.
///
/// Built once through [`SinkBindingsBuilder`] and then moved into the
/// [`UpdateScheduler`](crate::UpdateScheduler), which offers no way to change
/// it afterwards. Unbound fields are still decoded but never pushed.
pub struct SinkBindings<'a> {
    numeric: [Option<&'a mut dyn NumericSink>; NumericField::COUNT],
    text: [Option<&'a mut dyn TextSink>; TextField::COUNT],
    binary: [Option<&'a mut dyn BinarySink>; BinaryField::COUNT],
}

impl<'a> SinkBindings<'a> {
    /// Table with nothing bound.
    #[must_use]
    pub fn none() -> Self {
        Self {
            numeric: core::array::from_fn(|_| None),
            text: core::array::from_fn(|_| None),
            binary: core::array::from_fn(|_| None),
        }
    }

    /// Start building a table.
    #[must_use]
    pub fn builder() -> SinkBindingsBuilder<'a> {
        SinkBindingsBuilder {
            bindings: Self::none(),
        }
    }

    #[must_use]
    pub fn is_numeric_bound(&self, field: NumericField) -> bool {
        self.numeric[field.index()].is_some()
    }

    #[must_use]
    pub fn is_text_bound(&self, field: TextField) -> bool {
        self.text[field.index()].is_some()
    }

    #[must_use]
    pub fn is_binary_bound(&self, field: BinaryField) -> bool {
        self.binary[field.index()].is_some()
    }

    /// Number of fields with a sink attached.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.numeric.iter().filter(|s| s.is_some()).count()
            + self.text.iter().filter(|s| s.is_some()).count()
            + self.binary.iter().filter(|s| s.is_some()).count()
    }

    pub(crate) fn numeric_mut(
        &mut self,
        field: NumericField,
    ) -> Option<&mut (dyn NumericSink + 'a)> {
        self.numeric[field.index()].as_deref_mut()
    }

    pub(crate) fn text_mut(&mut self, field: TextField) -> Option<&mut (dyn TextSink + 'a)> {
        self.text[field.index()].as_deref_mut()
    }

    pub(crate) fn binary_mut(&mut self, field: BinaryField) -> Option<&mut (dyn BinarySink + 'a)> {
        self.binary[field.index()].as_deref_mut()
    }
}

impl Default for SinkBindings<'_> {
    fn default() -> Self {
        Self::none()
    }
}

/// Builder for [`SinkBindings`].
///
/// Binding a field twice keeps the last sink.
pub struct SinkBindingsBuilder<'a> {
    bindings: SinkBindings<'a>,
}

impl<'a> SinkBindingsBuilder<'a> {
    /// Attach a numeric sink.
    #[must_use]
    pub fn numeric(mut self, field: NumericField, sink: &'a mut dyn NumericSink) -> Self {
        self.bindings.numeric[field.index()] = Some(sink);
        self
    }

    /// Attach a text sink.
    #[must_use]
    pub fn text(mut self, field: TextField, sink: &'a mut dyn TextSink) -> Self {
        self.bindings.text[field.index()] = Some(sink);
        self
    }

    /// Attach a binary sink.
    #[must_use]
    pub fn binary(mut self, field: BinaryField, sink: &'a mut dyn BinarySink) -> Self {
        self.bindings.binary[field.index()] = Some(sink);
        self
    }

    /// Attach a sink by configuration key (e.g. `"supply_voltage"`).
    ///
    /// Fails if the key is unknown or names a field of another kind.
    pub fn bind(self, key: &str, sink: SinkRef<'a>) -> Result<Self, ConfigError> {
        match sink {
            SinkRef::Numeric(sink) => match NumericField::from_key(key) {
                Some(field) => Ok(self.numeric(field, sink)),
                None => Err(key_error(key)),
            },
            SinkRef::Text(sink) => match TextField::from_key(key) {
                Some(field) => Ok(self.text(field, sink)),
                None => Err(key_error(key)),
            },
            SinkRef::Binary(sink) => match BinaryField::from_key(key) {
                Some(field) => Ok(self.binary(field, sink)),
                None => Err(key_error(key)),
            },
        }
    }

    /// Finish the table.
    #[must_use]
    pub fn build(self) -> SinkBindings<'a> {
        self.bindings
    }
}

fn key_error(key: &str) -> ConfigError {
    let known = NumericField::from_key(key).is_some()
        || TextField::from_key(key).is_some()
        || BinaryField::from_key(key).is_some();
    if known {
        ConfigError::KindMismatch
    } else {
        ConfigError::UnknownField
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Null;

    impl NumericSink for Null {
        fn push_numeric(&mut self, _value: f32) -> Result<(), SinkError> {
            Ok(())
        }
    }

    impl TextSink for Null {
        fn push_text(&mut self, _value: &str) -> Result<(), SinkError> {
            Ok(())
        }
    }

    impl BinarySink for Null {
        fn push_binary(&mut self, _value: bool) -> Result<(), SinkError> {
            Ok(())
        }
    }

    #[test]
    fn test_builder_binds_fields() {
        let mut a = Null;
        let mut b = Null;
        let mut c = Null;
        let bindings = SinkBindings::builder()
            .numeric(NumericField::FanSpeed, &mut a)
            .text(TextField::RunState, &mut b)
            .binary(BinaryField::OnOffState, &mut c)
            .build();

        assert!(bindings.is_numeric_bound(NumericField::FanSpeed));
        assert!(!bindings.is_numeric_bound(NumericField::SupplyVoltage));
        assert!(bindings.is_text_bound(TextField::RunState));
        assert!(!bindings.is_text_bound(TextField::ErrorCode));
        assert!(bindings.is_binary_bound(BinaryField::OnOffState));
        assert_eq!(bindings.bound_count(), 3);
    }

    #[test]
    fn test_bind_by_key() {
        let mut a = Null;
        let mut b = Null;
        let bindings = SinkBindings::builder()
            .bind("glow_plug_current", SinkRef::Numeric(&mut a))
            .and_then(|builder| builder.bind("error_code", SinkRef::Text(&mut b)))
            .map(SinkBindingsBuilder::build);

        let bindings = bindings.ok().unwrap();
        assert!(bindings.is_numeric_bound(NumericField::GlowPlugCurrent));
        assert!(bindings.is_text_bound(TextField::ErrorCode));
    }

    #[test]
    fn test_bind_rejects_bad_keys() {
        let mut a = Null;
        let result = SinkBindings::builder().bind("altitude", SinkRef::Numeric(&mut a));
        assert!(matches!(result, Err(ConfigError::UnknownField)));

        let mut b = Null;
        let result = SinkBindings::builder().bind("run_state", SinkRef::Binary(&mut b));
        assert!(matches!(result, Err(ConfigError::KindMismatch)));
    }

    #[test]
    fn test_none_is_empty() {
        assert_eq!(SinkBindings::none().bound_count(), 0);
    }
}
