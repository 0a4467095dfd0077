//! Telemetry field identifiers.
//!
//! Each published value has a stable configuration key. Fields are split by
//! the kind of sink that can receive them.

/// Numeric telemetry fields, published as `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NumericField {
    /// Room temperature reported by the controller (°C).
    CurrentTemperature,
    /// Fan speed (RPM).
    FanSpeed,
    /// Supply voltage (V).
    SupplyVoltage,
    /// Heat-exchanger temperature (°C).
    HeatExchangerTemperature,
    /// Glow-plug voltage (V).
    GlowPlugVoltage,
    /// Glow-plug current (A).
    GlowPlugCurrent,
    /// Fuel pump frequency (Hz).
    PumpFrequency,
    /// Desired temperature set on the controller (°C).
    DesiredTemperature,
    /// Fan voltage (V).
    FanVoltage,
}

impl NumericField {
    /// Number of numeric fields.
    pub const COUNT: usize = 9;

    /// All numeric fields in publishing order.
    pub const ALL: [NumericField; Self::COUNT] = [
        NumericField::CurrentTemperature,
        NumericField::FanSpeed,
        NumericField::SupplyVoltage,
        NumericField::HeatExchangerTemperature,
        NumericField::GlowPlugVoltage,
        NumericField::GlowPlugCurrent,
        NumericField::PumpFrequency,
        NumericField::DesiredTemperature,
        NumericField::FanVoltage,
    ];

    /// Configuration key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            NumericField::CurrentTemperature => "current_temperature",
            NumericField::FanSpeed => "fan_speed",
            NumericField::SupplyVoltage => "supply_voltage",
            NumericField::HeatExchangerTemperature => "heat_exchanger_temp",
            NumericField::GlowPlugVoltage => "glow_plug_voltage",
            NumericField::GlowPlugCurrent => "glow_plug_current",
            NumericField::PumpFrequency => "pump_frequency",
            NumericField::DesiredTemperature => "desired_temperature",
            NumericField::FanVoltage => "fan_voltage",
        }
    }

    /// Unit of the published value.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            NumericField::CurrentTemperature
            | NumericField::HeatExchangerTemperature
            | NumericField::DesiredTemperature => "°C",
            NumericField::FanSpeed => "RPM",
            NumericField::SupplyVoltage
            | NumericField::GlowPlugVoltage
            | NumericField::FanVoltage => "V",
            NumericField::GlowPlugCurrent => "A",
            NumericField::PumpFrequency => "Hz",
        }
    }

    /// Look a field up by its configuration key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Position in [`NumericField::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Text telemetry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextField {
    /// Human-readable run state.
    RunState,
    /// Human-readable error code.
    ErrorCode,
}

impl TextField {
    pub const COUNT: usize = 2;

    pub const ALL: [TextField; Self::COUNT] = [TextField::RunState, TextField::ErrorCode];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            TextField::RunState => "run_state",
            TextField::ErrorCode => "error_code",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Binary telemetry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BinaryField {
    /// Heater on/off flag.
    OnOffState,
}

impl BinaryField {
    pub const COUNT: usize = 1;

    pub const ALL: [BinaryField; Self::COUNT] = [BinaryField::OnOffState];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            BinaryField::OnOffState => "on_off_state",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, field) in NumericField::ALL.into_iter().enumerate() {
            assert_eq!(field.index(), i);
        }
        for (i, field) in TextField::ALL.into_iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn test_from_key() {
        assert_eq!(
            NumericField::from_key("heat_exchanger_temp"),
            Some(NumericField::HeatExchangerTemperature)
        );
        assert_eq!(TextField::from_key("error_code"), Some(TextField::ErrorCode));
        assert_eq!(BinaryField::from_key("on_off_state"), Some(BinaryField::OnOffState));
        assert_eq!(NumericField::from_key("altitude"), None);
    }
}
