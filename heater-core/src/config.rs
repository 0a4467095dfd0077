//! Static configuration for the telemetry pipeline.
//!
//! Resolved once at startup; nothing here changes while the scheduler runs.

use heater_proto::DEFAULT_FRAME_TIMEOUT_MS;

/// Default polling/publishing interval (5 s).
pub const DEFAULT_UPDATE_INTERVAL_MS: u32 = 5_000;

/// Default cap on bytes drained in a single poll.
pub const DEFAULT_MAX_BYTES_PER_POLL: usize = 512;

/// When bound fields are pushed on a publishing tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishMode {
    /// Push every bound field whenever a fresh snapshot exists.
    EveryTick,
    /// Push a field only when it differs from the value last pushed to it.
    ///
    /// Numeric fields must move by more than `deadband` (in the field's unit).
    OnChange { deadband: f32 },
}

/// Configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Update interval is zero.
    ZeroInterval,
    /// Frame timeout is zero.
    ZeroTimeout,
    /// Frame timeout is not shorter than the update interval.
    TimeoutTooLong,
    /// Byte budget per poll is zero.
    ZeroByteBudget,
    /// Deadband is negative or NaN.
    InvalidDeadband,
    /// Sink bound to a key that names no field.
    UnknownField,
    /// Sink kind does not match the field's kind.
    KindMismatch,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ConfigError::ZeroInterval => "update interval must be non-zero",
            ConfigError::ZeroTimeout => "frame timeout must be non-zero",
            ConfigError::TimeoutTooLong => "frame timeout must be shorter than the update interval",
            ConfigError::ZeroByteBudget => "byte budget per poll must be non-zero",
            ConfigError::InvalidDeadband => "deadband must be a non-negative number",
            ConfigError::UnknownField => "unknown telemetry field",
            ConfigError::KindMismatch => "sink kind does not match field",
        };
        f.write_str(msg)
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaterConfig {
    /// Interval between publishing ticks (ms).
    pub update_interval_ms: u32,
    /// Inter-byte gap after which a partial frame is dropped (ms).
    pub frame_timeout_ms: u32,
    /// Maximum bytes pulled from the source in one poll.
    pub max_bytes_per_poll: usize,
    pub publish_mode: PublishMode,
}

impl HeaterConfig {
    pub const DEFAULT: Self = Self {
        update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
        frame_timeout_ms: DEFAULT_FRAME_TIMEOUT_MS,
        max_bytes_per_poll: DEFAULT_MAX_BYTES_PER_POLL,
        publish_mode: PublishMode::EveryTick,
    };

    #[must_use]
    pub const fn with_update_interval_ms(mut self, ms: u32) -> Self {
        self.update_interval_ms = ms;
        self
    }

    #[must_use]
    pub const fn with_frame_timeout_ms(mut self, ms: u32) -> Self {
        self.frame_timeout_ms = ms;
        self
    }

    #[must_use]
    pub const fn with_max_bytes_per_poll(mut self, bytes: usize) -> Self {
        self.max_bytes_per_poll = bytes;
        self
    }

    #[must_use]
    pub const fn with_publish_mode(mut self, mode: PublishMode) -> Self {
        self.publish_mode = mode;
        self
    }

    /// Check the configuration for values the scheduler cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.frame_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.frame_timeout_ms >= self.update_interval_ms {
            return Err(ConfigError::TimeoutTooLong);
        }
        if self.max_bytes_per_poll == 0 {
            return Err(ConfigError::ZeroByteBudget);
        }
        if let PublishMode::OnChange { deadband } = self.publish_mode {
            if deadband.is_nan() || deadband < 0.0 {
                return Err(ConfigError::InvalidDeadband);
            }
        }
        Ok(())
    }
}

impl Default for HeaterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
