//! UpdateScheduler: drains the byte source and publishes telemetry.

use heater_proto::{
    decode, validate, BinaryField, FrameError, Framer, NumericField, TelemetrySnapshot, TextField,
    TextValue, ValidatedFrame,
};

use crate::config::{ConfigError, HeaterConfig, PublishMode};
use crate::input::{ByteSource, ReadError};
use crate::sink::SinkBindings;

/// Cumulative pipeline counters since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    /// Frames that passed validation.
    pub frames_valid: u32,
    /// Frames rejected for a CRC mismatch.
    pub frames_corrupt: u32,
    /// Structural desyncs (misaligned markers, oversized declarations).
    pub desyncs: u32,
    /// Partial frames dropped after an inter-byte timeout.
    pub timeouts: u32,
    /// Read errors reported by the byte source.
    pub read_errors: u32,
    /// Sink pushes that failed.
    pub publish_failures: u32,
}

impl FrameStats {
    fn record(&mut self, err: FrameError) {
        let counter = match err {
            FrameError::Corrupt(_) => &mut self.frames_corrupt,
            FrameError::Timeout => &mut self.timeouts,
            FrameError::Overflow | FrameError::Misaligned(_) => &mut self.desyncs,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Result of draining the byte source once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// Bytes pulled from the source.
    pub bytes: usize,
    /// Frames that passed validation.
    pub frames: usize,
    /// Pending frames replaced by a newer one before being published.
    pub superseded: usize,
    /// Frames or partial frames discarded.
    pub rejected: usize,
}

/// Pushes made during one publishing tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PublishReport {
    /// Values handed to a sink successfully.
    pub pushed: u8,
    /// Bound fields skipped because their value did not change.
    pub unchanged: u8,
    /// Pushes the sink refused.
    pub failed: u8,
}

/// Outcome of a scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// No frame has ever been validated; nothing published.
    NoSnapshot,
    /// No new frame since the last tick; the previous snapshot stands.
    Stale,
    /// A fresh snapshot was decoded and bound fields were published.
    Published(PublishReport),
}

/// Values last handed to each sink, for [`PublishMode::OnChange`].
struct LastPushed {
    numeric: [Option<f32>; NumericField::COUNT],
    text: [Option<TextValue>; TextField::COUNT],
    binary: [Option<bool>; BinaryField::COUNT],
}

impl LastPushed {
    fn new() -> Self {
        Self {
            numeric: [None; NumericField::COUNT],
            text: core::array::from_fn(|_| None),
            binary: [None; BinaryField::COUNT],
        }
    }
}

/// Drives the byte source through framing, validation and decoding, and
/// publishes each fresh snapshot to the bound sinks.
///
/// The scheduler is the single owner of all pipeline state: one partial
/// frame inside the framer, at most one pending validated frame, and the
/// current snapshot. Nothing here blocks; the caller decides the cadence.
///
/// # Cadence
///
/// - [`poll`](Self::poll) drains whatever is buffered. Calling it often keeps
///   inter-byte timing meaningful; a newer frame replaces an older pending one.
/// - [`tick`](Self::tick) polls, then decodes the pending frame (if any),
///   replaces the snapshot and publishes. Call it every
///   [`HeaterConfig::update_interval_ms`].
///
/// # Error Handling
///
/// Nothing is fatal. Desyncs and corrupt frames are logged and counted in
/// [`FrameStats`]; when no good frame arrives the previous snapshot stays in
/// place and nothing is pushed.
pub struct UpdateScheduler<'a, R> {
    reader: R,
    sinks: SinkBindings<'a>,
    config: HeaterConfig,
    framer: Framer,
    pending: Option<ValidatedFrame>,
    snapshot: Option<TelemetrySnapshot>,
    last_pushed: LastPushed,
    stats: FrameStats,
}

impl<'a, R: ByteSource> UpdateScheduler<'a, R> {
    /// Create a scheduler from a byte source, a sink table and a configuration.
    pub fn new(
        reader: R,
        sinks: SinkBindings<'a>,
        config: HeaterConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(
            "heater scheduler: interval {} ms, {} sinks bound",
            config.update_interval_ms,
            sinks.bound_count()
        );
        Ok(Self::from_parts(reader, sinks, config))
    }

    /// Create a scheduler with [`HeaterConfig::DEFAULT`].
    pub fn with_defaults(reader: R, sinks: SinkBindings<'a>) -> Self {
        Self::from_parts(reader, sinks, HeaterConfig::DEFAULT)
    }

    fn from_parts(reader: R, sinks: SinkBindings<'a>, config: HeaterConfig) -> Self {
        Self {
            reader,
            sinks,
            framer: Framer::new(config.frame_timeout_ms),
            config,
            pending: None,
            snapshot: None,
            last_pushed: LastPushed::new(),
            stats: FrameStats::default(),
        }
    }

    /// Drain buffered bytes through the framer and validator.
    ///
    /// `now_ms` is a monotonic millisecond timestamp.
    pub fn poll(&mut self, now_ms: u64) -> PollReport {
        let mut report = PollReport::default();

        if self.framer.expire(now_ms) {
            self.stats.record(FrameError::Timeout);
            report.rejected += 1;
            warn!("partial frame dropped after inter-byte timeout");
        }

        while report.bytes < self.config.max_bytes_per_poll && self.reader.available() > 0 {
            let byte = match self.reader.read_byte() {
                Ok(byte) => byte,
                Err(ReadError::NoData) => break,
                Err(err) => {
                    self.stats.read_errors = self.stats.read_errors.saturating_add(1);
                    warn!("byte source error: {:?}", err);
                    break;
                }
            };
            report.bytes += 1;

            match self.framer.push_byte(byte, now_ms) {
                Ok(None) => {}
                Ok(Some(candidate)) => match validate(&candidate) {
                    Ok(frame) => {
                        self.stats.frames_valid = self.stats.frames_valid.saturating_add(1);
                        report.frames += 1;
                        if self.pending.replace(frame).is_some() {
                            report.superseded += 1;
                        }
                    }
                    Err(err) => {
                        self.stats.record(err);
                        report.rejected += 1;
                        warn!("frame rejected: {:?}", err);
                    }
                },
                Err(err) => {
                    self.stats.record(err);
                    report.rejected += 1;
                    debug!("framer resync: {:?}", err);
                }
            }
        }

        report
    }

    /// Poll, then decode and publish the newest frame if one arrived.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        self.poll(now_ms);

        let Some(frame) = self.pending.take() else {
            return if self.snapshot.is_some() {
                TickOutcome::Stale
            } else {
                TickOutcome::NoSnapshot
            };
        };

        let snapshot = decode(frame);
        self.snapshot = Some(snapshot);
        TickOutcome::Published(self.publish(&snapshot))
    }

    fn publish(&mut self, snapshot: &TelemetrySnapshot) -> PublishReport {
        let mut report = PublishReport::default();
        let mode = self.config.publish_mode;

        for field in NumericField::ALL {
            let Some(sink) = self.sinks.numeric_mut(field) else {
                continue;
            };
            let value = snapshot.numeric(field);
            let last = &mut self.last_pushed.numeric[field.index()];
            if !numeric_changed(mode, *last, value) {
                report.unchanged += 1;
                continue;
            }
            match sink.push_numeric(value) {
                Ok(()) => {
                    trace!("{} = {}", field.key(), value);
                    *last = Some(value);
                    report.pushed += 1;
                }
                Err(err) => {
                    warn!("push to {} failed: {:?}", field.key(), err);
                    report.failed += 1;
                }
            }
        }

        for field in TextField::ALL {
            let Some(sink) = self.sinks.text_mut(field) else {
                continue;
            };
            let value = snapshot.text(field);
            let last = &mut self.last_pushed.text[field.index()];
            if matches!(mode, PublishMode::OnChange { .. }) && last.as_ref() == Some(&value) {
                report.unchanged += 1;
                continue;
            }
            match sink.push_text(value.as_str()) {
                Ok(()) => {
                    trace!("{} = {}", field.key(), value.as_str());
                    *last = Some(value);
                    report.pushed += 1;
                }
                Err(err) => {
                    warn!("push to {} failed: {:?}", field.key(), err);
                    report.failed += 1;
                }
            }
        }

        for field in BinaryField::ALL {
            let Some(sink) = self.sinks.binary_mut(field) else {
                continue;
            };
            let value = snapshot.binary(field);
            let last = &mut self.last_pushed.binary[field.index()];
            if matches!(mode, PublishMode::OnChange { .. }) && *last == Some(value) {
                report.unchanged += 1;
                continue;
            }
            match sink.push_binary(value) {
                Ok(()) => {
                    trace!("{} = {}", field.key(), value);
                    *last = Some(value);
                    report.pushed += 1;
                }
                Err(err) => {
                    warn!("push to {} failed: {:?}", field.key(), err);
                    report.failed += 1;
                }
            }
        }

        self.stats.publish_failures = self
            .stats
            .publish_failures
            .saturating_add(u32::from(report.failed));
        report
    }

    /// Abandon the partial frame and any pending frame.
    ///
    /// The current snapshot is kept.
    pub fn reset(&mut self) {
        self.framer.reset();
        self.pending = None;
    }

    /// Latest decoded snapshot, if any frame was ever validated.
    pub fn snapshot(&self) -> Option<&TelemetrySnapshot> {
        self.snapshot.as_ref()
    }

    /// Whether a validated frame is waiting for the next tick.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Bytes dropped as noise outside any frame.
    pub fn discarded_bytes(&self) -> u32 {
        self.framer.discarded_bytes()
    }

    pub fn config(&self) -> &HeaterConfig {
        &self.config
    }

    /// Get a reference to the byte source.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the byte source.
    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Decompose the scheduler, returning the byte source.
    pub fn into_reader(self) -> R {
        self.reader
    }
}

fn numeric_changed(mode: PublishMode, last: Option<f32>, value: f32) -> bool {
    match (mode, last) {
        (PublishMode::EveryTick, _) | (_, None) => true,
        (PublishMode::OnChange { deadband }, Some(prev)) => {
            let delta = value - prev;
            let delta = if delta < 0.0 { -delta } else { delta };
            delta > deadband
        }
    }
}
