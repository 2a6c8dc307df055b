//! Sensor acquisition backends
//!
//! Every backend implements [`SensorSource`]: `update(channel)` refreshes the
//! [`RawSample`] for a channel, `read(channel)` returns the last refreshed
//! sample without blocking or touching hardware. The split lets a gauge read
//! a consistent snapshot without re-triggering acquisition per gauge.

mod adc;
mod can;
mod gps;
mod pulse;

pub use adc::{AdcReader, AdcSource};
pub use can::{CanFrame, CanFrameSource, CanFrameTx};
pub use gps::{FixProvider, GpsChannel, GpsFix, GpsSource};
pub use pulse::{PulseCounter, PulseSource, RATE_CHANNEL};

use std::time::Instant;

use thiserror::Error;

/// Index of one named channel within a source.
pub type ChannelId = usize;

/// Errors surfaced by acquisition backends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The backend failed to acquire a reading.
    #[error("acquisition failed: {0}")]
    AcquisitionFailed(String),
    /// The backend hit its own bounded timeout.
    #[error("acquisition timed out")]
    Timeout,
    /// Nothing has been acquired for this channel yet.
    #[error("no data acquired yet")]
    NoData,
}

/// Payload of a raw sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    /// A single numeric reading (voltage, pulse rate, derived GPS quantity).
    Scalar(f64),
    /// A raw frame payload, decoded later by a [`crate::frame::FrameFieldSpec`].
    Frame(Vec<u8>),
}

/// Most recent raw reading for one (source, channel) pair.
///
/// Owned exclusively by its source and overwritten on each `update`;
/// consumers only ever see clones.
#[derive(Debug, Clone)]
pub struct RawSample {
    /// The reading itself.
    pub value: SampleValue,
    /// False until the first successful acquisition, or after a failure.
    pub valid: bool,
    /// When the reading was taken, if it ever was.
    pub taken_at: Option<Instant>,
}

impl RawSample {
    /// A sample that has never been refreshed.
    pub fn invalid() -> Self {
        Self {
            value: SampleValue::Scalar(f64::NAN),
            valid: false,
            taken_at: None,
        }
    }

    /// A fresh scalar reading taken now.
    pub fn scalar(value: f64) -> Self {
        Self {
            value: SampleValue::Scalar(value),
            valid: true,
            taken_at: Some(Instant::now()),
        }
    }

    /// A fresh frame payload received now.
    pub fn frame(payload: Vec<u8>) -> Self {
        Self {
            value: SampleValue::Frame(payload),
            valid: true,
            taken_at: Some(Instant::now()),
        }
    }

    /// The scalar reading, if this is a valid scalar sample.
    pub fn as_scalar(&self) -> Option<f64> {
        match self.value {
            SampleValue::Scalar(v) if self.valid => Some(v),
            _ => None,
        }
    }

    /// The frame payload, if this is a valid frame sample.
    pub fn as_frame(&self) -> Option<&[u8]> {
        match &self.value {
            SampleValue::Frame(payload) if self.valid => Some(payload),
            _ => None,
        }
    }
}

impl Default for RawSample {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Common contract for acquisition backends.
pub trait SensorSource: Send {
    /// Short name for log lines.
    fn name(&self) -> &str;

    /// Refresh the raw sample for `channel`, performing one acquisition.
    fn update(&mut self, channel: ChannelId) -> Result<(), SourceError>;

    /// Return the last refreshed sample for `channel`.
    ///
    /// Never blocks and never triggers a new acquisition.
    fn read(&self, channel: ChannelId) -> RawSample;
}

/// Handle into a [`SourceTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub(crate) usize);

impl SourceId {
    /// Position of the source in its table.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Owned table of acquisition backends.
///
/// Sensors and the scheduler refer to sources by [`SourceId`] instead of
/// holding references, so the table is the single owner.
#[derive(Default)]
pub struct SourceTable {
    sources: Vec<Box<dyn SensorSource>>,
}

impl SourceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source, returning its handle.
    pub fn insert(&mut self, source: Box<dyn SensorSource>) -> SourceId {
        self.sources.push(source);
        SourceId(self.sources.len() - 1)
    }

    /// Borrow a source.
    pub fn get(&self, id: SourceId) -> Option<&dyn SensorSource> {
        self.sources.get(id.0).map(|s| s.as_ref())
    }

    /// Refresh one channel of one source.
    pub fn update(&mut self, id: SourceId, channel: ChannelId) -> Result<(), SourceError> {
        match self.sources.get_mut(id.0) {
            Some(source) => source.update(channel),
            None => Err(SourceError::AcquisitionFailed(format!(
                "no source at index {}",
                id.0
            ))),
        }
    }

    /// Read the last sample of one channel of one source.
    pub fn read(&self, id: SourceId, channel: ChannelId) -> RawSample {
        match self.get(id) {
            Some(source) => source.read(channel),
            None => RawSample::invalid(),
        }
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
