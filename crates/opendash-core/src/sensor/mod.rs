//! Sensors
//!
//! A [`Sensor`] binds one source channel to the math that turns its raw
//! sample into an engineering-unit value: a [`Calibration`] for analog and
//! pulse channels, a [`FrameFieldSpec`] for CAN-backed channels. `read`
//! never triggers acquisition; the scheduler must have refreshed the source
//! beforehand.

mod calibration;

pub use calibration::{Calibration, InterpTable, VoltageDivider};

use thiserror::Error;

use crate::frame::{decode, DecodeError, FrameFieldSpec};
use crate::source::{ChannelId, SourceError, SourceId, SourceTable};

/// Errors produced by [`Sensor::read`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadError {
    /// Frame field decoding failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The underlying source has no usable sample.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The source delivered the wrong kind of sample for this sensor.
    #[error("sample is not a {expected} sample")]
    WrongSampleKind {
        /// Kind of sample this sensor expects.
        expected: &'static str,
    },
}

/// How a sensor turns its raw sample into an engineering value.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorDecode {
    /// Pure calibration applied to a scalar sample.
    Calibrated(Calibration),
    /// Frame field extraction applied to a payload sample.
    FrameField(FrameFieldSpec),
}

/// One logical sensor: a source channel plus its decoding.
#[derive(Debug, Clone)]
pub struct Sensor {
    /// Human-readable name for log lines ("coolant temp", "oil pressure").
    pub label: String,
    /// Source this sensor reads from.
    pub source: SourceId,
    /// Channel within that source.
    pub channel: ChannelId,
    /// Raw-to-engineering conversion.
    pub decode: SensorDecode,
    /// Engineering unit of the produced value.
    pub unit: String,
}

impl Sensor {
    /// A calibrated sensor over an analog, GPS or pulse channel.
    pub fn calibrated(
        label: impl Into<String>,
        source: SourceId,
        channel: ChannelId,
        calibration: Calibration,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            source,
            channel,
            decode: SensorDecode::Calibrated(calibration),
            unit: unit.into(),
        }
    }

    /// A CAN-backed sensor; the channel is the spec's frame id.
    pub fn can_field(label: impl Into<String>, source: SourceId, spec: FrameFieldSpec) -> Self {
        Self {
            label: label.into(),
            source,
            channel: spec.frame_id as ChannelId,
            unit: spec.unit.clone(),
            decode: SensorDecode::FrameField(spec),
        }
    }

    /// Produce one engineering-unit reading from the last refreshed sample.
    pub fn read(&self, sources: &SourceTable) -> Result<f64, ReadError> {
        let sample = sources.read(self.source, self.channel);
        if !sample.valid {
            return Err(SourceError::NoData.into());
        }
        match &self.decode {
            SensorDecode::Calibrated(calibration) => {
                let raw = sample
                    .as_scalar()
                    .ok_or(ReadError::WrongSampleKind { expected: "scalar" })?;
                Ok(calibration.apply(raw))
            }
            SensorDecode::FrameField(spec) => {
                let payload = sample
                    .as_frame()
                    .ok_or(ReadError::WrongSampleKind { expected: "frame" })?;
                Ok(decode(spec, payload)?)
            }
        }
    }
}

/// Handle into a [`SensorTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorId(pub(crate) usize);

impl SensorId {
    /// Position of the sensor in its table.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Owned table of sensors, referenced by [`SensorId`].
#[derive(Debug, Default)]
pub struct SensorTable {
    sensors: Vec<Sensor>,
}

impl SensorTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sensor, returning its handle.
    pub fn insert(&mut self, sensor: Sensor) -> SensorId {
        self.sensors.push(sensor);
        SensorId(self.sensors.len() - 1)
    }

    /// Borrow a sensor.
    pub fn get(&self, id: SensorId) -> Option<&Sensor> {
        self.sensors.get(id.0)
    }

    /// Read one sensor through the source table.
    pub fn read(&self, id: SensorId, sources: &SourceTable) -> Result<f64, ReadError> {
        match self.get(id) {
            Some(sensor) => sensor.read(sources),
            None => Err(SourceError::AcquisitionFailed(format!(
                "no sensor at index {}",
                id.0
            ))
            .into()),
        }
    }

    /// Number of registered sensors.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}
