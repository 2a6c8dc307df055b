//! GPS source
//!
//! Channels enumerate quantities derived from the latest fix. `update`
//! polls the provider for a new fix; when none arrived since the previous
//! poll the last fix is reused, so readings go stale rather than invalid.

use super::{ChannelId, RawSample, SensorSource, SourceError};
use crate::unit_conversion::{meters_to_feet, mps_to_kph, mps_to_mph};

/// One position/velocity solution from the receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    /// Ground speed in meters per second.
    pub speed_mps: f64,
    /// True heading in degrees.
    pub heading_deg: f64,
    /// Altitude above sea level in meters.
    pub altitude_m: f64,
}

/// Supplies parsed fixes from the receiver hardware.
pub trait FixProvider: Send {
    /// The latest fix, or `None` when nothing new arrived since last poll.
    fn poll_fix(&mut self) -> Result<Option<GpsFix>, SourceError>;
}

/// Derived quantities exposed as channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpsChannel {
    /// Ground speed in miles per hour.
    SpeedMph = 0,
    /// Ground speed in kilometers per hour.
    SpeedKph = 1,
    /// True heading in degrees.
    HeadingDeg = 2,
    /// Altitude in feet.
    AltitudeFt = 3,
}

impl GpsChannel {
    /// Number of derived channels.
    pub const COUNT: usize = 4;

    /// Channel index used with [`SensorSource`] calls.
    pub fn channel(self) -> ChannelId {
        self as ChannelId
    }

    fn from_index(channel: ChannelId) -> Option<Self> {
        match channel {
            0 => Some(Self::SpeedMph),
            1 => Some(Self::SpeedKph),
            2 => Some(Self::HeadingDeg),
            3 => Some(Self::AltitudeFt),
            _ => None,
        }
    }
}

/// GPS-backed sensor source.
pub struct GpsSource {
    provider: Box<dyn FixProvider>,
    last_fix: Option<GpsFix>,
    samples: Vec<RawSample>,
}

impl GpsSource {
    /// Wrap a fix provider.
    pub fn new(provider: Box<dyn FixProvider>) -> Self {
        Self {
            provider,
            last_fix: None,
            samples: vec![RawSample::invalid(); GpsChannel::COUNT],
        }
    }
}

impl SensorSource for GpsSource {
    fn name(&self) -> &str {
        "gps"
    }

    fn update(&mut self, channel: ChannelId) -> Result<(), SourceError> {
        let derived = GpsChannel::from_index(channel).ok_or_else(|| {
            SourceError::AcquisitionFailed(format!("gps has no channel {channel}"))
        })?;

        match self.provider.poll_fix() {
            Ok(Some(fix)) => self.last_fix = Some(fix),
            // No new fix: derive from the retained one.
            Ok(None) => {}
            Err(error) => {
                // Report invalid until acquisition recovers.
                for sample in &mut self.samples {
                    sample.valid = false;
                }
                return Err(error);
            }
        }
        let fix = self.last_fix.ok_or(SourceError::NoData)?;

        let value = match derived {
            GpsChannel::SpeedMph => mps_to_mph(fix.speed_mps),
            GpsChannel::SpeedKph => mps_to_kph(fix.speed_mps),
            GpsChannel::HeadingDeg => fix.heading_deg,
            GpsChannel::AltitudeFt => meters_to_feet(fix.altitude_m),
        };
        self.samples[channel] = RawSample::scalar(value);
        Ok(())
    }

    fn read(&self, channel: ChannelId) -> RawSample {
        self.samples
            .get(channel)
            .cloned()
            .unwrap_or_else(RawSample::invalid)
    }
}
