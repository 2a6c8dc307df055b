//! Analog input source
//!
//! One channel per physical analog input. Each `update` performs a single
//! conversion through the injected [`AdcReader`]; the raw sample is the
//! measured voltage.

use super::{ChannelId, RawSample, SensorSource, SourceError};

/// Hardware access for an analog-to-digital converter.
///
/// Implementations that can stall (device files, I2C) must apply their own
/// bounded timeout and return [`SourceError::Timeout`] instead of blocking
/// the sample timeline.
pub trait AdcReader: Send {
    /// Number of usable input channels.
    fn channel_count(&self) -> usize;

    /// Perform one conversion and return the measured voltage.
    fn read_voltage(&mut self, channel: ChannelId) -> Result<f64, SourceError>;
}

/// ADC-backed sensor source.
pub struct AdcSource {
    reader: Box<dyn AdcReader>,
    samples: Vec<RawSample>,
}

impl AdcSource {
    /// Wrap a hardware reader, one sample slot per channel.
    pub fn new(reader: Box<dyn AdcReader>) -> Self {
        let samples = vec![RawSample::invalid(); reader.channel_count()];
        Self { reader, samples }
    }
}

impl SensorSource for AdcSource {
    fn name(&self) -> &str {
        "adc"
    }

    fn update(&mut self, channel: ChannelId) -> Result<(), SourceError> {
        if channel >= self.samples.len() {
            return Err(SourceError::AcquisitionFailed(format!(
                "adc has no channel {channel}"
            )));
        }
        match self.reader.read_voltage(channel) {
            Ok(voltage) => {
                self.samples[channel] = RawSample::scalar(voltage);
                Ok(())
            }
            Err(error) => {
                // Report invalid until acquisition recovers.
                self.samples[channel].valid = false;
                Err(error)
            }
        }
    }

    fn read(&self, channel: ChannelId) -> RawSample {
        self.samples
            .get(channel)
            .cloned()
            .unwrap_or_else(RawSample::invalid)
    }
}
