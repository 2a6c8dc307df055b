//! Pulse-counter sources (tachometer and vehicle speed)
//!
//! `update` turns the delta of a cumulative edge count into a rate. The raw
//! sample is pulses per millisecond; the sensor's configured linear scale
//! turns that into rpm or mph. Rate computation divides by the measured
//! elapsed time between updates, so scheduling jitter biases the reading
//! directly; these sources belong on the fastest tier.

use tokio::time::Instant;

use super::{ChannelId, RawSample, SensorSource, SourceError};

/// The single rate channel every pulse source exposes.
pub const RATE_CHANNEL: ChannelId = 0;

/// Hardware access to a free-running edge counter.
pub trait PulseCounter: Send {
    /// Cumulative edges counted since the counter started. May wrap.
    fn read_count(&mut self) -> Result<u64, SourceError>;
}

/// Pulse-counting sensor source.
pub struct PulseSource {
    name: &'static str,
    counter: Box<dyn PulseCounter>,
    last_count: Option<u64>,
    last_update: Option<Instant>,
    sample: RawSample,
}

impl PulseSource {
    /// Tachometer role (ignition/crank pulses).
    pub fn tach(counter: Box<dyn PulseCounter>) -> Self {
        Self::new("tach", counter)
    }

    /// Vehicle-speed-sensor role (driveline pulses).
    pub fn vss(counter: Box<dyn PulseCounter>) -> Self {
        Self::new("vss", counter)
    }

    fn new(name: &'static str, counter: Box<dyn PulseCounter>) -> Self {
        Self {
            name,
            counter,
            last_count: None,
            last_update: None,
            sample: RawSample::invalid(),
        }
    }
}

impl SensorSource for PulseSource {
    fn name(&self) -> &str {
        self.name
    }

    fn update(&mut self, channel: ChannelId) -> Result<(), SourceError> {
        if channel != RATE_CHANNEL {
            return Err(SourceError::AcquisitionFailed(format!(
                "{} has no channel {channel}",
                self.name
            )));
        }

        let count = self.counter.read_count()?;
        let now = Instant::now();

        if let (Some(previous), Some(at)) = (self.last_count, self.last_update) {
            let elapsed_ms = now.duration_since(at).as_secs_f64() * 1000.0;
            if elapsed_ms > 0.0 {
                let pulses = count.wrapping_sub(previous) as f64;
                self.sample = RawSample::scalar(pulses / elapsed_ms);
            }
        }
        // First update only establishes the baseline; the sample stays
        // invalid until a second update gives a measurable interval.
        self.last_count = Some(count);
        self.last_update = Some(now);
        Ok(())
    }

    fn read(&self, channel: ChannelId) -> RawSample {
        if channel == RATE_CHANNEL {
            self.sample.clone()
        } else {
            RawSample::invalid()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct SharedCounter(Arc<AtomicU64>);

    impl PulseCounter for SharedCounter {
        fn read_count(&mut self) -> Result<u64, SourceError> {
            Ok(self.0.load(Ordering::Relaxed))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn computes_pulses_per_millisecond() {
        let count = Arc::new(AtomicU64::new(0));
        let mut source = PulseSource::tach(Box::new(SharedCounter(Arc::clone(&count))));

        // Baseline: sample still invalid.
        source.update(RATE_CHANNEL).unwrap();
        assert!(!source.read(RATE_CHANNEL).valid);

        count.store(15, Ordering::Relaxed);
        tokio::time::advance(Duration::from_millis(100)).await;
        source.update(RATE_CHANNEL).unwrap();

        let rate = source.read(RATE_CHANNEL).as_scalar().unwrap();
        assert!((rate - 0.15).abs() < 1e-12);
    }

    #[tokio::test(start_paused = true)]
    async fn linear_scale_turns_rate_into_display_units() {
        use crate::sensor::{Calibration, Sensor};
        use crate::source::SourceTable;

        let count = Arc::new(AtomicU64::new(0));
        let mut sources = SourceTable::new();
        let id = sources.insert(Box::new(PulseSource::vss(Box::new(SharedCounter(
            Arc::clone(&count),
        )))));

        sources.update(id, RATE_CHANNEL).unwrap();
        count.store(15, Ordering::Relaxed);
        tokio::time::advance(Duration::from_millis(100)).await;
        sources.update(id, RATE_CHANNEL).unwrap();

        // 15 pulses over 100 ms at a ×600 scale reads 90.
        let sensor = Sensor::calibrated(
            "speed",
            id,
            RATE_CHANNEL,
            Calibration::Linear {
                scale: 600.0,
                offset: 0.0,
            },
            "mph",
        );
        assert!((sensor.read(&sources).unwrap() - 90.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn counter_wrap_still_yields_positive_rate() {
        let count = Arc::new(AtomicU64::new(u64::MAX - 4));
        let mut source = PulseSource::vss(Box::new(SharedCounter(Arc::clone(&count))));

        source.update(RATE_CHANNEL).unwrap();
        count.store(5, Ordering::Relaxed); // 10 pulses across the wrap
        tokio::time::advance(Duration::from_millis(50)).await;
        source.update(RATE_CHANNEL).unwrap();

        let rate = source.read(RATE_CHANNEL).as_scalar().unwrap();
        assert!((rate - 0.2).abs() < 1e-12);
    }
}
