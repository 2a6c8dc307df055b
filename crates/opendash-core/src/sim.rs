//! Simulated hardware backends
//!
//! Generate plausible engine data without any physical sensors, for the
//! demo example and hardware-free testing. Values idle around realistic
//! baselines with a slow drift and a little noise.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;

use crate::source::{AdcReader, ChannelId, FixProvider, GpsFix, PulseCounter, SourceError};

/// Simulated ADC with fixed per-channel baselines.
///
/// Channel layout matches the default [`crate::config::DashConfig`]:
/// 0 = MAP, 1 = coolant NTC, 2 = ambient NTC, 3 = oil NTC,
/// 4 = oil pressure sender, 5 = fuel sender, 6 = voltmeter divider.
pub struct SimAdc {
    rng: StdRng,
    started: Instant,
}

const SIM_ADC_BASELINES: [f64; 7] = [1.62, 2.30, 2.05, 2.35, 1.15, 2.00, 2.40];

impl SimAdc {
    /// Create a simulator seeded from entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            started: Instant::now(),
        }
    }
}

impl Default for SimAdc {
    fn default() -> Self {
        Self::new()
    }
}

impl AdcReader for SimAdc {
    fn channel_count(&self) -> usize {
        SIM_ADC_BASELINES.len()
    }

    fn read_voltage(&mut self, channel: ChannelId) -> Result<f64, SourceError> {
        let baseline = SIM_ADC_BASELINES.get(channel).copied().ok_or_else(|| {
            SourceError::AcquisitionFailed(format!("sim adc has no channel {channel}"))
        })?;
        let t = self.started.elapsed().as_secs_f64();
        let drift = 0.08 * (t * 0.05 + channel as f64).sin();
        let noise = self.rng.gen_range(-0.01..0.01);
        Ok((baseline + drift + noise).clamp(0.0, 5.0))
    }
}

/// Simulated free-running pulse counter accumulating at a fixed rate.
pub struct SimPulseCounter {
    rate_hz: f64,
    started: Instant,
}

impl SimPulseCounter {
    /// Accumulate `rate_hz` pulses per second.
    ///
    /// For the default calibrations, ~28 Hz VSS is about 45 mph and
    /// ~30 Hz tach is about 900 rpm.
    pub fn new(rate_hz: f64) -> Self {
        Self {
            rate_hz,
            started: Instant::now(),
        }
    }
}

impl PulseCounter for SimPulseCounter {
    fn read_count(&mut self) -> Result<u64, SourceError> {
        let elapsed = self.started.elapsed().as_secs_f64();
        // Slow swell so gauges visibly move; keeps the count monotonic.
        let phase = elapsed + 2.0 * (elapsed * 0.1).sin();
        Ok((phase * self.rate_hz) as u64)
    }
}

/// Simulated GPS producing a wandering fix on every poll.
pub struct SimGps {
    rng: StdRng,
    started: Instant,
}

impl SimGps {
    /// Create a simulator seeded from entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            started: Instant::now(),
        }
    }
}

impl Default for SimGps {
    fn default() -> Self {
        Self::new()
    }
}

impl FixProvider for SimGps {
    fn poll_fix(&mut self) -> Result<Option<GpsFix>, SourceError> {
        let t = self.started.elapsed().as_secs_f64();
        Ok(Some(GpsFix {
            speed_mps: (20.0 + 4.0 * (t * 0.07).sin() + self.rng.gen_range(-0.2..0.2)).max(0.0),
            heading_deg: (90.0 + 15.0 * (t * 0.02).sin()).rem_euclid(360.0),
            altitude_m: 210.0 + 2.0 * (t * 0.01).sin(),
        }))
    }
}
