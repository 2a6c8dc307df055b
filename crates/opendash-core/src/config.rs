//! Dash configuration
//!
//! The configuration collaborator hands the core already-parsed structured
//! data; these are the structures it fills in. Everything here is validated
//! at assembly time, and a validation failure is a fatal startup error, not
//! a runtime condition.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::FrameFieldSpec;
use crate::gauge::GaugeId;
use crate::scheduler::{TierIntervals, TimerTier};
use crate::sensor::Calibration;

/// Static misconfiguration detected at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A CAN field spec names a width the decoder cannot read.
    #[error("unsupported CAN field width {0} (expected 1, 2, 4, or 8 bytes)")]
    InvalidFieldWidth(usize),
    /// A gauge was bound with no sensors.
    #[error("gauge {0:?} has no sensors bound")]
    EmptyGauge(GaugeId),
    /// A gauge was bound with more sensors than it has readout slots.
    #[error("gauge {0:?} binds {1} sensors, at most 2 are supported")]
    TooManySensors(GaugeId, usize),
    /// A calibration table has fewer than two breakpoints.
    #[error("calibration table needs at least two breakpoints")]
    ShortTable,
    /// A calibration table's breakpoints are not strictly increasing.
    #[error("calibration table breakpoints must be strictly increasing")]
    UnsortedTable,
}

/// Tier firing periods in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Period of the very-fast tier (pulse rates).
    pub very_fast_ms: u64,
    /// Period of the fast tier (transient analog channels).
    pub fast_ms: u64,
    /// Period of the medium tier (temperatures, GPS, CAN).
    pub medium_ms: u64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            very_fast_ms: 50,
            fast_ms: 250,
            medium_ms: 1000,
        }
    }
}

impl TierConfig {
    /// Convert to scheduler intervals.
    pub fn intervals(&self) -> TierIntervals {
        TierIntervals {
            very_fast: Duration::from_millis(self.very_fast_ms),
            fast: Duration::from_millis(self.fast_ms),
            medium: Duration::from_millis(self.medium_ms),
        }
    }
}

/// Acquisition backend of one sensor role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum SensorBackendConfig {
    /// Analog input with a calibration curve.
    Adc {
        /// Physical analog input index.
        channel: usize,
        /// Raw-voltage-to-engineering conversion.
        calibration: Calibration,
    },
    /// CAN frame field.
    Can {
        /// Where the value lives on the bus and how to convert it.
        field: FrameFieldSpec,
    },
}

/// One sensor role: its backend, tier assignment and unit label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// How the raw value is acquired and converted.
    #[serde(flatten)]
    pub backend: SensorBackendConfig,
    /// Tier this sensor's channel is sampled on.
    pub tier: TimerTier,
    /// Engineering unit of the produced value.
    #[serde(default)]
    pub unit: String,
}

impl SensorConfig {
    /// An ADC-backed role.
    pub fn adc(
        channel: usize,
        calibration: Calibration,
        tier: TimerTier,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            backend: SensorBackendConfig::Adc {
                channel,
                calibration,
            },
            tier,
            unit: unit.into(),
        }
    }

    /// A CAN-backed role; the unit comes from the field spec.
    pub fn can(field: FrameFieldSpec, tier: TimerTier) -> Self {
        let unit = field.unit.clone();
        Self {
            backend: SensorBackendConfig::Can { field },
            tier,
            unit,
        }
    }

    /// Validate against static constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.backend {
            SensorBackendConfig::Adc { .. } => Ok(()),
            SensorBackendConfig::Can { field } => field.validate(),
        }
    }
}

/// Pulse-counter channel configuration.
///
/// `scale` converts the raw pulses-per-millisecond rate into display units;
/// it depends on pulses per revolution or per mile and is configuration,
/// never derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Display units per pulse-per-millisecond.
    pub scale: f64,
    /// Tier the rate is recomputed on.
    pub tier: TimerTier,
}

/// Which source feeds the speedometer's primary readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedoSource {
    /// Vehicle speed sensor pulse counter.
    Vss,
    /// GPS ground speed.
    Gps,
}

/// Speedometer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedoConfig {
    /// Primary speed source.
    pub source: SpeedoSource,
    /// Selection key for the secondary top readout; unknown keys fall back
    /// to ambient temperature.
    pub top_source: String,
}

/// GPS sampling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpsConfig {
    /// Tier the fix-derived channels are refreshed on.
    pub tier: TimerTier,
}

/// Complete dash configuration, one field per sensor role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// Tier firing periods.
    pub tiers: TierConfig,
    /// MAP sensor feeding the boost gauge.
    pub boost: SensorConfig,
    /// Coolant temperature sensor.
    pub coolant_temp: SensorConfig,
    /// Ambient (outside) temperature sensor.
    pub ambient_temp: SensorConfig,
    /// Oil temperature sensor.
    pub oil_temp: SensorConfig,
    /// Oil pressure sender.
    pub oil_pressure: SensorConfig,
    /// Fuel level sender.
    pub fuel_level: SensorConfig,
    /// Battery voltage input.
    pub voltmeter: SensorConfig,
    /// Tachometer pulse channel.
    pub tach: PulseConfig,
    /// Vehicle speed sensor pulse channel.
    pub vss: PulseConfig,
    /// GPS sampling.
    pub gps: GpsConfig,
    /// Speedometer sources.
    pub speedo: SpeedoConfig,
}

impl DashConfig {
    /// Validate every role.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for role in [
            &self.boost,
            &self.coolant_temp,
            &self.ambient_temp,
            &self.oil_temp,
            &self.oil_pressure,
            &self.fuel_level,
            &self.voltmeter,
        ] {
            role.validate()?;
        }
        Ok(())
    }
}

impl Default for DashConfig {
    fn default() -> Self {
        use crate::sensor::{InterpTable, VoltageDivider};

        let ntc_divider = VoltageDivider {
            v_supply: 5.0,
            r_balance: 1000.0,
        };
        let ntc = |tier| {
            SensorConfig::adc(
                0,
                Calibration::Ntc {
                    divider: ntc_divider,
                    beta: 3950.0,
                    r_nominal: 10_000.0,
                    t_nominal_c: 25.0,
                },
                tier,
                "°F",
            )
        };

        let mut coolant_temp = ntc(TimerTier::Medium);
        let mut ambient_temp = ntc(TimerTier::Medium);
        let mut oil_temp = ntc(TimerTier::Medium);
        set_adc_channel(&mut coolant_temp, 1);
        set_adc_channel(&mut ambient_temp, 2);
        set_adc_channel(&mut oil_temp, 3);

        Self {
            tiers: TierConfig::default(),
            // 1-bar MAP transfer function: psi gauge pressure from volts.
            boost: SensorConfig::adc(
                0,
                Calibration::Linear {
                    scale: 8.94,
                    offset: -14.53,
                },
                TimerTier::Fast,
                "psi",
            ),
            coolant_temp,
            ambient_temp,
            oil_temp,
            // VDO-style 0-80 psi sender behind a 330Ω balance resistor.
            oil_pressure: SensorConfig::adc(
                4,
                Calibration::Resistive {
                    divider: VoltageDivider {
                        v_supply: 5.0,
                        r_balance: 330.0,
                    },
                    curve: InterpTable::new(vec![
                        (10.0, 0.0),
                        (52.0, 20.0),
                        (88.0, 40.0),
                        (124.0, 60.0),
                        (184.0, 80.0),
                    ])
                    .expect("static table is valid"),
                },
                TimerTier::Fast,
                "psi",
            ),
            // 240Ω empty / 33Ω full tank sender.
            fuel_level: SensorConfig::adc(
                5,
                Calibration::Resistive {
                    divider: VoltageDivider {
                        v_supply: 5.0,
                        r_balance: 240.0,
                    },
                    curve: InterpTable::new(vec![(33.0, 100.0), (240.0, 0.0)])
                        .expect("static table is valid"),
                },
                TimerTier::Medium,
                "%",
            ),
            // 12V rail through a 4.7k/1k divider.
            voltmeter: SensorConfig::adc(
                6,
                Calibration::Linear {
                    scale: 5.7,
                    offset: 0.0,
                },
                TimerTier::Medium,
                "V",
            ),
            // 2 pulses/rev: rpm = pulses/ms * 60000 / 2.
            tach: PulseConfig {
                scale: 30_000.0,
                tier: TimerTier::VeryFast,
            },
            // 8000 pulses/mile: mph = pulses/ms * 3_600_000 / 8000.
            vss: PulseConfig {
                scale: 450.0,
                tier: TimerTier::VeryFast,
            },
            gps: GpsConfig {
                tier: TimerTier::Medium,
            },
            speedo: SpeedoConfig {
                source: SpeedoSource::Vss,
                top_source: "ambient_temp".to_string(),
            },
        }
    }
}

fn set_adc_channel(config: &mut SensorConfig, new_channel: usize) {
    if let SensorBackendConfig::Adc { channel, .. } = &mut config.backend {
        *channel = new_channel;
    }
}
