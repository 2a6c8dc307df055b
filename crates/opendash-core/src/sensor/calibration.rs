//! Calibration curves
//!
//! Pure raw-to-engineering conversions for analog and pulse channels. The
//! variant set is closed: one generic sensor type serves coolant, oil and
//! ambient temperature, fuel level, oil pressure, boost, the voltmeter and
//! both pulse rates, differing only in the calibration it carries.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::unit_conversion::celsius_to_fahrenheit;

/// Balance-resistor divider feeding an ADC input.
///
/// The sender sits on the low side: measured voltage rises with sender
/// resistance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageDivider {
    /// Supply voltage across the divider.
    pub v_supply: f64,
    /// Fixed balance resistor in ohms.
    pub r_balance: f64,
}

impl VoltageDivider {
    /// Sender resistance implied by the measured voltage.
    ///
    /// Returns infinity when the measured voltage reaches the supply rail
    /// (open sender) and zero at or below ground.
    pub fn sender_resistance(&self, v_measured: f64) -> f64 {
        if v_measured <= 0.0 {
            return 0.0;
        }
        if v_measured >= self.v_supply {
            return f64::INFINITY;
        }
        self.r_balance * v_measured / (self.v_supply - v_measured)
    }
}

/// Piecewise-linear breakpoint table.
///
/// Breakpoints are strictly increasing in x; lookups clamp at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct InterpTable {
    points: Vec<(f64, f64)>,
}

impl InterpTable {
    /// Build a table, validating the breakpoints.
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, ConfigError> {
        if points.len() < 2 {
            return Err(ConfigError::ShortTable);
        }
        if points.windows(2).any(|pair| pair[0].0 >= pair[1].0) {
            return Err(ConfigError::UnsortedTable);
        }
        Ok(Self { points })
    }

    /// Interpolate, clamping outside the table's domain. A NaN input
    /// stays NaN rather than clamping to an end breakpoint.
    pub fn lookup(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }
        for pair in self.points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if x <= x1 {
                return y0 + (y1 - y0) * (x - x0) / (x1 - x0);
            }
        }
        last.1
    }
}

impl TryFrom<Vec<(f64, f64)>> for InterpTable {
    type Error = ConfigError;

    fn try_from(points: Vec<(f64, f64)>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<InterpTable> for Vec<(f64, f64)> {
    fn from(table: InterpTable) -> Self {
        table.points
    }
}

/// Closed set of calibration curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Calibration {
    /// `value = raw * scale + offset`.
    ///
    /// Covers MAP transfer functions, voltmeter divider ratios and
    /// pulse-rate scaling; the scale constant comes from configuration.
    Linear {
        /// Multiplier applied to the raw sample.
        scale: f64,
        /// Offset added after scaling.
        offset: f64,
    },
    /// Beta-equation NTC thermistor behind a balance divider, output °F.
    Ntc {
        /// Divider the thermistor sits in.
        divider: VoltageDivider,
        /// Beta coefficient in kelvin.
        beta: f64,
        /// Resistance at the nominal temperature, in ohms.
        r_nominal: f64,
        /// Nominal temperature in °C (typically 25).
        t_nominal_c: f64,
    },
    /// Divider-derived sender resistance run through a breakpoint table.
    Resistive {
        /// Divider the sender sits in.
        divider: VoltageDivider,
        /// Resistance-to-unit curve.
        curve: InterpTable,
    },
}

impl Calibration {
    /// The identity calibration.
    pub fn identity() -> Self {
        Self::Linear {
            scale: 1.0,
            offset: 0.0,
        }
    }

    /// Apply the curve to one raw sample.
    ///
    /// Pure; out-of-range inputs (open sender, rail voltage) yield NaN,
    /// which downstream treats as the invalid-reading sentinel.
    pub fn apply(&self, raw: f64) -> f64 {
        match self {
            Self::Linear { scale, offset } => raw * scale + offset,
            Self::Ntc {
                divider,
                beta,
                r_nominal,
                t_nominal_c,
            } => {
                let resistance = divider.sender_resistance(raw);
                if !resistance.is_finite() || resistance <= 0.0 {
                    return f64::NAN;
                }
                let t_nominal_k = t_nominal_c + 273.15;
                let t_k = 1.0 / (1.0 / t_nominal_k + (resistance / r_nominal).ln() / beta);
                celsius_to_fahrenheit(t_k - 273.15)
            }
            Self::Resistive { divider, curve } => {
                let resistance = divider.sender_resistance(raw);
                if !resistance.is_finite() {
                    return f64::NAN;
                }
                curve.lookup(resistance)
            }
        }
    }
}
