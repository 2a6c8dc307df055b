//! Gauge bindings
//!
//! A [`GaugeBinding`] gathers readings from its bound sensors once per
//! refresh tick and pushes them into the external display model through the
//! [`DisplaySink`] collaborator. Gauge identity is a closed enumeration
//! resolved at construction, not a string looked up at runtime.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::sensor::{SensorId, SensorTable};
use crate::source::SourceTable;

/// Sentinel pushed for a slot whose reading could not be produced this tick.
pub const INVALID_READING: f64 = f64::NAN;

/// The fixed set of gauges on the dash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeId {
    /// Boost / manifold pressure gauge.
    Boost,
    /// Coolant temperature gauge.
    CoolantTemp,
    /// Oil temperature gauge.
    OilTemp,
    /// Oil pressure gauge.
    OilPressure,
    /// Fuel level gauge.
    FuelLevel,
    /// Battery voltage gauge.
    Voltmeter,
    /// Combined temperature + fuel cluster.
    TempFuelCluster,
    /// Speedometer with its secondary top readout.
    Speedometer,
    /// Tachometer.
    Tachometer,
}

/// Which visual slot of a gauge a reading feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadoutSlot {
    /// The gauge's main readout (needle, temperature half of the cluster).
    Primary,
    /// The auxiliary readout (speedometer top value, fuel half).
    Secondary,
}

/// External display-model collaborator; rendering is out of scope.
pub trait DisplaySink: Send {
    /// Accept one reading for one gauge slot. Receives [`INVALID_READING`]
    /// when the slot's sensor could not produce a value this tick.
    fn set_reading(&mut self, gauge: GaugeId, slot: ReadoutSlot, value: f64);
}

/// Candidate sources for a gauge's secondary readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondarySource {
    /// Ambient (outside) temperature; also the fallback.
    #[default]
    AmbientTemp,
    /// Coolant temperature.
    CoolantTemp,
    /// Oil temperature.
    OilTemp,
    /// Oil pressure.
    OilPressure,
    /// Boost / manifold pressure.
    Boost,
    /// Battery voltage.
    Voltmeter,
    /// Fuel level.
    FuelLevel,
}

impl SecondarySource {
    /// Resolve a configuration key, falling back to ambient temperature for
    /// anything outside the known candidate set.
    pub fn from_key(key: &str) -> Self {
        match key {
            "ambient_temp" => Self::AmbientTemp,
            "coolant_temp" => Self::CoolantTemp,
            "oil_temp" => Self::OilTemp,
            "oil_pressure" => Self::OilPressure,
            "boost" => Self::Boost,
            "voltmeter" => Self::Voltmeter,
            "fuel_level" => Self::FuelLevel,
            other => {
                tracing::warn!(
                    key = other,
                    "unknown secondary readout source, falling back to ambient temperature"
                );
                Self::AmbientTemp
            }
        }
    }
}

/// One gauge's bound sensors, primary first.
#[derive(Debug, Clone)]
pub struct GaugeBinding {
    id: GaugeId,
    sensors: Vec<SensorId>,
}

impl GaugeBinding {
    /// Bind sensors to a gauge. The list order is fixed here: index 0 feeds
    /// the primary slot, index 1 the secondary.
    pub fn new(id: GaugeId, sensors: Vec<SensorId>) -> Result<Self, ConfigError> {
        if sensors.is_empty() {
            return Err(ConfigError::EmptyGauge(id));
        }
        if sensors.len() > 2 {
            return Err(ConfigError::TooManySensors(id, sensors.len()));
        }
        Ok(Self { id, sensors })
    }

    /// Bind a single-readout gauge.
    pub fn single(id: GaugeId, sensor: SensorId) -> Self {
        Self {
            id,
            sensors: vec![sensor],
        }
    }

    /// The gauge this binding feeds.
    pub fn id(&self) -> GaugeId {
        self.id
    }

    /// Bound sensors, primary first.
    pub fn sensors(&self) -> &[SensorId] {
        &self.sensors
    }

    /// Read every bound sensor in order and push the results outward.
    ///
    /// A failed read never aborts the binding: that slot gets
    /// [`INVALID_READING`] and the remaining slots still update.
    pub fn refresh(&self, sensors: &SensorTable, sources: &SourceTable, sink: &mut dyn DisplaySink) {
        for (index, sensor_id) in self.sensors.iter().enumerate() {
            let slot = if index == 0 {
                ReadoutSlot::Primary
            } else {
                ReadoutSlot::Secondary
            };
            let value = match sensors.read(*sensor_id, sources) {
                Ok(value) => value,
                Err(error) => {
                    tracing::trace!(gauge = ?self.id, ?slot, %error, "reading unavailable");
                    INVALID_READING
                }
            };
            sink.set_reading(self.id, slot, value);
        }
    }
}
