//! Dash assembly
//!
//! Wires the whole pipeline together from configuration: hardware backends
//! become sources, sources and calibrations become sensors, sensors become
//! gauge bindings, and every source channel and gauge is registered with the
//! sample scheduler. Gauge identity is resolved here, once, at construction.

use std::sync::{Arc, Mutex};

use crate::config::{ConfigError, DashConfig, SensorBackendConfig, SensorConfig, SpeedoSource};
use crate::gauge::{DisplaySink, GaugeBinding, GaugeId, SecondarySource};
use crate::scheduler::{SampleScheduler, SchedulerState, TimerTier};
use crate::sensor::{Calibration, Sensor, SensorId, SensorTable};
use crate::source::{
    AdcReader, AdcSource, CanFrameSource, CanFrameTx, ChannelId, FixProvider, GpsChannel,
    GpsSource, PulseCounter, PulseSource, SourceId, SourceTable, RATE_CHANNEL,
};

/// Physical acquisition backends injected by the platform layer.
pub struct DashHardware {
    /// Analog-to-digital converter.
    pub adc: Box<dyn AdcReader>,
    /// GPS receiver.
    pub gps: Box<dyn FixProvider>,
    /// Tachometer pulse counter.
    pub tach: Box<dyn PulseCounter>,
    /// Vehicle speed sensor pulse counter.
    pub vss: Box<dyn PulseCounter>,
}

/// One assembled role: its sensor handle and the tier it samples on.
#[derive(Clone, Copy)]
struct Role {
    sensor: SensorId,
    tier: TimerTier,
}

/// The assembled dash: sources, sensors, gauges and their scheduler.
pub struct Dash {
    scheduler: SampleScheduler,
    can_tx: CanFrameTx,
}

impl Dash {
    /// Build the full pipeline from configuration and injected hardware.
    ///
    /// Configuration errors here are fatal; they indicate static
    /// misconfiguration, not a transient runtime condition.
    pub fn assemble(
        config: &DashConfig,
        hardware: DashHardware,
        sink: Box<dyn DisplaySink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut sources = SourceTable::new();
        let adc = sources.insert(Box::new(AdcSource::new(hardware.adc)));
        let gps = sources.insert(Box::new(GpsSource::new(hardware.gps)));
        let tach_source = sources.insert(Box::new(PulseSource::tach(hardware.tach)));
        let vss_source = sources.insert(Box::new(PulseSource::vss(hardware.vss)));
        let (can_source, can_tx) = CanFrameSource::new();
        let can = sources.insert(Box::new(can_source));

        let mut sensors = SensorTable::new();
        let mut updates: Vec<(TimerTier, SourceId, ChannelId)> = Vec::new();
        let mut role = |label: &str, cfg: &SensorConfig| -> Role {
            let (sensor, source, channel) = match &cfg.backend {
                SensorBackendConfig::Adc {
                    channel,
                    calibration,
                } => (
                    Sensor::calibrated(label, adc, *channel, calibration.clone(), &cfg.unit),
                    adc,
                    *channel,
                ),
                SensorBackendConfig::Can { field } => (
                    Sensor::can_field(label, can, field.clone()),
                    can,
                    field.frame_id as ChannelId,
                ),
            };
            let sensor = sensors.insert(sensor);
            updates.push((cfg.tier, source, channel));
            Role {
                sensor,
                tier: cfg.tier,
            }
        };

        let boost = role("boost", &config.boost);
        let coolant = role("coolant temp", &config.coolant_temp);
        let ambient = role("ambient temp", &config.ambient_temp);
        let oil_temp = role("oil temp", &config.oil_temp);
        let oil_pressure = role("oil pressure", &config.oil_pressure);
        let fuel = role("fuel level", &config.fuel_level);
        let voltmeter = role("voltmeter", &config.voltmeter);
        drop(role);

        // Speedometer primary: VSS pulse rate or GPS ground speed.
        let speed = match config.speedo.source {
            SpeedoSource::Vss => {
                updates.push((config.vss.tier, vss_source, RATE_CHANNEL));
                Role {
                    sensor: sensors.insert(Sensor::calibrated(
                        "vehicle speed",
                        vss_source,
                        RATE_CHANNEL,
                        Calibration::Linear {
                            scale: config.vss.scale,
                            offset: 0.0,
                        },
                        "mph",
                    )),
                    tier: config.vss.tier,
                }
            }
            SpeedoSource::Gps => {
                let channel = GpsChannel::SpeedMph.channel();
                updates.push((config.gps.tier, gps, channel));
                Role {
                    sensor: sensors.insert(Sensor::calibrated(
                        "vehicle speed",
                        gps,
                        channel,
                        Calibration::identity(),
                        "mph",
                    )),
                    tier: config.gps.tier,
                }
            }
        };

        updates.push((config.tach.tier, tach_source, RATE_CHANNEL));
        let tach = Role {
            sensor: sensors.insert(Sensor::calibrated(
                "engine speed",
                tach_source,
                RATE_CHANNEL,
                Calibration::Linear {
                    scale: config.tach.scale,
                    offset: 0.0,
                },
                "rpm",
            )),
            tier: config.tach.tier,
        };

        let sources = Arc::new(Mutex::new(sources));
        let sensors = Arc::new(sensors);
        let scheduler = SampleScheduler::new(
            config.tiers.intervals(),
            Arc::clone(&sources),
            Arc::clone(&sensors),
            sink,
        );
        for (tier, source, channel) in updates {
            scheduler.register_update(tier, source, channel);
        }

        // Single-readout gauges refresh on their sensor's own tier.
        for (id, r) in [
            (GaugeId::Boost, boost),
            (GaugeId::CoolantTemp, coolant),
            (GaugeId::OilTemp, oil_temp),
            (GaugeId::OilPressure, oil_pressure),
            (GaugeId::FuelLevel, fuel),
            (GaugeId::Voltmeter, voltmeter),
            (GaugeId::Tachometer, tach),
        ] {
            scheduler.register_gauge(r.tier, GaugeBinding::single(id, r.sensor));
        }

        // Combined temp/fuel cluster: coolant primary, fuel secondary.
        let cluster = GaugeBinding::new(
            GaugeId::TempFuelCluster,
            vec![coolant.sensor, fuel.sensor],
        )?;
        scheduler.register_gauge(coolant.tier.min(fuel.tier), cluster);

        // Speedometer secondary readout, resolved once from the closed
        // candidate set; unknown keys already fell back to ambient.
        let top = match SecondarySource::from_key(&config.speedo.top_source) {
            SecondarySource::AmbientTemp => ambient,
            SecondarySource::CoolantTemp => coolant,
            SecondarySource::OilTemp => oil_temp,
            SecondarySource::OilPressure => oil_pressure,
            SecondarySource::Boost => boost,
            SecondarySource::Voltmeter => voltmeter,
            SecondarySource::FuelLevel => fuel,
        };
        let speedo = GaugeBinding::new(GaugeId::Speedometer, vec![speed.sensor, top.sensor])?;
        scheduler.register_gauge(speed.tier.min(top.tier), speedo);

        tracing::info!(
            sensors = sensors.len(),
            "dash assembled"
        );

        Ok(Self { scheduler, can_tx })
    }

    /// Start every sample tier. Must be called from within a Tokio runtime.
    pub fn start(&mut self) {
        self.scheduler.start();
    }

    /// Stop every sample tier.
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Current scheduler state.
    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Push handle for the bus-interface collaborator to deliver CAN frames.
    pub fn can_frame_tx(&self) -> CanFrameTx {
        self.can_tx.clone()
    }
}
