//! # OpenDash Core Library
//!
//! Sensor acquisition and value decoding for a digital instrument cluster.
//!
//! This library provides:
//! - CAN frame field decoding with configurable unit-conversion chains
//! - Acquisition backends for ADC, GPS, pulse-counter and CAN inputs
//! - Calibrated sensors producing engineering-unit readings on demand
//! - A tiered sample scheduler driving acquisition at independent rates
//! - Gauge bindings pushing readings into an external display model
//!
//! Rendering, configuration loading and bus connection management are
//! external collaborators; the core consumes parsed configuration and raw
//! frames and produces numeric readings.
//!
//! ## Example
//!
//! ```rust,no_run
//! use opendash_core::config::DashConfig;
//! use opendash_core::dash::{Dash, DashHardware};
//! use opendash_core::gauge::{DisplaySink, GaugeId, ReadoutSlot};
//! use opendash_core::sim::{SimAdc, SimGps, SimPulseCounter};
//!
//! struct Printer;
//!
//! impl DisplaySink for Printer {
//!     fn set_reading(&mut self, gauge: GaugeId, slot: ReadoutSlot, value: f64) {
//!         println!("{gauge:?}/{slot:?} = {value:.1}");
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), opendash_core::config::ConfigError> {
//! let hardware = DashHardware {
//!     adc: Box::new(SimAdc::new()),
//!     gps: Box::new(SimGps::new()),
//!     tach: Box::new(SimPulseCounter::new(30.0)),
//!     vss: Box::new(SimPulseCounter::new(28.0)),
//! };
//! let mut dash = Dash::assemble(&DashConfig::default(), hardware, Box::new(Printer))?;
//! dash.start();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod dash;
pub mod frame;
pub mod gauge;
pub mod scheduler;
pub mod sensor;
pub mod sim;
pub mod source;
pub mod unit_conversion;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConfigError, DashConfig, SensorConfig, TierConfig};
    pub use crate::dash::{Dash, DashHardware};
    pub use crate::frame::{decode, DecodeError, FrameFieldSpec, Operation};
    pub use crate::gauge::{DisplaySink, GaugeBinding, GaugeId, ReadoutSlot, INVALID_READING};
    pub use crate::scheduler::{SampleScheduler, SchedulerState, TierIntervals, TimerTier};
    pub use crate::sensor::{Calibration, ReadError, Sensor, SensorId, SensorTable};
    pub use crate::source::{
        CanFrame, CanFrameTx, RawSample, SensorSource, SourceError, SourceId, SourceTable,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
