//! Simulated Dash Demo
//!
//! Runs the full acquisition pipeline against simulated hardware and prints
//! gauge readings as they arrive, one line per update.
//!
//! Usage:
//!   cargo run --example sim_dash -- [SECONDS]

use std::env;
use std::time::Duration;

use anyhow::Result;

use opendash_core::config::DashConfig;
use opendash_core::dash::{Dash, DashHardware};
use opendash_core::gauge::{DisplaySink, GaugeId, ReadoutSlot};
use opendash_core::sim::{SimAdc, SimGps, SimPulseCounter};

struct ConsoleSink;

impl DisplaySink for ConsoleSink {
    fn set_reading(&mut self, gauge: GaugeId, slot: ReadoutSlot, value: f64) {
        if value.is_nan() {
            println!("{gauge:?}/{slot:?}: ---");
        } else {
            println!("{gauge:?}/{slot:?}: {value:.1}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let seconds: u64 = env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(5);

    let hardware = DashHardware {
        adc: Box::new(SimAdc::new()),
        gps: Box::new(SimGps::new()),
        // ~900 rpm idle, ~45 mph cruise with the default calibrations.
        tach: Box::new(SimPulseCounter::new(30.0)),
        vss: Box::new(SimPulseCounter::new(28.0)),
    };

    let config = DashConfig::default();
    println!("running simulated dash for {seconds}s");
    let mut dash = Dash::assemble(&config, hardware, Box::new(ConsoleSink))?;
    dash.start();

    tokio::time::sleep(Duration::from_secs(seconds)).await;

    dash.stop();
    Ok(())
}
