//! Tiered sample scheduler
//!
//! Three fixed-rate tiers drive all acquisition. Each running tier is one
//! periodic timer task that, per tick, refreshes its registered
//! (source, channel) pairs in registration order and then refreshes the
//! gauges bound to that tier from the same locked snapshot, so no source is
//! re-acquired mid-assembly. Tiers fire independently; readings from
//! different tiers are not time-aligned.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::gauge::{DisplaySink, GaugeBinding};
use crate::sensor::SensorTable;
use crate::source::{ChannelId, SourceId, SourceTable};

/// Fixed scheduling groups, fastest first.
///
/// Pulse-rate channels need [`TimerTier::VeryFast`] for acceptable latency
/// and rate accuracy; transient-sensitive analog channels use
/// [`TimerTier::Fast`]; slow-moving quantities (temperatures, GPS, CAN)
/// use [`TimerTier::Medium`] to bound acquisition cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerTier {
    /// Highest rate.
    VeryFast,
    /// Intermediate rate.
    Fast,
    /// Lowest rate.
    Medium,
}

impl TimerTier {
    /// All tiers, fastest first. `Ord` follows this order, so the fastest
    /// of a set of tiers is its minimum.
    pub const ALL: [TimerTier; 3] = [TimerTier::VeryFast, TimerTier::Fast, TimerTier::Medium];

    fn index(self) -> usize {
        match self {
            TimerTier::VeryFast => 0,
            TimerTier::Fast => 1,
            TimerTier::Medium => 2,
        }
    }
}

/// Configured firing period of each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierIntervals {
    /// Period of [`TimerTier::VeryFast`].
    pub very_fast: Duration,
    /// Period of [`TimerTier::Fast`].
    pub fast: Duration,
    /// Period of [`TimerTier::Medium`].
    pub medium: Duration,
}

impl TierIntervals {
    /// Period of one tier.
    pub fn interval(&self, tier: TimerTier) -> Duration {
        match tier {
            TimerTier::VeryFast => self.very_fast,
            TimerTier::Fast => self.fast,
            TimerTier::Medium => self.medium,
        }
    }
}

impl Default for TierIntervals {
    fn default() -> Self {
        Self {
            very_fast: Duration::from_millis(50),
            fast: Duration::from_millis(250),
            medium: Duration::from_millis(1000),
        }
    }
}

/// Scheduler lifecycle; there are no intermediate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No tier is firing.
    Stopped,
    /// Every tier is firing at its configured interval.
    Running,
}

#[derive(Default)]
struct TierRegistry {
    updates: Vec<(SourceId, ChannelId)>,
    gauges: Vec<GaugeBinding>,
}

/// Drives periodic `update` calls on sources and gauge refreshes.
pub struct SampleScheduler {
    intervals: TierIntervals,
    registries: [Arc<Mutex<TierRegistry>>; 3],
    sources: Arc<Mutex<SourceTable>>,
    sensors: Arc<SensorTable>,
    sink: Arc<Mutex<Box<dyn DisplaySink>>>,
    state: SchedulerState,
    tasks: Vec<JoinHandle<()>>,
}

impl SampleScheduler {
    /// Create a stopped scheduler over the shared source and sensor tables.
    pub fn new(
        intervals: TierIntervals,
        sources: Arc<Mutex<SourceTable>>,
        sensors: Arc<SensorTable>,
        sink: Box<dyn DisplaySink>,
    ) -> Self {
        Self {
            intervals,
            registries: Default::default(),
            sources,
            sensors,
            sink: Arc::new(Mutex::new(sink)),
            state: SchedulerState::Stopped,
            tasks: Vec::new(),
        }
    }

    /// Register one (source, channel) pair with a tier. Pairs are updated
    /// in registration order on every tick of that tier.
    pub fn register_update(&self, tier: TimerTier, source: SourceId, channel: ChannelId) {
        if let Ok(mut registry) = self.registries[tier.index()].lock() {
            registry.updates.push((source, channel));
        }
    }

    /// Register a gauge to be refreshed after each tick of a tier.
    pub fn register_gauge(&self, tier: TimerTier, gauge: GaugeBinding) {
        if let Ok(mut registry) = self.registries[tier.index()].lock() {
            registry.gauges.push(gauge);
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Transition every tier from Stopped to Running.
    ///
    /// Must be called from within a Tokio runtime. Idempotent while running.
    pub fn start(&mut self) {
        if self.state == SchedulerState::Running {
            return;
        }
        for tier in TimerTier::ALL {
            let period = self.intervals.interval(tier);
            let registry = Arc::clone(&self.registries[tier.index()]);
            let sources = Arc::clone(&self.sources);
            let sensors = Arc::clone(&self.sensors);
            let sink = Arc::clone(&self.sink);
            self.tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                // A late tick realigns to the period instead of bursting.
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    run_tick(tier, &registry, &sources, &sensors, &sink);
                }
            }));
            tracing::debug!(?tier, period_ms = period.as_millis() as u64, "tier running");
        }
        self.state = SchedulerState::Running;
    }

    /// Transition every tier back to Stopped. No further `update` calls
    /// happen until the next `start`.
    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if self.state == SchedulerState::Running {
            tracing::debug!("all tiers stopped");
        }
        self.state = SchedulerState::Stopped;
    }
}

impl Drop for SampleScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_tick(
    tier: TimerTier,
    registry: &Mutex<TierRegistry>,
    sources: &Mutex<SourceTable>,
    sensors: &SensorTable,
    sink: &Mutex<Box<dyn DisplaySink>>,
) {
    let Ok(registry) = registry.lock() else {
        return;
    };
    let Ok(mut sources) = sources.lock() else {
        return;
    };

    for (source, channel) in &registry.updates {
        if let Err(error) = sources.update(*source, *channel) {
            // Acquisition failures never stop the tier; the sensor reads
            // as invalid until it recovers.
            tracing::debug!(
                ?tier,
                source = source.index(),
                channel = *channel,
                %error,
                "sample update failed"
            );
        }
    }

    if registry.gauges.is_empty() {
        return;
    }
    let Ok(mut sink) = sink.lock() else {
        return;
    };
    for gauge in &registry.gauges {
        gauge.refresh(sensors, &sources, sink.as_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauge::{GaugeId, ReadoutSlot};
    use crate::source::{RawSample, SensorSource, SourceError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource(Arc<AtomicUsize>);

    impl SensorSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        fn update(&mut self, _channel: ChannelId) -> Result<(), SourceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn read(&self, _channel: ChannelId) -> RawSample {
            RawSample::scalar(1.0)
        }
    }

    struct NullSink;

    impl DisplaySink for NullSink {
        fn set_reading(&mut self, _gauge: GaugeId, _slot: ReadoutSlot, _value: f64) {}
    }

    fn scheduler_with_counter() -> (SampleScheduler, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let mut sources = SourceTable::new();
        let id = sources.insert(Box::new(CountingSource(Arc::clone(&count))));
        let scheduler = SampleScheduler::new(
            TierIntervals {
                very_fast: Duration::from_millis(100),
                fast: Duration::from_millis(250),
                medium: Duration::from_millis(1000),
            },
            Arc::new(Mutex::new(sources)),
            Arc::new(SensorTable::new()),
            Box::new(NullSink),
        );
        scheduler.register_update(TimerTier::VeryFast, id, 0);
        (scheduler, count)
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn tier_fires_at_configured_interval() {
        let (mut scheduler, count) = scheduler_with_counter();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        scheduler.start();
        assert_eq!(scheduler.state(), SchedulerState::Running);
        settle().await;
        // The interval's first tick fires immediately.
        assert_eq!(count.load(Ordering::SeqCst), 1);

        for expected in 2..=11 {
            tokio::time::advance(Duration::from_millis(100)).await;
            settle().await;
            assert_eq!(count.load(Ordering::SeqCst), expected);
        }
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_updates_until_restart() {
        let (mut scheduler, count) = scheduler_with_counter();
        scheduler.start();
        settle().await;
        for _ in 0..3 {
            tokio::time::advance(Duration::from_millis(100)).await;
            settle().await;
        }
        let before = count.load(Ordering::SeqCst);
        assert_eq!(before, 4);

        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        settle().await;
        for _ in 0..5 {
            tokio::time::advance(Duration::from_millis(100)).await;
            settle().await;
        }
        assert_eq!(count.load(Ordering::SeqCst), before);

        scheduler.start();
        settle().await;
        assert!(count.load(Ordering::SeqCst) > before);
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn updates_run_in_registration_order() {
        struct OrderSource {
            log: Arc<Mutex<Vec<ChannelId>>>,
        }

        impl SensorSource for OrderSource {
            fn name(&self) -> &str {
                "order"
            }

            fn update(&mut self, channel: ChannelId) -> Result<(), SourceError> {
                if let Ok(mut log) = self.log.lock() {
                    log.push(channel);
                }
                Ok(())
            }

            fn read(&self, _channel: ChannelId) -> RawSample {
                RawSample::invalid()
            }
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sources = SourceTable::new();
        let id = sources.insert(Box::new(OrderSource {
            log: Arc::clone(&log),
        }));

        let mut scheduler = SampleScheduler::new(
            TierIntervals::default(),
            Arc::new(Mutex::new(sources)),
            Arc::new(SensorTable::new()),
            Box::new(NullSink),
        );
        scheduler.register_update(TimerTier::Fast, id, 2);
        scheduler.register_update(TimerTier::Fast, id, 0);
        scheduler.register_update(TimerTier::Fast, id, 1);

        scheduler.start();
        settle().await;
        scheduler.stop();

        assert_eq!(*log.lock().unwrap(), vec![2, 0, 1]);
    }
}
