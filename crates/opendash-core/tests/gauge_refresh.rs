//! Tests for gauge bindings pushing readings into a display sink

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use opendash_core::gauge::{DisplaySink, GaugeBinding, GaugeId, ReadoutSlot};
    use opendash_core::sensor::{Calibration, Sensor, SensorTable};
    use opendash_core::source::{
        ChannelId, RawSample, SensorSource, SourceError, SourceTable,
    };

    /// Sink double that remembers the last value per gauge slot.
    #[derive(Default)]
    struct RecordingSink {
        readings: HashMap<(GaugeId, ReadoutSlot), f64>,
    }

    impl DisplaySink for RecordingSink {
        fn set_reading(&mut self, gauge: GaugeId, slot: ReadoutSlot, value: f64) {
            self.readings.insert((gauge, slot), value);
        }
    }

    /// Channel 0 always has a sample, channel 1 never does.
    struct HalfBrokenSource;

    impl SensorSource for HalfBrokenSource {
        fn name(&self) -> &str {
            "half-broken"
        }

        fn update(&mut self, _channel: ChannelId) -> Result<(), SourceError> {
            Ok(())
        }

        fn read(&self, channel: ChannelId) -> RawSample {
            match channel {
                0 => RawSample::scalar(12.6),
                _ => RawSample::invalid(),
            }
        }
    }

    fn fixture() -> (SourceTable, SensorTable, GaugeBinding) {
        let mut sources = SourceTable::new();
        let source = sources.insert(Box::new(HalfBrokenSource));

        let mut sensors = SensorTable::new();
        let healthy = sensors.insert(Sensor::calibrated(
            "battery",
            source,
            0,
            Calibration::identity(),
            "V",
        ));
        let broken = sensors.insert(Sensor::calibrated(
            "ambient temp",
            source,
            1,
            Calibration::identity(),
            "°F",
        ));

        let binding =
            GaugeBinding::new(GaugeId::Speedometer, vec![healthy, broken]).unwrap();
        (sources, sensors, binding)
    }

    #[test]
    fn test_failed_slot_reads_invalid_without_blocking_the_other() {
        let (sources, sensors, binding) = fixture();
        let mut sink = RecordingSink::default();

        binding.refresh(&sensors, &sources, &mut sink);

        let primary = sink.readings[&(GaugeId::Speedometer, ReadoutSlot::Primary)];
        let secondary = sink.readings[&(GaugeId::Speedometer, ReadoutSlot::Secondary)];
        assert_eq!(primary, 12.6);
        assert!(secondary.is_nan());
    }

    #[test]
    fn test_single_binding_only_feeds_the_primary_slot() {
        let (sources, sensors, binding) = fixture();
        let single = GaugeBinding::single(GaugeId::Voltmeter, binding.sensors()[0]);
        let mut sink = RecordingSink::default();

        single.refresh(&sensors, &sources, &mut sink);

        assert_eq!(sink.readings.len(), 1);
        assert_eq!(
            sink.readings[&(GaugeId::Voltmeter, ReadoutSlot::Primary)],
            12.6
        );
    }

    #[test]
    fn test_refresh_overwrites_previous_readings() {
        let (sources, sensors, binding) = fixture();
        let mut sink = RecordingSink::default();

        binding.refresh(&sensors, &sources, &mut sink);
        binding.refresh(&sensors, &sources, &mut sink);

        // Latest-wins per slot, no accumulation.
        assert_eq!(sink.readings.len(), 2);
    }
}
