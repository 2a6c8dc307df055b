//! Unit conversion helpers
//!
//! The handful of conversions the GPS channels, thermistor curves and CAN
//! operation chains need.

/// Celsius to Fahrenheit.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Fahrenheit to Celsius.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Kilopascals to pounds per square inch.
pub fn kpa_to_psi(kpa: f64) -> f64 {
    kpa * 0.145_037_738
}

/// Meters per second to miles per hour.
pub fn mps_to_mph(mps: f64) -> f64 {
    mps * 2.236_936_292
}

/// Meters per second to kilometers per hour.
pub fn mps_to_kph(mps: f64) -> f64 {
    mps * 3.6
}

/// Meters to feet.
pub fn meters_to_feet(meters: f64) -> f64 {
    meters * 3.280_839_895
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_round_trip() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
        // -40 is the fixed point.
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn pressure_conversion() {
        assert!((kpa_to_psi(101.325) - 14.696).abs() < 0.01);
    }

    #[test]
    fn speed_conversions() {
        assert!((mps_to_kph(10.0) - 36.0).abs() < 1e-12);
        assert!((mps_to_mph(26.8224) - 60.0).abs() < 1e-6);
    }
}
