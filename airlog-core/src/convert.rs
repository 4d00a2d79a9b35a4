//! MG-811 CO2 curve fit.
//!
//! The sensor hangs off an ADS1115 running with PGA 2/3 (±6.144 V full scale),
//! and its output passes through an on-board amplifier stage before the ADC, so
//! the measured voltage has to be divided back down before it is matched
//! against the datasheet curve. Constants follow the Sandbox Electronics
//! characterization of the module.

use crate::adc::AdcGain;

/// Full-scale voltage of the gain setting this station is wired for.
pub const FULL_SCALE_RANGE: f64 = AdcGain::TwoThirds.full_scale_voltage();

/// lg(400) = 2.602, the start point on the X axis of the curve.
const ZERO_POINT_X: f64 = 2.602;

/// Sensor output in volts at a CO2 concentration of 400 ppm.
const ZERO_POINT_VOLTAGE: f64 = 0.306;

/// Voltage drop when the sensor moves from clean air into 1000 ppm CO2.
const REACTION_VOLTAGE: f64 = 0.180;

/// Divider of the amplifier stage between the sensor and the ADC input.
/// A fixed property of this board's wiring, not derived from the ADC setup.
const AMPLIFIER_DIVIDER: f64 = 8.5;

/// One converted CO2 reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Co2Sample {
    /// Voltage at the ADC input in volts.
    pub voltage: f64,

    /// CO2 concentration in parts per million.
    pub ppm: f64,
}

/// Convert a raw ADS1115 conversion code into voltage and CO2 ppm.
///
/// Pure arithmetic. Negative codes (the ADC is two's-complement) are converted
/// as-is and may produce a non-physical ppm value; callers report what they
/// get rather than clamping.
pub fn convert_co2(raw_code: i16) -> Co2Sample {
    let voltage = raw_code as f64 * (FULL_SCALE_RANGE / 32768.0);

    let exponent = ((voltage / AMPLIFIER_DIVIDER) - ZERO_POINT_VOLTAGE)
        / (REACTION_VOLTAGE / (ZERO_POINT_X - 4.0))
        + ZERO_POINT_X;
    let ppm = libm::pow(10.0, exponent);

    Co2Sample { voltage, ppm }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn conversion_is_deterministic() {
        let a = convert_co2(8192);
        let b = convert_co2(8192);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_code_is_zero_volts() {
        let sample = convert_co2(0);
        assert_eq!(sample.voltage, 0.0);

        let expected = libm::pow(
            10.0,
            (0.0 - ZERO_POINT_VOLTAGE) / (REACTION_VOLTAGE / (ZERO_POINT_X - 4.0)) + ZERO_POINT_X,
        );
        assert!((sample.ppm - expected).abs() < TOLERANCE);
    }

    #[test]
    fn half_full_scale_voltage() {
        let sample = convert_co2(16384);
        assert!((sample.voltage - 3.072).abs() < TOLERANCE);
    }

    #[test]
    fn negative_codes_convert_without_clamping() {
        let sample = convert_co2(-100);
        assert!(sample.voltage < 0.0);
        // Still a finite curve value, just not a physical one.
        assert!(sample.ppm.is_finite());
    }
}
