//! Voltage-to-pH interpolation with Nernst temperature compensation
//!
//! Two interchangeable strategies over the three calibration points:
//! a quadratic Lagrange polynomial through all of them (smooth, the
//! default) or two linear segments joined at the mid point. Both pass
//! exactly through their knots. A degenerate calibration (points too
//! close in voltage) never divides by a near-zero denominator: the
//! Lagrange path falls back to piecewise, and a collapsed segment
//! returns its shared pH.

use libm::fabsf;

use crate::cal::record::PhCalibration;

/// Interpolation strategy for voltage-to-pH conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationMode {
    /// Quadratic through all three points (smoother).
    #[default]
    Lagrange,
    /// Two straight-line segments joined at the mid point.
    Piecewise,
}

/// Pairwise voltage-difference products below this magnitude mark a
/// degenerate calibration.
const DEGENERATE_EPS: f32 = 1e-6;

/// Convert a raw probe voltage to pH using `cal` and `mode`, then
/// apply Nernst temperature compensation for `temp_c` (°C).
///
/// Compensation scales the deviation from the mid-point pH by the
/// ratio of the actual to the 25 °C Nernst slope; a reading exactly
/// at the mid voltage is therefore temperature-invariant. The result
/// is clamped to the physical range `[0, 14]`; values outside it
/// indicate a faulty calibration, not a new reading.
pub fn voltage_to_ph(
    cal: &PhCalibration,
    voltage: f32,
    temp_c: f32,
    mode: InterpolationMode,
) -> f32 {
    let raw = match mode {
        InterpolationMode::Lagrange => lagrange(cal, voltage),
        InterpolationMode::Piecewise => piecewise(cal, voltage),
    };

    // tempFactor is 1.0 at 25 °C
    let temp_factor = (temp_c + 273.15) / 298.15;
    let ph = cal.mid.ph + (raw - cal.mid.ph) / temp_factor;

    ph.clamp(0.0, 14.0)
}

/// Quadratic Lagrange interpolation through all three points.
///
///   pH = pLow  * (V-vMid)(V-vHigh) / (vLow-vMid)(vLow-vHigh)
///      + pMid  * (V-vLow)(V-vHigh) / (vMid-vLow)(vMid-vHigh)
///      + pHigh * (V-vLow)(V-vMid)  / (vHigh-vLow)(vHigh-vMid)
fn lagrange(cal: &PhCalibration, voltage: f32) -> f32 {
    let (v_low, v_mid, v_high) = (cal.low.voltage, cal.mid.voltage, cal.high.voltage);

    let d0 = (v_low - v_mid) * (v_low - v_high);
    let d1 = (v_mid - v_low) * (v_mid - v_high);
    let d2 = (v_high - v_low) * (v_high - v_mid);

    if fabsf(d0) < DEGENERATE_EPS || fabsf(d1) < DEGENERATE_EPS || fabsf(d2) < DEGENERATE_EPS {
        return piecewise(cal, voltage);
    }

    cal.low.ph * ((voltage - v_mid) * (voltage - v_high)) / d0
        + cal.mid.ph * ((voltage - v_low) * (voltage - v_high)) / d1
        + cal.high.ph * ((voltage - v_low) * (voltage - v_mid)) / d2
}

/// Piecewise-linear interpolation: one line per pair of adjacent
/// points, segment chosen by `voltage >= v_mid`.
///
/// Probe voltage falls as pH rises, so voltages at or above the mid
/// point lie on the low-pH side: `voltage >= v_mid` selects the
/// low/mid segment, the rest the mid/high segment.
fn piecewise(cal: &PhCalibration, voltage: f32) -> f32 {
    let (v_low, v_mid, v_high) = (cal.low.voltage, cal.mid.voltage, cal.high.voltage);
    let (p_low, p_mid, p_high) = (cal.low.ph, cal.mid.ph, cal.high.ph);

    if v_mid == v_low && v_high == v_mid {
        return p_mid;
    }

    if voltage >= v_mid {
        if v_low == v_mid {
            return p_mid;
        }
        let t = (voltage - v_mid) / (v_low - v_mid);
        p_mid + t * (p_low - p_mid)
    } else {
        if v_high == v_mid {
            return p_mid;
        }
        let t = (voltage - v_mid) / (v_high - v_mid);
        p_mid + t * (p_high - p_mid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cal::record::{CalibrationPoint, StoredRecord};
    use proptest::prelude::*;

    fn standard_cal() -> PhCalibration {
        // pH 4.00 @ 3.05 V, 6.86 @ 2.50 V, 9.18 @ 2.00 V
        PhCalibration::factory_default()
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn passes_through_all_knots_in_both_modes() {
        let cal = standard_cal();
        for mode in [InterpolationMode::Lagrange, InterpolationMode::Piecewise] {
            for point in [&cal.low, &cal.mid, &cal.high] {
                assert_close(voltage_to_ph(&cal, point.voltage, 25.0, mode), point.ph);
            }
        }
    }

    #[test]
    fn worked_example_at_mid_voltage() {
        let cal = standard_cal();
        assert_close(
            voltage_to_ph(&cal, 2.50, 25.0, InterpolationMode::Lagrange),
            6.86,
        );
        assert_close(
            voltage_to_ph(&cal, 2.50, 25.0, InterpolationMode::Piecewise),
            6.86,
        );
    }

    #[test]
    fn mid_voltage_is_temperature_invariant() {
        let cal = standard_cal();
        for temp in [5.0, 25.0, 40.0, 60.0] {
            assert_close(
                voltage_to_ph(&cal, 2.50, temp, InterpolationMode::Lagrange),
                6.86,
            );
        }
    }

    #[test]
    fn temperature_compensation_shrinks_deviation_when_warm() {
        let cal = standard_cal();
        let at_25 = voltage_to_ph(&cal, 2.10, 25.0, InterpolationMode::Piecewise);
        let at_50 = voltage_to_ph(&cal, 2.10, 50.0, InterpolationMode::Piecewise);
        assert!(at_25 > cal.mid.ph);
        assert!(at_50 > cal.mid.ph);
        assert!(at_50 < at_25);
    }

    #[test]
    fn collapsed_calibration_falls_back_to_mid() {
        let point = CalibrationPoint {
            voltage: 2.5,
            ph: 6.86,
        };
        let cal = PhCalibration {
            valid: true,
            low: CalibrationPoint { ph: 4.0, ..point },
            mid: point,
            high: CalibrationPoint { ph: 9.18, ..point },
        };
        // All three voltages equal: Lagrange must fall back to
        // piecewise, and both must return the mid pH without dividing
        for mode in [InterpolationMode::Lagrange, InterpolationMode::Piecewise] {
            let ph = voltage_to_ph(&cal, 2.5, 25.0, mode);
            assert_close(ph, 6.86);
            let ph = voltage_to_ph(&cal, 1.0, 25.0, mode);
            assert_close(ph, 6.86);
        }
    }

    #[test]
    fn voltages_between_knots_interpolate_on_the_bracketing_segment() {
        let cal = standard_cal();
        // Halfway between the low (3.05 V) and mid (2.50 V) knots
        assert_close(
            voltage_to_ph(&cal, 2.775, 25.0, InterpolationMode::Piecewise),
            (4.00 + 6.86) / 2.0,
        );
        // Halfway between the mid (2.50 V) and high (2.00 V) knots
        assert_close(
            voltage_to_ph(&cal, 2.25, 25.0, InterpolationMode::Piecewise),
            (6.86 + 9.18) / 2.0,
        );
    }

    #[test]
    fn collapsed_segment_returns_shared_ph() {
        // Mid/high knots at the same voltage; a reading below the mid
        // voltage must not divide by the zero-width segment
        let mut cal = standard_cal();
        cal.high.voltage = cal.mid.voltage;
        let ph = voltage_to_ph(&cal, 1.5, 25.0, InterpolationMode::Piecewise);
        assert_close(ph, cal.mid.ph);

        // Same for the low/mid pair and a reading above the mid voltage
        let mut cal = standard_cal();
        cal.low.voltage = cal.mid.voltage;
        let ph = voltage_to_ph(&cal, 3.0, 25.0, InterpolationMode::Piecewise);
        assert_close(ph, cal.mid.ph);
    }

    #[test]
    fn far_out_of_range_voltages_clamp() {
        let cal = standard_cal();
        assert_close(
            voltage_to_ph(&cal, -50.0, 25.0, InterpolationMode::Lagrange),
            0.0,
        );
        assert_close(
            voltage_to_ph(&cal, 0.0, 25.0, InterpolationMode::Piecewise),
            14.0,
        );
    }

    proptest! {
        #[test]
        fn always_within_physical_range(
            voltage in -100.0f32..100.0,
            temp_c in -10.0f32..80.0,
        ) {
            let cal = standard_cal();
            for mode in [InterpolationMode::Lagrange, InterpolationMode::Piecewise] {
                let ph = voltage_to_ph(&cal, voltage, temp_c, mode);
                prop_assert!((0.0..=14.0).contains(&ph), "pH {} out of range", ph);
            }
        }
    }
}
