//! Raw RGBC to corrected colour, CCT, and illuminance
//!
//! Normalization applies the stored two-point white/dark balance per
//! channel. CCT uses the manufacturer's XYZ transform followed by
//! McCamy's cubic approximation; lux uses the ams DN40 simplified
//! formula. Both derived metrics return 0 when the clear channel is 0
//! (sensor covered), as a "no estimate" sentinel.

use libm::fabsf;

use crate::cal::record::ColorCalibration;
use crate::sample::{RawRgbc, Rgb8};

/// Convert a raw RGBC reading into calibration-corrected 8-bit RGB.
///
/// Per channel: `(raw - dark) / (white - dark)`, clamped to `[0, 1]`
/// and scaled to `[0, 255]`. The denominator is floored at one raw
/// count so a degenerate record (white equal to dark) saturates
/// deterministically instead of dividing by zero.
pub fn normalize(raw: &RawRgbc, cal: &ColorCalibration) -> Rgb8 {
    Rgb8 {
        r: normalize_channel(raw.r, cal.dark.r, cal.white.r),
        g: normalize_channel(raw.g, cal.dark.g, cal.white.g),
        b: normalize_channel(raw.b, cal.dark.b, cal.white.b),
    }
}

fn normalize_channel(raw: u16, dark: u16, white: u16) -> u8 {
    let mut span = f32::from(white) - f32::from(dark);
    if fabsf(span) < 1.0 {
        span = 1.0;
    }
    let corrected = (f32::from(raw) - f32::from(dark)) / span;
    (corrected.clamp(0.0, 1.0) * 255.0) as u8
}

/// Estimate the correlated colour temperature in Kelvin.
///
/// The sensor channels are mapped to CIE XYZ with the
/// manufacturer-recommended coefficients, reduced to chromaticity,
/// then run through McCamy's approximation. Returns 0 when the clear
/// channel is 0 or the XYZ sum is degenerate.
pub fn estimate_cct(raw: &RawRgbc) -> u16 {
    if raw.c == 0 {
        return 0;
    }

    let (r, g, b) = (f32::from(raw.r), f32::from(raw.g), f32::from(raw.b));

    let x = -0.14282 * r + 1.54924 * g - 0.95641 * b;
    let y = -0.32466 * r + 1.57837 * g - 0.73191 * b;
    let z = -0.68202 * r + 0.77073 * g + 0.56332 * b;

    let sum = x + y + z;
    if fabsf(sum) < 1e-6 {
        return 0;
    }

    let xc = x / sum;
    let yc = y / sum;

    let n = (xc - 0.3320) / (0.1858 - yc);
    (449.0 * n * n * n + 3525.0 * n * n + 6823.3 * n + 5520.33) as u16
}

/// Estimate illuminance in lux using the ams simplified formula.
///
/// Negative results clamp to 0; returns 0 when the clear channel is 0.
pub fn estimate_lux(raw: &RawRgbc) -> f32 {
    if raw.c == 0 {
        return 0.0;
    }

    let lux = -0.32466 * f32::from(raw.r) + 1.57837 * f32::from(raw.g)
        - 0.73191 * f32::from(raw.b);
    if lux < 0.0 {
        0.0
    } else {
        lux
    }
}
