//! Raw sample types and averaged acquisition
//!
//! Raw samples are transient: produced fresh per read, never
//! persisted. One stable reading is formed by averaging a fixed
//! number of consecutive raw samples with a settle delay between
//! them; the counts and delays are compile-time constants on the
//! engines, so the divisions below can never see a zero count.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;

use crate::traits::{PhProbe, RgbcSensor};

/// Raw 16-bit RGBC reading from the colour sensor ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawRgbc {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    /// Clear (unfiltered) channel.
    pub c: u16,
}

/// Calibration-corrected 8-bit RGB value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    /// Hex triplet for display, e.g. `#1A2B3C`.
    pub fn to_hex(&self) -> heapless::String<8> {
        let mut s = heapless::String::new();
        let _ = write!(s, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b);
        s
    }
}

/// Average `count` probe voltages, waiting `settle_ms` between reads.
pub fn average_voltage<P, D>(
    probe: &mut P,
    delay: &mut D,
    count: u32,
    settle_ms: u32,
) -> Result<f32, P::Error>
where
    P: PhProbe,
    D: DelayNs,
{
    debug_assert!(count > 0);
    let mut sum = 0.0f32;
    for _ in 0..count {
        sum += probe.read_voltage()?;
        delay.delay_ms(settle_ms);
    }
    Ok(sum / count as f32)
}

/// Average `count` RGBC samples per channel, waiting `settle_ms`
/// between reads. Channel sums are 32-bit, division truncates.
pub fn average_rgbc<S, D>(
    sensor: &mut S,
    delay: &mut D,
    count: u32,
    settle_ms: u32,
) -> Result<RawRgbc, S::Error>
where
    S: RgbcSensor,
    D: DelayNs,
{
    debug_assert!(count > 0);
    let (mut r, mut g, mut b, mut c) = (0u32, 0u32, 0u32, 0u32);
    for _ in 0..count {
        let sample = sensor.read_rgbc()?;
        r += u32::from(sample.r);
        g += u32::from(sample.g);
        b += u32::from(sample.b);
        c += u32::from(sample.c);
        delay.delay_ms(settle_ms);
    }
    Ok(RawRgbc {
        r: (r / count) as u16,
        g: (g / count) as u16,
        b: (b / count) as u16,
        c: (c / count) as u16,
    })
}
