//! Calibration record types and their fixed byte layout
//!
//! Records are encoded little-endian at a fixed size so the store can
//! treat a write as a single atomic block. Byte 0 of every encoded
//! record is the kind marker; the payload starts with the `valid`
//! flag, then the captured points, then (colour only) the sensor
//! operating parameters.

use crate::sample::RawRgbc;

/// Marker byte for a persisted pH record.
pub const PH_MARKER: u8 = 0xA5;
/// Marker byte for a persisted colour record.
pub const COLOR_MARKER: u8 = 0xC7;

/// Scratch size covering the largest encoded record.
pub const MAX_RECORD_BYTES: usize = 32;

/// Reference pH values of the three standard buffer solutions (25 °C).
pub const PH_REFERENCES: [f32; 3] = [4.00, 6.86, 9.18];

/// Factory-default probe voltages for the three buffers.
///
/// Rough estimates for a typical analog pH module powered at 5 V;
/// usable until the operator performs a real buffer calibration.
pub const PH_DEFAULT_VOLTAGES: [f32; 3] = [3.05, 2.50, 2.00];

/// Factory-default integration time register value (154 ms).
pub const DEFAULT_ATIME: u8 = 0xC0;
/// Factory-default gain register value (4x).
pub const DEFAULT_GAIN: u8 = 0x01;

/// Raw channel count assumed at full white when uncalibrated
/// (~80% of 16-bit full scale at 4x gain).
const DEFAULT_WHITE_COUNT: u16 = 52_000;

/// A record kind the calibration store can persist.
pub trait StoredRecord: Clone {
    /// Marker byte distinguishing this kind in storage.
    const MARKER: u8;
    /// Total encoded size in bytes, marker included.
    const ENCODED_LEN: usize;

    /// Safe factory fallback, `valid = false`.
    fn factory_default() -> Self;

    /// Encode the payload into `out` (`ENCODED_LEN - 1` bytes).
    fn encode_payload(&self, out: &mut [u8]);

    /// Decode a payload of `ENCODED_LEN - 1` bytes.
    fn decode_payload(bytes: &[u8]) -> Self;
}

/// One (measured voltage, known buffer pH) pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationPoint {
    /// Volts measured while the probe sat in the buffer.
    pub voltage: f32,
    /// Known pH of the buffer.
    pub ph: f32,
}

/// Three-point pH calibration anchored to the standard buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhCalibration {
    /// True only when a completed calibration session produced this.
    pub valid: bool,
    /// pH 4.00 point.
    pub low: CalibrationPoint,
    /// pH 6.86 point.
    pub mid: CalibrationPoint,
    /// pH 9.18 point.
    pub high: CalibrationPoint,
}

impl PhCalibration {
    /// Record the measured voltage for calibration step `step`,
    /// pairing it with that step's fixed reference pH.
    pub fn record_point(&mut self, step: u8, voltage: f32) {
        let slot = match step {
            0 => &mut self.low,
            1 => &mut self.mid,
            2 => &mut self.high,
            _ => {
                debug_assert!(false, "pH calibration has three steps");
                return;
            }
        };
        *slot = CalibrationPoint {
            voltage,
            ph: PH_REFERENCES[step as usize],
        };
    }
}

impl StoredRecord for PhCalibration {
    const MARKER: u8 = PH_MARKER;
    // marker + valid + 3 points of two f32s
    const ENCODED_LEN: usize = 2 + 3 * 8;

    fn factory_default() -> Self {
        Self {
            valid: false,
            low: CalibrationPoint {
                voltage: PH_DEFAULT_VOLTAGES[0],
                ph: PH_REFERENCES[0],
            },
            mid: CalibrationPoint {
                voltage: PH_DEFAULT_VOLTAGES[1],
                ph: PH_REFERENCES[1],
            },
            high: CalibrationPoint {
                voltage: PH_DEFAULT_VOLTAGES[2],
                ph: PH_REFERENCES[2],
            },
        }
    }

    fn encode_payload(&self, out: &mut [u8]) {
        out[0] = self.valid as u8;
        let mut offset = 1;
        for point in [&self.low, &self.mid, &self.high] {
            out[offset..offset + 4].copy_from_slice(&point.voltage.to_le_bytes());
            out[offset + 4..offset + 8].copy_from_slice(&point.ph.to_le_bytes());
            offset += 8;
        }
    }

    fn decode_payload(bytes: &[u8]) -> Self {
        let point_at = |offset: usize| CalibrationPoint {
            voltage: f32_at(bytes, offset),
            ph: f32_at(bytes, offset + 4),
        };
        Self {
            valid: bytes[0] != 0,
            low: point_at(1),
            mid: point_at(9),
            high: point_at(17),
        }
    }
}

/// Two-point white/dark colour balance plus the sensor operating
/// point it was captured at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorCalibration {
    /// True only when a completed calibration session produced this.
    pub valid: bool,
    /// Reading over the white reference surface.
    pub white: RawRgbc,
    /// Reading with the sensor covered.
    pub dark: RawRgbc,
    /// Integration time register value in effect at capture.
    pub atime: u8,
    /// Gain register value in effect at capture.
    pub gain: u8,
}

impl ColorCalibration {
    /// Record the averaged raw sample for calibration step `step`
    /// (0 = dark reference, 1 = white reference).
    pub fn record_point(&mut self, step: u8, raw: RawRgbc) {
        match step {
            0 => self.dark = raw,
            1 => self.white = raw,
            _ => debug_assert!(false, "colour calibration has two steps"),
        }
    }
}

impl StoredRecord for ColorCalibration {
    const MARKER: u8 = COLOR_MARKER;
    // marker + valid + 2 points of four u16s + atime + gain
    const ENCODED_LEN: usize = 2 + 2 * 8 + 2;

    fn factory_default() -> Self {
        Self {
            valid: false,
            white: RawRgbc {
                r: DEFAULT_WHITE_COUNT,
                g: DEFAULT_WHITE_COUNT,
                b: DEFAULT_WHITE_COUNT,
                c: DEFAULT_WHITE_COUNT,
            },
            dark: RawRgbc::default(),
            atime: DEFAULT_ATIME,
            gain: DEFAULT_GAIN,
        }
    }

    fn encode_payload(&self, out: &mut [u8]) {
        out[0] = self.valid as u8;
        let mut offset = 1;
        for point in [&self.white, &self.dark] {
            for channel in [point.r, point.g, point.b, point.c] {
                out[offset..offset + 2].copy_from_slice(&channel.to_le_bytes());
                offset += 2;
            }
        }
        out[offset] = self.atime;
        out[offset + 1] = self.gain;
    }

    fn decode_payload(bytes: &[u8]) -> Self {
        let point_at = |offset: usize| RawRgbc {
            r: u16_at(bytes, offset),
            g: u16_at(bytes, offset + 2),
            b: u16_at(bytes, offset + 4),
            c: u16_at(bytes, offset + 6),
        };
        Self {
            valid: bytes[0] != 0,
            white: point_at(1),
            dark: point_at(9),
            atime: bytes[17],
            gain: bytes[18],
        }
    }
}

fn f32_at(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ph_payload_round_trip() {
        let mut record = PhCalibration::factory_default();
        record.valid = true;
        record.record_point(0, 3.11);
        record.record_point(1, 2.48);
        record.record_point(2, 1.97);

        let mut buf = [0u8; PhCalibration::ENCODED_LEN - 1];
        record.encode_payload(&mut buf);
        let decoded = PhCalibration::decode_payload(&buf);
        assert_eq!(decoded, record);
    }

    #[test]
    fn colour_payload_round_trip() {
        let mut record = ColorCalibration::factory_default();
        record.valid = true;
        record.record_point(
            0,
            RawRgbc {
                r: 12,
                g: 9,
                b: 14,
                c: 40,
            },
        );
        record.record_point(
            1,
            RawRgbc {
                r: 48_210,
                g: 50_002,
                b: 47_115,
                c: 61_003,
            },
        );
        record.atime = 0xF6;
        record.gain = 0x02;

        let mut buf = [0u8; ColorCalibration::ENCODED_LEN - 1];
        record.encode_payload(&mut buf);
        let decoded = ColorCalibration::decode_payload(&buf);
        assert_eq!(decoded, record);
    }

    #[test]
    fn ph_steps_map_to_reference_buffers() {
        let mut record = PhCalibration::factory_default();
        record.record_point(1, 2.52);
        assert!((record.mid.ph - 6.86).abs() < f32::EPSILON);
        assert!((record.mid.voltage - 2.52).abs() < f32::EPSILON);
    }

    #[test]
    fn defaults_are_not_valid() {
        assert!(!PhCalibration::factory_default().valid);
        assert!(!ColorCalibration::factory_default().valid);
    }

    #[test]
    fn markers_are_distinct() {
        assert_ne!(PhCalibration::MARKER, ColorCalibration::MARKER);
    }

    #[test]
    fn encoded_sizes_fit_scratch_buffer() {
        assert!(PhCalibration::ENCODED_LEN <= MAX_RECORD_BYTES);
        assert!(ColorCalibration::ENCODED_LEN <= MAX_RECORD_BYTES);
    }
}
