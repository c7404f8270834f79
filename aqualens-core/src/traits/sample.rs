//! Raw sample source traits
//!
//! One trait per sensor front-end. A single call produces one raw
//! sample; averaging over several samples is done by the engine
//! (see [`crate::sample`]).

use crate::sample::RawRgbc;

/// Analog pH probe front-end.
pub trait PhProbe {
    type Error;

    /// Read one raw probe voltage in volts.
    fn read_voltage(&mut self) -> Result<f32, Self::Error>;
}

/// Tristimulus colour sensor front-end.
pub trait RgbcSensor {
    type Error;

    /// Read one raw RGBC sample.
    ///
    /// Implementations with a data-ready flag should poll it with a
    /// bounded wait before reading, and proceed with a stale sample
    /// on timeout rather than blocking forever.
    fn read_rgbc(&mut self) -> Result<RawRgbc, Self::Error>;

    /// Apply integration time and gain register values to the hardware.
    ///
    /// Called on engine start-up to restore the persisted operating
    /// point, and whenever the operator changes either setting.
    fn apply_settings(&mut self, atime: u8, gain: u8) -> Result<(), Self::Error>;
}
