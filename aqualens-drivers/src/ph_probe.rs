//! Analog pH probe front-end
//!
//! Analog pH modules output a buffered electrode voltage; the probe
//! front-end converts platform ADC counts to volts. The counts-to-pH
//! mapping itself lives in the core engine, driven by calibration.

use aqualens_core::traits::PhProbe;

/// ADC channel abstraction for platform independence
/// (embedded-hal 1.0 defines no ADC trait).
pub trait AdcReader {
    /// Read one raw conversion.
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Errors from the analog front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhProbeError {
    /// ADC conversion failed.
    Adc,
}

/// Analog pH probe over a platform ADC channel.
pub struct AnalogPhProbe<ADC> {
    adc: ADC,
    /// ADC reference voltage in millivolts.
    vref_mv: u32,
    /// Full-scale ADC count (1023 for 10-bit, 4095 for 12-bit).
    full_scale: u16,
}

impl<ADC> AnalogPhProbe<ADC> {
    /// Create a new probe front-end.
    ///
    /// # Arguments
    /// - `adc`: ADC channel wired to the module's signal output
    /// - `vref_mv`: reference voltage in millivolts (5000 or 3300)
    /// - `full_scale`: the count corresponding to `vref_mv`
    pub fn new(adc: ADC, vref_mv: u32, full_scale: u16) -> Self {
        Self {
            adc,
            vref_mv,
            full_scale,
        }
    }
}

impl<ADC: AdcReader> PhProbe for AnalogPhProbe<ADC> {
    type Error = PhProbeError;

    fn read_voltage(&mut self) -> Result<f32, PhProbeError> {
        let counts = self.adc.read().map_err(|_| PhProbeError::Adc)?;
        let volts =
            f32::from(counts) * (self.vref_mv as f32 / 1000.0) / f32::from(self.full_scale);
        Ok(volts)
    }
}
