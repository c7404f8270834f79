//! pH sensor engine
//!
//! Three-point buffer calibration (pH 4.00 / 6.86 / 9.18) over an
//! analog probe front-end, with selectable interpolation strategy
//! and Nernst temperature compensation at read time.

use embedded_hal::delay::DelayNs;

use crate::cal::record::PhCalibration;
use crate::cal::session::{step_label, CalError, CalSession, CalStep};
use crate::cal::store::{CalStore, StoreError};
use crate::convert::ph::{voltage_to_ph, InterpolationMode};
use crate::sample::average_voltage;
use crate::traits::{PhProbe, StorageRegion};

/// ADC samples averaged per voltage reading.
pub const SAMPLE_COUNT: u32 = 10;
/// Settle time between samples in milliseconds.
pub const SAMPLE_DELAY_MS: u32 = 10;

const STEP_PROMPTS: [&str; 3] = [
    "Put probe in pH 4.00",
    "Put probe in pH 6.86",
    "Put probe in pH 9.18",
];

/// Errors surfaced by the pH engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<P, S> {
    /// Probe front-end failed.
    Probe(P),
    /// Persistence port failed.
    Storage(S),
    /// Persisted record failed its validity check.
    ///
    /// Not produced by the boot path (which recovers with defaults);
    /// kept so store errors map losslessly.
    InvalidRecord,
    /// Calibration workflow misuse.
    Cal(CalError),
}

impl<P, S> From<CalError> for Error<P, S> {
    fn from(e: CalError) -> Self {
        Error::Cal(e)
    }
}

impl<P, S> From<StoreError<S>> for Error<P, S> {
    fn from(e: StoreError<S>) -> Self {
        match e {
            StoreError::InvalidRecord => Error::InvalidRecord,
            StoreError::Bus(bus) => Error::Storage(bus),
        }
    }
}

/// The pH measurement engine.
pub struct PhEngine<P, S, D> {
    probe: P,
    delay: D,
    store: CalStore<PhCalibration, S>,
    cal: PhCalibration,
    session: CalSession<PhCalibration, 3>,
    mode: InterpolationMode,
}

impl<P, S, D> PhEngine<P, S, D>
where
    P: PhProbe,
    S: StorageRegion,
    D: DelayNs,
{
    /// Bring up the engine: load the persisted calibration, or fall
    /// back to factory defaults (which are written back so the region
    /// is never left unwritten).
    pub fn new(
        probe: P,
        delay: D,
        region: S,
        offset: u32,
    ) -> Result<Self, Error<P::Error, S::Error>> {
        let mut store = CalStore::new(region, offset);
        let cal = store.load_or_defaults()?;
        let session = CalSession::new(&cal);
        Ok(Self {
            probe,
            delay,
            store,
            cal,
            session,
            mode: InterpolationMode::default(),
        })
    }

    /// Averaged raw probe voltage in volts.
    pub fn read_voltage(&mut self) -> Result<f32, Error<P::Error, S::Error>> {
        average_voltage(&mut self.probe, &mut self.delay, SAMPLE_COUNT, SAMPLE_DELAY_MS)
            .map_err(Error::Probe)
    }

    /// Read the probe and convert to pH at `temp_c` (°C) using the
    /// active calibration and interpolation mode.
    pub fn read(&mut self, temp_c: f32) -> Result<f32, Error<P::Error, S::Error>> {
        let voltage = self.read_voltage()?;
        Ok(voltage_to_ph(&self.cal, voltage, temp_c, self.mode))
    }

    /// Start (or restart) the three-point calibration sequence.
    pub fn begin(&mut self) {
        self.session.begin(&self.cal);
        #[cfg(feature = "defmt")]
        defmt::info!("pH calibration started");
    }

    /// Capture the averaged voltage for the current step and advance.
    pub fn capture(&mut self) -> Result<CalStep, Error<P::Error, S::Error>> {
        let voltage = self.read_voltage()?;
        let _step = self
            .session
            .capture_with(|record, step| record.record_point(step, voltage))?;
        #[cfg(feature = "defmt")]
        defmt::info!("pH point {} captured at {} V", _step, voltage);
        Ok(self.session.step())
    }

    /// Commit the completed calibration to storage and return to idle.
    ///
    /// Fails with [`CalError::Incomplete`] (and performs no write)
    /// unless all three points were captured.
    pub fn save(&mut self) -> Result<(), Error<P::Error, S::Error>> {
        let mut record = *self.session.completed()?;
        record.valid = true;
        self.store.save(&record)?;
        self.cal = record;
        self.session.reset(&self.cal);
        #[cfg(feature = "defmt")]
        defmt::info!("pH calibration saved");
        Ok(())
    }

    /// Discard any in-progress capture and return to idle; the
    /// persisted calibration stays in effect.
    pub fn cancel(&mut self) {
        self.session.reset(&self.cal);
        #[cfg(feature = "defmt")]
        defmt::info!("pH calibration cancelled");
    }

    /// Current calibration step.
    pub fn step(&self) -> CalStep {
        self.session.step()
    }

    /// Prompt for the current step, for the menu/display layer.
    pub fn step_label(&self) -> &'static str {
        step_label(self.session.step(), &STEP_PROMPTS)
    }

    /// The active (persisted) calibration record.
    pub fn calibration(&self) -> &PhCalibration {
        &self.cal
    }

    pub fn set_interpolation_mode(&mut self, mode: InterpolationMode) {
        self.mode = mode;
    }

    pub fn interpolation_mode(&self) -> InterpolationMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cal::record::StoredRecord;
    use core::convert::Infallible;

    struct NoopDelay;

    impl DelayNs for NoopDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Probe that replays a fixed voltage per averaged reading.
    struct FixedProbe(f32);

    impl PhProbe for FixedProbe {
        type Error = Infallible;

        fn read_voltage(&mut self) -> Result<f32, Infallible> {
            Ok(self.0)
        }
    }

    struct MemRegion {
        bytes: [u8; 64],
    }

    impl StorageRegion for MemRegion {
        type Error = Infallible;

        fn read_block(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Infallible> {
            let offset = offset as usize;
            buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
            Ok(())
        }

        fn write_block(&mut self, offset: u32, data: &[u8]) -> Result<(), Infallible> {
            let offset = offset as usize;
            self.bytes[offset..offset + data.len()].copy_from_slice(data);
            Ok(())
        }
    }

    fn engine(voltage: f32) -> PhEngine<FixedProbe, MemRegion, NoopDelay> {
        let region = MemRegion { bytes: [0xFF; 64] };
        PhEngine::new(FixedProbe(voltage), NoopDelay, region, 0).unwrap()
    }

    #[test]
    fn boot_recovers_blank_region_with_defaults() {
        let engine = engine(2.5);
        assert_eq!(*engine.calibration(), PhCalibration::factory_default());
        assert!(!engine.calibration().valid);
        assert_eq!(engine.step(), CalStep::Idle);
    }

    #[test]
    fn read_uses_active_calibration() {
        let mut engine = engine(2.5);
        let ph = engine.read(25.0).unwrap();
        assert!((ph - 6.86).abs() < 1e-3);
    }

    #[test]
    fn save_before_done_is_rejected_without_write() {
        let mut engine = engine(2.5);
        engine.begin();
        engine.capture().unwrap();
        engine.capture().unwrap();

        assert!(matches!(
            engine.save(),
            Err(Error::Cal(CalError::Incomplete))
        ));
        // Active record untouched, still the factory default
        assert!(!engine.calibration().valid);
    }

    #[test]
    fn capture_when_idle_is_out_of_sequence() {
        let mut engine = engine(2.5);
        assert!(matches!(
            engine.capture(),
            Err(Error::Cal(CalError::OutOfSequence))
        ));
    }

    #[test]
    fn step_labels_follow_the_sequence() {
        let mut engine = engine(2.5);
        assert_eq!(engine.step_label(), "Idle");
        engine.begin();
        assert_eq!(engine.step_label(), "Put probe in pH 4.00");
        engine.capture().unwrap();
        assert_eq!(engine.step_label(), "Put probe in pH 6.86");
        engine.capture().unwrap();
        assert_eq!(engine.step_label(), "Put probe in pH 9.18");
        engine.capture().unwrap();
        assert_eq!(engine.step_label(), "Press SELECT to save");
    }

    #[test]
    fn interpolation_mode_is_switchable() {
        let mut engine = engine(2.5);
        assert_eq!(engine.interpolation_mode(), InterpolationMode::Lagrange);
        engine.set_interpolation_mode(InterpolationMode::Piecewise);
        assert_eq!(engine.interpolation_mode(), InterpolationMode::Piecewise);
    }
}
