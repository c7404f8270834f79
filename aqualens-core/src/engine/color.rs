//! Colour sensor engine
//!
//! Two-point white/dark balance over a tristimulus front-end, with
//! corrected RGB, CCT, and lux derived per read. The integration
//! time and gain operating point is part of the calibration record
//! and is re-applied to the hardware whenever the record is loaded.

use embedded_hal::delay::DelayNs;

use crate::cal::record::ColorCalibration;
use crate::cal::session::{step_label, CalError, CalSession, CalStep};
use crate::cal::store::{CalStore, StoreError};
use crate::convert::color::{estimate_cct, estimate_lux, normalize};
use crate::sample::{average_rgbc, RawRgbc, Rgb8};
use crate::traits::{RgbcSensor, StorageRegion};

/// Raw samples averaged per measurement.
pub const SAMPLE_COUNT: u32 = 5;
/// Settle time between samples in milliseconds.
pub const SAMPLE_DELAY_MS: u32 = 20;

const STEP_PROMPTS: [&str; 2] = ["Cover sensor (dark ref)", "Place on white surface"];

/// Errors surfaced by the colour engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<C, S> {
    /// Sensor front-end failed.
    Sensor(C),
    /// Persistence port failed.
    Storage(S),
    /// Persisted record failed its validity check.
    InvalidRecord,
    /// Calibration workflow misuse.
    Cal(CalError),
}

impl<C, S> From<CalError> for Error<C, S> {
    fn from(e: CalError) -> Self {
        Error::Cal(e)
    }
}

impl<C, S> From<StoreError<S>> for Error<C, S> {
    fn from(e: StoreError<S>) -> Self {
        match e {
            StoreError::InvalidRecord => Error::InvalidRecord,
            StoreError::Bus(bus) => Error::Storage(bus),
        }
    }
}

/// One full colour measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorMeasurement {
    /// Averaged raw channel counts.
    pub raw: RawRgbc,
    /// Calibration-corrected RGB.
    pub rgb: Rgb8,
    /// Estimated illuminance in lux.
    pub lux: f32,
    /// Estimated correlated colour temperature in Kelvin
    /// (0 = unknown).
    pub cct_kelvin: u16,
}

/// The colour measurement engine.
pub struct ColorEngine<C, S, D> {
    sensor: C,
    delay: D,
    store: CalStore<ColorCalibration, S>,
    cal: ColorCalibration,
    session: CalSession<ColorCalibration, 2>,
}

impl<C, S, D> ColorEngine<C, S, D>
where
    C: RgbcSensor,
    S: StorageRegion,
    D: DelayNs,
{
    /// Bring up the engine: load the persisted calibration (or write
    /// factory defaults back), then re-apply the stored integration
    /// time and gain to the sensor.
    ///
    /// The sensor is expected to be powered up and identity-checked
    /// by its driver before it is handed over.
    pub fn new(
        sensor: C,
        delay: D,
        region: S,
        offset: u32,
    ) -> Result<Self, Error<C::Error, S::Error>> {
        let mut store = CalStore::new(region, offset);
        let cal = store.load_or_defaults()?;
        let session = CalSession::new(&cal);
        let mut engine = Self {
            sensor,
            delay,
            store,
            cal,
            session,
        };
        engine
            .sensor
            .apply_settings(engine.cal.atime, engine.cal.gain)
            .map_err(Error::Sensor)?;
        Ok(engine)
    }

    /// Averaged raw RGBC counts.
    pub fn read_raw(&mut self) -> Result<RawRgbc, Error<C::Error, S::Error>> {
        average_rgbc(&mut self.sensor, &mut self.delay, SAMPLE_COUNT, SAMPLE_DELAY_MS)
            .map_err(Error::Sensor)
    }

    /// One full measurement: averaged raw counts plus the corrected
    /// RGB, lux, and CCT derived from them.
    pub fn read(&mut self) -> Result<ColorMeasurement, Error<C::Error, S::Error>> {
        let raw = self.read_raw()?;
        Ok(ColorMeasurement {
            raw,
            rgb: normalize(&raw, &self.cal),
            lux: estimate_lux(&raw),
            cct_kelvin: estimate_cct(&raw),
        })
    }

    /// Start (or restart) the dark/white calibration sequence.
    pub fn begin(&mut self) {
        self.session.begin(&self.cal);
        #[cfg(feature = "defmt")]
        defmt::info!("colour calibration started");
    }

    /// Capture the averaged raw sample for the current step and
    /// advance (dark reference first, then white).
    pub fn capture(&mut self) -> Result<CalStep, Error<C::Error, S::Error>> {
        let raw = self.read_raw()?;
        let _step = self
            .session
            .capture_with(|record, step| record.record_point(step, raw))?;
        #[cfg(feature = "defmt")]
        defmt::info!("colour point {} captured: {}", _step, raw);
        Ok(self.session.step())
    }

    /// Commit the completed calibration to storage and return to idle.
    pub fn save(&mut self) -> Result<(), Error<C::Error, S::Error>> {
        let mut record = *self.session.completed()?;
        record.valid = true;
        self.store.save(&record)?;
        self.cal = record;
        self.session.reset(&self.cal);
        #[cfg(feature = "defmt")]
        defmt::info!("colour calibration saved");
        Ok(())
    }

    /// Discard any in-progress capture and return to idle.
    pub fn cancel(&mut self) {
        self.session.reset(&self.cal);
        #[cfg(feature = "defmt")]
        defmt::info!("colour calibration cancelled");
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
    pub fn calibration(&self) -> &ColorCalibration {
        &self.cal
    }

    /// Change the integration time register value: applied to the
    /// hardware and persisted with the active record immediately.
    pub fn set_integration_time(&mut self, atime: u8) -> Result<(), Error<C::Error, S::Error>> {
        self.cal.atime = atime;
        self.sensor
            .apply_settings(self.cal.atime, self.cal.gain)
            .map_err(Error::Sensor)?;
        self.store.save(&self.cal)?;
        Ok(())
    }

    /// Change the gain register value: applied to the hardware and
    /// persisted with the active record immediately.
    pub fn set_gain(&mut self, gain: u8) -> Result<(), Error<C::Error, S::Error>> {
        self.cal.gain = gain;
        self.sensor
            .apply_settings(self.cal.atime, self.cal.gain)
            .map_err(Error::Sensor)?;
        self.store.save(&self.cal)?;
        Ok(())
    }

    pub fn integration_time(&self) -> u8 {
        self.cal.atime
    }

    pub fn gain(&self) -> u8 {
        self.cal.gain
    }
}
