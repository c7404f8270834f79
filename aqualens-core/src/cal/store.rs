//! Validated non-volatile calibration store
//!
//! Persists one fixed-size record at a fixed offset of a
//! [`StorageRegion`]. Byte 0 is the record kind's marker; a mismatch
//! on load means uninitialised or foreign data and is recovered by
//! writing factory defaults back, so the region is never left
//! unwritten.

use core::marker::PhantomData;

use crate::cal::record::{StoredRecord, MAX_RECORD_BYTES};
use crate::traits::StorageRegion;

/// Errors from the calibration store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError<E> {
    /// Marker mismatch: the region holds no record of this kind.
    InvalidRecord,
    /// The underlying storage transport failed.
    Bus(E),
}

impl<E> From<E> for StoreError<E> {
    fn from(e: E) -> Self {
        StoreError::Bus(e)
    }
}

/// Load/save front for one record kind at one region offset.
pub struct CalStore<R, P> {
    region: P,
    offset: u32,
    _record: PhantomData<R>,
}

impl<R: StoredRecord, P: StorageRegion> CalStore<R, P> {
    pub fn new(region: P, offset: u32) -> Self {
        Self {
            region,
            offset,
            _record: PhantomData,
        }
    }

    /// Load the persisted record, failing on a marker mismatch.
    pub fn load(&mut self) -> Result<R, StoreError<P::Error>> {
        let mut buf = [0u8; MAX_RECORD_BYTES];
        let frame = &mut buf[..R::ENCODED_LEN];
        self.region.read_block(self.offset, frame)?;
        if frame[0] != R::MARKER {
            return Err(StoreError::InvalidRecord);
        }
        Ok(R::decode_payload(&frame[1..]))
    }

    /// Persist `record`, re-stamping the marker.
    pub fn save(&mut self, record: &R) -> Result<(), StoreError<P::Error>> {
        let mut buf = [0u8; MAX_RECORD_BYTES];
        let frame = &mut buf[..R::ENCODED_LEN];
        frame[0] = R::MARKER;
        record.encode_payload(&mut frame[1..]);
        self.region.write_block(self.offset, frame)?;
        Ok(())
    }

    /// Write the factory default back and return it.
    pub fn reset_to_defaults(&mut self) -> Result<R, StoreError<P::Error>> {
        let record = R::factory_default();
        self.save(&record)?;
        Ok(record)
    }

    /// Load, recovering a marker mismatch with factory defaults.
    ///
    /// This is the boot path: only a transport failure propagates.
    pub fn load_or_defaults(&mut self) -> Result<R, StoreError<P::Error>> {
        match self.load() {
            Ok(record) => Ok(record),
            Err(StoreError::InvalidRecord) => {
                #[cfg(feature = "defmt")]
                defmt::info!("no valid calibration record found, applying defaults");
                self.reset_to_defaults()
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cal::record::{ColorCalibration, PhCalibration};
    use core::convert::Infallible;

    /// In-memory storage region standing in for an EEPROM.
    struct MemRegion {
        bytes: [u8; 128],
    }

    impl MemRegion {
        fn blank() -> Self {
            Self { bytes: [0xFF; 128] }
        }
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

    #[test]
    fn save_then_load_round_trips() {
        let mut store: CalStore<PhCalibration, _> = CalStore::new(MemRegion::blank(), 0);

        let mut record = PhCalibration::factory_default();
        record.valid = true;
        record.record_point(0, 3.02);
        record.record_point(1, 2.51);
        record.record_point(2, 2.05);

        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), record);
    }

    #[test]
    fn blank_region_fails_validity_check() {
        let mut store: CalStore<PhCalibration, _> = CalStore::new(MemRegion::blank(), 0);
        assert_eq!(store.load(), Err(StoreError::InvalidRecord));
    }

    #[test]
    fn load_or_defaults_writes_the_fallback_back() {
        let mut store: CalStore<ColorCalibration, _> = CalStore::new(MemRegion::blank(), 0x10);

        let record = store.load_or_defaults().unwrap();
        assert_eq!(record, ColorCalibration::factory_default());
        assert!(!record.valid);

        // The defaults must now pass a plain load
        assert_eq!(store.load().unwrap(), record);
    }

    #[test]
    fn ph_record_does_not_read_as_colour() {
        let mut region = MemRegion::blank();

        let mut ph_store: CalStore<PhCalibration, _> = CalStore::new(&mut region, 0);
        ph_store.save(&PhCalibration::factory_default()).unwrap();

        let mut colour_store: CalStore<ColorCalibration, _> = CalStore::new(&mut region, 0);
        assert_eq!(colour_store.load(), Err(StoreError::InvalidRecord));
    }
}
