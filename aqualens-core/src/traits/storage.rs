//! Persistence port
//!
//! Calibration records are stored in a byte-addressable non-volatile
//! region (EEPROM, emulated flash page, ...). The engine only needs
//! block reads and writes at fixed offsets; wear characteristics and
//! bus details stay with the implementation.

/// Byte-addressable non-volatile storage region.
///
/// Writes are assumed atomic for the fixed record sizes used here;
/// platforms that truncate writes can corrupt a record (accepted
/// risk, records are marker-validated on load).
pub trait StorageRegion {
    type Error;

    /// Read `buf.len()` bytes starting at `offset`.
    fn read_block(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `data` starting at `offset`.
    fn write_block(&mut self, offset: u32, data: &[u8]) -> Result<(), Self::Error>;
}

impl<T: StorageRegion> StorageRegion for &mut T {
    type Error = T::Error;

    fn read_block(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        T::read_block(self, offset, buf)
    }

    fn write_block(&mut self, offset: u32, data: &[u8]) -> Result<(), Self::Error> {
        T::write_block(self, offset, data)
    }
}
