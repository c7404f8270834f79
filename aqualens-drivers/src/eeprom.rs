//! 24Cxx-series I2C EEPROM as the calibration storage region
//!
//! Sequential reads cross page boundaries freely; writes must stay
//! within one page and be followed by the device's internal write
//! cycle before the next transaction.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use aqualens_core::traits::StorageRegion;

/// Largest page size handled (24C32/24C64 class parts).
pub const MAX_PAGE_SIZE: usize = 32;

/// Internal write cycle time in milliseconds (datasheet worst case).
const WRITE_CYCLE_MS: u32 = 5;

/// 24Cxx-style EEPROM with two-byte word addressing.
pub struct Eeprom24x<I, D> {
    i2c: I,
    delay: D,
    address: SevenBitAddress,
    page_size: usize,
}

impl<I: I2c, D: DelayNs> Eeprom24x<I, D> {
    /// Create a new EEPROM region.
    ///
    /// `page_size` is the device's write page in bytes and must not
    /// exceed [`MAX_PAGE_SIZE`]; larger values are clamped.
    pub fn new(i2c: I, delay: D, address: SevenBitAddress, page_size: usize) -> Self {
        Self {
            i2c,
            delay,
            address,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Release the underlying bus and delay.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}

impl<I: I2c, D: DelayNs> StorageRegion for Eeprom24x<I, D> {
    type Error = I::Error;

    fn read_block(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), I::Error> {
        let addr = (offset as u16).to_be_bytes();
        self.i2c.write_read(self.address, &addr, buf)
    }

    fn write_block(&mut self, offset: u32, data: &[u8]) -> Result<(), I::Error> {
        let mut offset = offset as usize;
        let mut remaining = data;

        while !remaining.is_empty() {
            let room = self.page_size - (offset % self.page_size);
            let chunk = remaining.len().min(room);

            let mut frame = [0u8; 2 + MAX_PAGE_SIZE];
            frame[..2].copy_from_slice(&(offset as u16).to_be_bytes());
            frame[2..2 + chunk].copy_from_slice(&remaining[..chunk]);
            self.i2c.write(self.address, &frame[..2 + chunk])?;
            self.delay.delay_ms(WRITE_CYCLE_MS);

            offset += chunk;
            remaining = &remaining[chunk..];
        }
        Ok(())
    }
}
