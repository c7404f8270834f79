//! TCS34725 tristimulus colour sensor (I2C)
//!
//! Minimal blocking driver covering what the measurement engine
//! needs: identity check, power-up, integration time / gain control,
//! and RGBC reads gated on the ADC-valid flag.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use aqualens_core::sample::RawRgbc;
use aqualens_core::traits::RgbcSensor;

/// Fixed I2C address of the TCS34725.
pub const ADDRESS: SevenBitAddress = 0x29;

/// Command bit, ORed into every register address.
const COMMAND_BIT: u8 = 0x80;

const REG_ENABLE: u8 = 0x00;
const REG_ATIME: u8 = 0x01;
const REG_CONTROL: u8 = 0x0F;
const REG_ID: u8 = 0x12;
const REG_STATUS: u8 = 0x13;
/// Clear channel low byte; red/green/blue follow at 2-byte strides.
const REG_CDATAL: u8 = 0x14;
const REG_RDATAL: u8 = 0x16;
const REG_GDATAL: u8 = 0x18;
const REG_BDATAL: u8 = 0x1A;

const ENABLE_PON: u8 = 0x01;
const ENABLE_AEN: u8 = 0x02;
const STATUS_AVALID: u8 = 0x01;

const ID_TCS34725: u8 = 0x44;
const ID_TCS34727: u8 = 0x4D;

/// Integration time register values.
///
/// Integration time (ms) = (256 - ATIME) * 2.4 ms. Lower is faster
/// and less sensitive.
pub mod atime {
    /// 2.4 ms, 1 cycle, max count 1024.
    pub const MS_2_4: u8 = 0xFF;
    /// 24 ms, 10 cycles, max count 10240.
    pub const MS_24: u8 = 0xF6;
    /// 50 ms, 20 cycles, max count 20480.
    pub const MS_50: u8 = 0xEB;
    /// 101 ms, 42 cycles, max count 43008.
    pub const MS_101: u8 = 0xD5;
    /// 154 ms, 64 cycles, max count 65535.
    pub const MS_154: u8 = 0xC0;
    /// 700 ms, 256 cycles, max count 65535.
    pub const MS_700: u8 = 0x00;
}

/// Analog gain register values.
pub mod gain {
    pub const X1: u8 = 0x00;
    pub const X4: u8 = 0x01;
    pub const X16: u8 = 0x02;
    pub const X60: u8 = 0x03;
}

/// Poll interval and ceiling for the ADC-valid wait. With the slowest
/// integration time a conversion takes 700 ms, so 1 s covers it.
const AVALID_POLL_MS: u32 = 5;
const AVALID_POLL_LIMIT: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tcs34725Error<E> {
    /// Chip ID readback did not match a supported part. No physical
    /// measurement is possible; treat as fatal at init.
    NotDetected(u8),
    /// I2C transaction failed.
    I2c(E),
}

impl<E> From<E> for Tcs34725Error<E> {
    fn from(e: E) -> Self {
        Tcs34725Error::I2c(e)
    }
}

pub struct Tcs34725<I, D> {
    i2c: I,
    delay: D,
}

impl<I: I2c, D: DelayNs> Tcs34725<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self { i2c, delay }
    }

    /// Release the underlying bus and delay.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    /// Verify the chip ID, then power on and enable the ADC.
    ///
    /// Accepts the TCS34725 (0x44) and TCS34727 (0x4D) parts.
    pub fn init(&mut self) -> Result<(), Tcs34725Error<I::Error>> {
        let id = self.read_u8(REG_ID)?;
        if id != ID_TCS34725 && id != ID_TCS34727 {
            return Err(Tcs34725Error::NotDetected(id));
        }

        self.write_u8(REG_ENABLE, ENABLE_PON)?;
        // Oscillator warm-up (datasheet 3.5)
        self.delay.delay_ms(3);
        self.write_u8(REG_ENABLE, ENABLE_PON | ENABLE_AEN)?;
        Ok(())
    }

    fn write_u8(&mut self, reg: u8, value: u8) -> Result<(), I::Error> {
        self.i2c.write(ADDRESS, &[COMMAND_BIT | reg, value])
    }

    fn read_u8(&mut self, reg: u8) -> Result<u8, I::Error> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[COMMAND_BIT | reg], &mut buf)?;
        Ok(buf[0])
    }

    fn read_u16(&mut self, reg: u8) -> Result<u16, I::Error> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(ADDRESS, &[COMMAND_BIT | reg], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Wait for the ADC-valid flag with a bounded ceiling.
    ///
    /// On timeout the caller proceeds with whatever the data
    /// registers hold: a stale reading is preferred over blocking
    /// the instrument forever.
    fn wait_data_valid(&mut self) -> Result<(), I::Error> {
        for _ in 0..AVALID_POLL_LIMIT {
            if self.read_u8(REG_STATUS)? & STATUS_AVALID != 0 {
                return Ok(());
            }
            self.delay.delay_ms(AVALID_POLL_MS);
        }
        #[cfg(feature = "defmt")]
        defmt::warn!("tcs34725: timeout waiting for ADC data");
        Ok(())
    }
}

impl<I: I2c, D: DelayNs> RgbcSensor for Tcs34725<I, D> {
    type Error = Tcs34725Error<I::Error>;

    fn read_rgbc(&mut self) -> Result<RawRgbc, Self::Error> {
        self.wait_data_valid()?;
        Ok(RawRgbc {
            c: self.read_u16(REG_CDATAL)?,
            r: self.read_u16(REG_RDATAL)?,
            g: self.read_u16(REG_GDATAL)?,
            b: self.read_u16(REG_BDATAL)?,
        })
    }

    fn apply_settings(&mut self, atime: u8, gain: u8) -> Result<(), Self::Error> {
        self.write_u8(REG_ATIME, atime)?;
        self.write_u8(REG_CONTROL, gain)?;
        Ok(())
    }
}
