//! Hardware front-end implementations
//!
//! This crate provides concrete implementations of the capability
//! traits defined in aqualens-core:
//!
//! - TCS34725 tristimulus colour sensor (I2C)
//! - Analog pH probe over a platform ADC channel
//! - 24Cxx-series I2C EEPROM as the calibration storage region

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod eeprom;
pub mod ph_probe;
pub mod tcs34725;
