//! Board-agnostic calibration and conversion engine for the Aqualens
//! water analyzer
//!
//! This crate contains all measurement logic that does not depend on
//! specific hardware implementations:
//!
//! - Capability traits (raw sample sources, persistence port)
//! - Validated calibration records and their non-volatile store
//! - The generic step-wise calibration state machine
//! - Conversion math (voltage to pH, raw RGBC to corrected colour)
//! - The two sensor engine instantiations (pH, colour)
//!
//! Hardware front-ends implementing the traits live in
//! `aqualens-drivers`; tests inject in-memory fakes instead.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod cal;
pub mod convert;
pub mod engine;
pub mod sample;
pub mod traits;
