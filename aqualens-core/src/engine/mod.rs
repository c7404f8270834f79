//! Sensor engines
//!
//! One engine per sensor kind, tying together a raw sample source,
//! the calibration store, the guided calibration session, and the
//! conversion math. Engines are single-owner: the UI/menu layer
//! drives one engine per sensor from one thread, so no locking is
//! needed anywhere in this crate.

pub mod color;
pub mod ph;

pub use color::{ColorEngine, ColorMeasurement};
pub use ph::PhEngine;
