//! Capability traits
//!
//! These traits define the interface between the engine logic and
//! hardware-specific implementations: raw sample sources per sensor
//! kind, and the byte-region persistence port.

pub mod sample;
pub mod storage;

pub use sample::{PhProbe, RgbcSensor};
pub use storage::StorageRegion;
