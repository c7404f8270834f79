//! Conversion math
//!
//! Pure functions mapping raw transducer output to physical
//! quantities using the captured calibration points. No hardware, no
//! state; everything here is deterministic and host-testable.

pub mod color;
pub mod ph;

pub use color::{estimate_cct, estimate_lux, normalize};
pub use ph::{voltage_to_ph, InterpolationMode};
