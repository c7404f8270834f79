//! Calibration data, persistence, and the guided workflow
//!
//! A calibration record is either **valid** (committed by a completed
//! calibration session) or a **factory default** (always well-formed,
//! never corresponds to a real physical calibration). Records are
//! persisted behind a one-byte marker unique per sensor kind so a
//! wrong or uninitialised storage region never misreads as valid.

pub mod record;
pub mod session;
pub mod store;

pub use record::{CalibrationPoint, ColorCalibration, PhCalibration, StoredRecord};
pub use session::{step_label, CalError, CalSession, CalStep};
pub use store::{CalStore, StoreError};
