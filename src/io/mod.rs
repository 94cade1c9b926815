//! Input/output helpers.
//!
//! - specimen record read/write and name parsing (`record`)
//! - calibration JSON read/write (`calibration`)
//! - result exports (JSON/CSV) (`export`)

pub mod calibration;
pub mod export;
pub mod record;

pub use calibration::*;
pub use export::*;
pub use record::*;
