//! Age staging: matching a descriptor vector against the calibration artifacts.
//!
//! - `matcher`: nearest calibration point, age lookup, sigma heuristic
//! - `calibration`: table densification and artifact sanity checks

pub mod calibration;
pub mod matcher;

pub use calibration::*;
pub use matcher::*;
