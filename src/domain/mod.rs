//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the descriptor vector and staging prediction (`DescriptorVector`, `Prediction`)
//! - specimen naming conventions (`NameParser`, `NominalAge`, `Side`)
//! - calibration artifacts (`Calibration`, plus their JSON file forms)
//! - run configuration (`StageConfig`, `BatchConfig`)

pub mod types;

pub use types::*;
