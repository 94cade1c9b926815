//! Input data sources other than digitized records.

pub mod synthetic;

pub use synthetic::*;
