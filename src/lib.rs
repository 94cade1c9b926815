//! `limb-stager` library crate.
//!
//! The binary (`limbstage`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the staging pipeline is reusable from other front-ends or batch scripts
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod descriptors;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod staging;
