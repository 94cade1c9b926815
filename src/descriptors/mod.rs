//! Descriptor extraction: from a raw outline to the three-scalar shape signature.
//!
//! - `extractor`: resampling, normalization, three refinement rounds, descriptors
//! - `ribbon`: ruled surface between the final peak and valley polylines

pub mod extractor;
pub mod ribbon;

pub use extractor::*;
pub use ribbon::*;
