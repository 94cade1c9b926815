//! Numerical building blocks: least squares, spline resampling, extrema picking,
//! circle and parabola fits, and small planar geometry helpers.

pub mod circle;
pub mod extrema;
pub mod geometry;
pub mod ols;
pub mod parabola;
pub mod spline;

pub use circle::*;
pub use extrema::*;
pub use geometry::*;
pub use ols::*;
pub use parabola::*;
pub use spline::*;
