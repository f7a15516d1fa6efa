//! Multi-size raster product resampling.
//!
//! [`geo`] provides the raster primitives and the lazy resampling engines,
//! [`resample`] brings all bands of a product onto the grid of a reference band.

pub use geo;
pub use resample;
