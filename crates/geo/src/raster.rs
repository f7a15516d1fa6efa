//! Raster processing on top of the pyramid images.

pub mod algo;
