//! Resampling of multi-size products onto the raster grid of a reference band.
//!
//! Bands that are coarser than the reference are interpolated, finer bands are aggregated
//! and bands that are coarser along one axis and finer along the other are resampled in two passes.
//! The resampled images are lazy pyramids: pixels are only computed when a tile is read.

#![warn(clippy::unwrap_used)]

mod ancillary;
mod band;
mod error;
mod options;
mod product;
mod resampler;
mod strategy;
mod tiepointgrid;

pub type Result<T = ()> = std::result::Result<T, Error>;

pub use ancillary::AncillaryTransfer;
pub use ancillary::NoAncillaryTransfer;
pub use band::Band;
pub use band::BandSource;
pub use band::RasterProperties;
pub use band::SceneTransform;
pub use error::Error;
pub use options::ResamplingOptions;
pub use product::Product;
pub use resampler::can_be_applied;
pub use resampler::resample_product;
pub use resampler::resample_product_with;
pub use strategy::ResampleStrategy;
pub use strategy::ShrinkingAxis;
pub use strategy::intermediate_geometry;
pub use tiepointgrid::TiePointGrid;
pub use tiepointgrid::resample_tie_point_grid;

pub use geo::raster::algo::{AggregationMethod, InterpolationMethod};
