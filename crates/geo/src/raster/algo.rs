//! Algorithms that resample rasters onto a different pixel grid.

mod aggregate;
mod footprint;
mod interpolate;

pub use aggregate::{AggregationMethod, aggregate, aggregated_image};
pub use interpolate::{InterpolationMethod, interpolate, interpolated_image};
