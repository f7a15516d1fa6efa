#![warn(clippy::unwrap_used)]

pub type Result<T = ()> = std::result::Result<T, Error>;

mod anymultilevelimage;
mod arraydatatype;
mod arraynum;
mod cell;
mod densearray;
mod error;
mod geotransform;
mod multilevel;
mod nodata;
mod onceslot;
pub mod raster;
mod rastersize;
mod tiledimage;
mod window;

#[cfg(test)]
mod testutils;

#[doc(inline)]
pub use anymultilevelimage::AnyMultiLevelImage;
#[doc(inline)]
pub use arraydatatype::ArrayDataType;
#[doc(inline)]
pub use arraynum::ArrayNum;
pub use cell::Cell;
pub use cell::CellIterator;
#[doc(inline)]
pub use densearray::DenseArray;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use geotransform::EPSILON;
#[doc(inline)]
pub use geotransform::GeoTransform;
pub use multilevel::LevelFactory;
#[doc(inline)]
pub use multilevel::MultiLevelImage;
#[doc(inline)]
pub use multilevel::MultiLevelModel;
pub use nodata::Nodata;
pub use nodata::is_nodata_value;
pub use onceslot::OnceSlot;
#[doc(inline)]
pub use rastersize::RasterSize;
pub use tiledimage::DEFAULT_TILE_SIZE;
pub use tiledimage::TileIndex;
pub use tiledimage::TileSource;
#[doc(inline)]
pub use tiledimage::TiledImage;
pub use window::PixelWindow;

pub type Point<T = f64> = geo_types::Point<T>;
