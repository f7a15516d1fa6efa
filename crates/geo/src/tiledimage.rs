use std::sync::Arc;

use crate::{ArrayNum, DenseArray, OnceSlot, PixelWindow, RasterSize, Result};

pub const DEFAULT_TILE_SIZE: RasterSize = RasterSize::square(256);

/// Computes the pixels of an image on request.
///
/// Implementations must be a pure function of their immutable state so every tile can be computed
/// independently and concurrently.
pub trait TileSource<T: ArrayNum>: Send + Sync {
    /// Size of the complete image.
    fn size(&self) -> RasterSize;

    /// Computes the pixels of the requested window, the window is always contained in the image.
    fn compute(&self, window: &PixelWindow) -> Result<DenseArray<T>>;
}

/// Position of a tile in the tile grid of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub row: usize,
    pub col: usize,
}

impl TileIndex {
    pub const fn new(row: usize, col: usize) -> Self {
        TileIndex { row, col }
    }
}

enum ImageData<T: ArrayNum> {
    Memory(Arc<DenseArray<T>>),
    Computed {
        source: Box<dyn TileSource<T>>,
        tiles: Box<[OnceSlot<Arc<DenseArray<T>>>]>,
    },
}

/// Lazy, tile based image.
///
/// Computed images evaluate a tile the first time it is read and keep it in a tile arena.
/// Every tile is computed at most once, concurrent readers of a tile that is being computed wait for the result.
pub struct TiledImage<T: ArrayNum> {
    size: RasterSize,
    tile_size: RasterSize,
    data: ImageData<T>,
}

impl<T: ArrayNum> TiledImage<T> {
    pub fn new(source: impl TileSource<T> + 'static, tile_size: RasterSize) -> Self {
        let size = source.size();
        let tile_size = sanitize_tile_size(tile_size);
        let tile_count = size.rows.div_ceil(tile_size.rows) * size.cols.div_ceil(tile_size.cols);

        TiledImage {
            size,
            tile_size,
            data: ImageData::Computed {
                source: Box::new(source),
                tiles: (0..tile_count).map(|_| OnceSlot::default()).collect(),
            },
        }
    }

    /// Image backed by data that is already in memory, tiles are served as windows of the array.
    pub fn from_array(array: DenseArray<T>, tile_size: RasterSize) -> Self {
        TiledImage {
            size: array.size(),
            tile_size: sanitize_tile_size(tile_size),
            data: ImageData::Memory(Arc::new(array)),
        }
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn tile_size(&self) -> RasterSize {
        self.tile_size
    }

    /// Number of tile rows and columns
    pub fn tile_grid(&self) -> RasterSize {
        RasterSize::with_rows_cols(self.size.rows.div_ceil(self.tile_size.rows), self.size.cols.div_ceil(self.tile_size.cols))
    }

    /// The pixel region covered by a tile, edge tiles are cropped to the image size.
    pub fn tile_window(&self, index: TileIndex) -> PixelWindow {
        let row = index.row * self.tile_size.rows;
        let col = index.col * self.tile_size.cols;
        PixelWindow::new(row, col, self.tile_size.rows, self.tile_size.cols).intersection(&PixelWindow::for_size(self.size))
    }

    /// Number of tiles that have been computed so far, memory backed images report 0.
    pub fn computed_tile_count(&self) -> usize {
        match &self.data {
            ImageData::Memory(_) => 0,
            ImageData::Computed { tiles, .. } => tiles.iter().filter(|slot| slot.is_initialized()).count(),
        }
    }

    pub fn tile(&self, index: TileIndex) -> Result<Arc<DenseArray<T>>> {
        let grid = self.tile_grid();
        if index.row >= grid.rows || index.col >= grid.cols {
            return Err(crate::Error::InvalidArgument(format!(
                "Tile index ({}, {}) out of range for tile grid {grid}",
                index.row, index.col
            )));
        }

        let window = self.tile_window(index);
        match &self.data {
            ImageData::Memory(array) => Ok(Arc::new(array.window(&window)?)),
            ImageData::Computed { source, tiles } => tiles[index.row * grid.cols + index.col].get_or_try_init(|| {
                log::trace!("Compute tile ({}, {}) {window:?}", index.row, index.col);
                Ok(Arc::new(source.compute(&window)?))
            }),
        }
    }

    /// Reads an arbitrary region of the image, pulling the overlapping tiles.
    pub fn read_window(&self, window: &PixelWindow) -> Result<DenseArray<T>> {
        if !PixelWindow::for_size(self.size).contains(window) {
            return Err(crate::Error::InvalidArgument(format!(
                "Window {window:?} is outside of the image bounds {}",
                self.size
            )));
        }

        if let ImageData::Memory(array) = &self.data {
            return array.window(window);
        }

        if window.is_empty() {
            return DenseArray::new(window.size(), Vec::new());
        }

        let first_tile_row = window.row / self.tile_size.rows;
        let last_tile_row = (window.end_row() - 1) / self.tile_size.rows;
        let first_tile_col = window.col / self.tile_size.cols;
        let last_tile_col = (window.end_col() - 1) / self.tile_size.cols;

        let mut result = DenseArray::filled_with(T::NODATA, window.size());
        for (tile_row, tile_col) in itertools::iproduct!(first_tile_row..=last_tile_row, first_tile_col..=last_tile_col) {
            let index = TileIndex::new(tile_row, tile_col);
            let tile_window = self.tile_window(index);
            let overlap = tile_window.intersection(window);
            let tile = self.tile(index)?;

            let part = tile.window(&PixelWindow::new(
                overlap.row - tile_window.row,
                overlap.col - tile_window.col,
                overlap.rows,
                overlap.cols,
            ))?;
            result.paste(&part, overlap.row - window.row, overlap.col - window.col);
        }

        Ok(result)
    }

    /// Reads the complete image, computing all missing tiles.
    pub fn read(&self) -> Result<DenseArray<T>> {
        let array = match &self.data {
            ImageData::Memory(array) => array.as_ref().clone(),
            ImageData::Computed { .. } => {
                let grid = self.tile_grid();
                let indexes: Vec<TileIndex> = itertools::iproduct!(0..grid.rows, 0..grid.cols)
                    .map(|(row, col)| TileIndex::new(row, col))
                    .collect();

                let tiles = self.compute_tiles(&indexes)?;

                let mut result = DenseArray::filled_with(T::NODATA, self.size);
                for (index, tile) in indexes.iter().zip(tiles) {
                    let window = self.tile_window(*index);
                    result.paste(&tile, window.row, window.col);
                }
                result
            }
        };

        Ok(array)
    }

    #[cfg(feature = "rayon")]
    fn compute_tiles(&self, indexes: &[TileIndex]) -> Result<Vec<Arc<DenseArray<T>>>> {
        use rayon::prelude::*;
        indexes.par_iter().map(|index| self.tile(*index)).collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn compute_tiles(&self, indexes: &[TileIndex]) -> Result<Vec<Arc<DenseArray<T>>>> {
        indexes.iter().map(|index| self.tile(*index)).collect()
    }
}

impl<T: ArrayNum> std::fmt::Debug for TiledImage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.data {
            ImageData::Memory(_) => "memory",
            ImageData::Computed { .. } => "computed",
        };

        write!(f, "TiledImage<{}>({kind}, size: {}, tile size: {})", T::TYPE, self.size, self.tile_size)
    }
}

fn sanitize_tile_size(tile_size: RasterSize) -> RasterSize {
    RasterSize::with_rows_cols(tile_size.rows.max(1), tile_size.cols.max(1))
}
