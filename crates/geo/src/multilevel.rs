//! Multi-resolution image pyramids.
//!
//! A [`MultiLevelImage`] exposes an image at several power-of-two resolution levels.
//! Level 0 is the full resolution image, level `n` is decimated by `2^n`.
//! The levels are created lazily by a level factory and memoized, so every level is constructed at most once.

use std::sync::Arc;

use crate::{ArrayNum, DenseArray, EPSILON, Error, GeoTransform, OnceSlot, PixelWindow, RasterSize, Result, TileSource, TiledImage};

/// Describes the levels of a pyramid: level `n` has scale `2^n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiLevelModel {
    level_count: usize,
    image_to_model: GeoTransform,
    size: RasterSize,
}

impl MultiLevelModel {
    pub fn new(level_count: usize, image_to_model: GeoTransform, size: RasterSize) -> Self {
        MultiLevelModel {
            level_count: level_count.max(1),
            image_to_model,
            size,
        }
    }

    /// Model with levels until the coarsest level fits in a single tile.
    pub fn for_tile_size(image_to_model: GeoTransform, size: RasterSize, tile_size: RasterSize) -> Self {
        let tile_dimension = tile_size.max_dimension().max(1);
        let mut level_count = 1;
        while size.decimated(level_count - 1).max_dimension() > tile_dimension {
            level_count += 1;
        }

        Self::new(level_count, image_to_model, size)
    }

    pub fn level_count(&self) -> usize {
        self.level_count
    }

    /// The full resolution size
    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn scale(&self, level: usize) -> f64 {
        (1u64 << level) as f64
    }

    pub fn level_size(&self, level: usize) -> RasterSize {
        self.size.decimated(level)
    }

    pub fn image_to_model(&self, level: usize) -> GeoTransform {
        if level == 0 {
            self.image_to_model
        } else {
            self.image_to_model.scaled(self.scale(level))
        }
    }

    pub fn model_to_image(&self, level: usize) -> Result<GeoTransform> {
        self.image_to_model(level).invert()
    }

    /// The coarsest level whose scale does not exceed the requested scale.
    pub fn level(&self, scale: f64) -> usize {
        let mut level = 0;
        while level + 1 < self.level_count && self.scale(level + 1) <= scale + EPSILON {
            level += 1;
        }

        level
    }

    /// The same model limited to `level_count` levels.
    pub fn with_level_count(&self, level_count: usize) -> Self {
        Self::new(level_count, self.image_to_model, self.size)
    }

    /// The same level structure with a different level 0 transform.
    pub fn with_image_to_model(&self, image_to_model: GeoTransform) -> Self {
        Self::new(self.level_count, image_to_model, self.size)
    }
}

/// Creates the image of a pyramid level.
pub type LevelFactory<T> = Arc<dyn Fn(usize) -> Result<TiledImage<T>> + Send + Sync>;

/// Lazily evaluated image pyramid.
///
/// Cloning is cheap: clones share the level cache, so levels computed through one clone are visible to all of them.
#[derive(Clone)]
pub struct MultiLevelImage<T: ArrayNum> {
    model: MultiLevelModel,
    levels: Arc<[OnceSlot<Arc<TiledImage<T>>>]>,
    factory: LevelFactory<T>,
}

impl<T: ArrayNum> MultiLevelImage<T> {
    pub fn new(model: MultiLevelModel, factory: LevelFactory<T>) -> Self {
        MultiLevelImage {
            model,
            levels: (0..model.level_count()).map(|_| OnceSlot::default()).collect(),
            factory,
        }
    }

    /// Pyramid on top of in memory data, the lower resolution levels are nearest neighbour decimations of level 0.
    pub fn from_array(array: DenseArray<T>, image_to_model: GeoTransform, tile_size: RasterSize) -> Self {
        let model = MultiLevelModel::for_tile_size(image_to_model, array.size(), tile_size);
        let full_resolution = Arc::new(TiledImage::from_array(array, tile_size));

        let parent = full_resolution.clone();
        let factory: LevelFactory<T> = Arc::new(move |level| {
            Ok(TiledImage::new(
                DecimatedSource {
                    parent: parent.clone(),
                    factor: 1 << level,
                    size: model.level_size(level),
                },
                tile_size,
            ))
        });

        MultiLevelImage {
            model,
            levels: (0..model.level_count())
                .map(|level| match level {
                    0 => OnceSlot::with_value(full_resolution.clone()),
                    _ => OnceSlot::default(),
                })
                .collect(),
            factory,
        }
    }

    pub fn model(&self) -> &MultiLevelModel {
        &self.model
    }

    pub fn size(&self) -> RasterSize {
        self.model.size()
    }

    pub fn level_count(&self) -> usize {
        self.model.level_count()
    }

    /// The image of the requested level, created on first access.
    pub fn image(&self, level: usize) -> Result<Arc<TiledImage<T>>> {
        let slot = self.levels.get(level).ok_or_else(|| {
            Error::InvalidArgument(format!("Level {level} out of range, the pyramid has {} levels", self.level_count()))
        })?;

        slot.get_or_try_init(|| {
            log::trace!("Create pyramid level {level} ({})", self.model.level_size(level));
            Ok(Arc::new((self.factory)(level)?))
        })
    }

    /// Reads the full resolution image.
    pub fn read(&self) -> Result<DenseArray<T>> {
        self.image(0)?.read()
    }

    /// Shares the level images of this pyramid under a different model.
    /// The model is limited to the number of levels this pyramid provides.
    pub fn with_model(&self, model: MultiLevelModel) -> Self {
        let model = if model.level_count() > self.levels.len() {
            model.with_level_count(self.levels.len())
        } else {
            model
        };

        MultiLevelImage {
            model,
            levels: self.levels.clone(),
            factory: self.factory.clone(),
        }
    }

    /// True if both pyramids share the same level images.
    pub fn shares_levels_with(&self, other: &MultiLevelImage<T>) -> bool {
        Arc::ptr_eq(&self.levels, &other.levels)
    }
}

impl<T: ArrayNum> std::fmt::Debug for MultiLevelImage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiLevelImage")
            .field("data_type", &T::TYPE)
            .field("model", &self.model)
            .finish()
    }
}

/// Nearest neighbour decimation of a parent image: pixel `(r, c)` takes the value at the center of its block.
struct DecimatedSource<T: ArrayNum> {
    parent: Arc<TiledImage<T>>,
    factor: usize,
    size: RasterSize,
}

impl<T: ArrayNum> DecimatedSource<T> {
    fn parent_index(&self, index: usize, parent_len: usize) -> usize {
        (index * self.factor + self.factor / 2).min(parent_len.saturating_sub(1))
    }
}

impl<T: ArrayNum> TileSource<T> for DecimatedSource<T> {
    fn size(&self) -> RasterSize {
        self.size
    }

    fn compute(&self, window: &PixelWindow) -> Result<DenseArray<T>> {
        let parent_size = self.parent.size();
        let first_row = self.parent_index(window.row, parent_size.rows);
        let last_row = self.parent_index(window.end_row() - 1, parent_size.rows);
        let first_col = self.parent_index(window.col, parent_size.cols);
        let last_col = self.parent_index(window.end_col() - 1, parent_size.cols);

        let parent = self.parent.read_window(&PixelWindow::new(
            first_row,
            first_col,
            last_row - first_row + 1,
            last_col - first_col + 1,
        ))?;

        Ok(DenseArray::from_fn(window.size(), |cell| {
            let row = self.parent_index(window.row + cell.row as usize, parent_size.rows) - first_row;
            let col = self.parent_index(window.col + cell.col as usize, parent_size.cols) - first_col;
            parent.value(row, col)
        }))
    }
}
