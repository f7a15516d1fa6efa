use geo::RasterSize;

use crate::{Band, TiePointGrid};

/// A set of bands and tie point grids that describe the same scene.
#[derive(Debug, Clone)]
pub struct Product {
    name: String,
    product_type: String,
    size: RasterSize,
    bands: Vec<Band>,
    tie_point_grids: Vec<TiePointGrid>,
}

impl Product {
    pub fn new(name: impl Into<String>, product_type: impl Into<String>, size: RasterSize) -> Self {
        Product {
            name: name.into(),
            product_type: product_type.into(),
            size,
            bands: Vec::new(),
            tie_point_grids: Vec::new(),
        }
    }

    pub fn with_band(mut self, band: Band) -> Self {
        self.add_band(band);
        self
    }

    pub fn with_tie_point_grid(mut self, grid: TiePointGrid) -> Self {
        self.add_tie_point_grid(grid);
        self
    }

    pub fn add_band(&mut self, band: Band) {
        self.bands.push(band);
    }

    pub fn add_tie_point_grid(&mut self, grid: TiePointGrid) {
        self.tie_point_grids.push(grid);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    /// The scene raster size
    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band(&self, name: &str) -> Option<&Band> {
        self.bands.iter().find(|band| band.name() == name)
    }

    pub fn tie_point_grids(&self) -> &[TiePointGrid] {
        &self.tie_point_grids
    }

    pub fn tie_point_grid(&self, name: &str) -> Option<&TiePointGrid> {
        self.tie_point_grids.iter().find(|grid| grid.name() == name)
    }

    /// True if the bands and tie point grids do not all have the same raster size.
    pub fn is_multi_size(&self) -> bool {
        let mut sizes = self
            .bands
            .iter()
            .map(Band::size)
            .chain(self.tie_point_grids.iter().map(TiePointGrid::size));

        match sizes.next() {
            Some(first) => sizes.any(|size| size != first),
            None => false,
        }
    }

    /// The name of the first band or tie point grid that is not in scene coordinates.
    pub fn first_non_identity_scene_node(&self) -> Option<&str> {
        self.bands
            .iter()
            .find(|band| !band.scene_transform().is_identity())
            .map(Band::name)
            .or_else(|| {
                self.tie_point_grids
                    .iter()
                    .find(|grid| !grid.scene_transform().is_identity())
                    .map(TiePointGrid::name)
            })
    }

    /// A product can only be resampled if all its rasters have an identity model to scene transform.
    pub fn can_be_resampled(&self) -> bool {
        self.first_non_identity_scene_node().is_none()
    }
}
