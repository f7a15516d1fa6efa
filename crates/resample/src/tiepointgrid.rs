use std::sync::Arc;

use geo::{EPSILON, GeoTransform, RasterSize};

use crate::{Error, RasterProperties, Result, SceneTransform};

/// Coarse lattice of values (e.g. latitudes, angles) over the pixel grid of a raster.
///
/// Tie point `(i, j)` is located at pixel position
/// `(offset_x + i * sub_sampling_x, offset_y + j * sub_sampling_y)` of the raster it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct TiePointGrid {
    name: String,
    grid_width: usize,
    grid_height: usize,
    offset_x: f64,
    offset_y: f64,
    sub_sampling_x: f64,
    sub_sampling_y: f64,
    tie_points: Arc<[f32]>,
    size: RasterSize,
    image_to_model: GeoTransform,
    scene_transform: SceneTransform,
    properties: RasterProperties,
}

impl TiePointGrid {
    /// `size` is the size of the pixel grid the tie points are spread over.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        grid_width: usize,
        grid_height: usize,
        offset: (f64, f64),
        sub_sampling: (f64, f64),
        tie_points: impl Into<Arc<[f32]>>,
        size: RasterSize,
        image_to_model: GeoTransform,
    ) -> Result<Self> {
        let name = name.into();
        let tie_points = tie_points.into();

        if !(sub_sampling.0 > 0.0 && sub_sampling.1 > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "Tie point grid '{name}' has an invalid sub sampling ({}, {})",
                sub_sampling.0, sub_sampling.1
            )));
        }

        if tie_points.len() != grid_width * grid_height {
            return Err(Error::InvalidArgument(format!(
                "Tie point grid '{name}' expects {} tie points, got {}",
                grid_width * grid_height,
                tie_points.len()
            )));
        }

        Ok(TiePointGrid {
            name,
            grid_width,
            grid_height,
            offset_x: offset.0,
            offset_y: offset.1,
            sub_sampling_x: sub_sampling.0,
            sub_sampling_y: sub_sampling.1,
            tie_points,
            size,
            image_to_model,
            scene_transform: SceneTransform::Identity,
            properties: RasterProperties::default(),
        })
    }

    pub fn with_scene_transform(mut self, scene_transform: SceneTransform) -> Self {
        self.scene_transform = scene_transform;
        self
    }

    pub fn with_properties(mut self, properties: RasterProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid_width(&self) -> usize {
        self.grid_width
    }

    pub fn grid_height(&self) -> usize {
        self.grid_height
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn sub_sampling(&self) -> (f64, f64) {
        (self.sub_sampling_x, self.sub_sampling_y)
    }

    pub fn tie_points(&self) -> &[f32] {
        &self.tie_points
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn image_to_model(&self) -> GeoTransform {
        self.image_to_model
    }

    pub fn scene_transform(&self) -> &SceneTransform {
        &self.scene_transform
    }

    pub fn properties(&self) -> &RasterProperties {
        &self.properties
    }

    /// True if both grids share the same tie point storage.
    pub fn shares_tie_points_with(&self, other: &TiePointGrid) -> bool {
        Arc::ptr_eq(&self.tie_points, &other.tie_points)
    }
}

/// Expresses the lattice of `grid` in the pixel grid of the reference raster.
///
/// Only the offset and the sub sampling are recomputed, the tie point values are shared with the source grid.
/// A grid that already lives in the reference pixel grid is returned as is.
///
/// The lattice keeps its orientation, a reference grid that is rotated or flipped relative to the grid is rejected.
pub fn resample_tie_point_grid(grid: &TiePointGrid, reference_transform: &GeoTransform, reference_size: RasterSize) -> Result<TiePointGrid> {
    let node = format!("tie point grid '{}'", grid.name);
    let grid_to_reference = grid
        .image_to_model
        .pixel_to_pixel(reference_transform)
        .map_err(|err| Error::for_node(&node, err))?;

    if grid_to_reference.is_identity(EPSILON) {
        return Ok(grid.clone());
    }

    if grid_to_reference.shear_x().abs() > EPSILON || grid_to_reference.shear_y().abs() > EPSILON {
        return Err(Error::InvalidArgument(format!("{node}: the reference pixel grid is rotated relative to the grid")));
    }

    if grid_to_reference.scale_x() <= 0.0 || grid_to_reference.scale_y() <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "{node}: the reference pixel grid runs in the opposite direction ({grid_to_reference:?})"
        )));
    }

    let offset = grid_to_reference.apply(grid.offset_x, grid.offset_y);

    Ok(TiePointGrid {
        offset_x: offset.x(),
        offset_y: offset.y(),
        sub_sampling_x: grid.sub_sampling_x * grid_to_reference.scale_x(),
        sub_sampling_y: grid.sub_sampling_y * grid_to_reference.scale_y(),
        size: reference_size,
        image_to_model: *reference_transform,
        scene_transform: SceneTransform::Identity,
        ..grid.clone()
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn grid(image_to_model: GeoTransform) -> Result<TiePointGrid> {
        TiePointGrid::new(
            "sun_zenith",
            3,
            2,
            (0.5, 0.5),
            (10.0, 10.0),
            vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0],
            RasterSize::with_rows_cols(20, 30),
            image_to_model,
        )
    }

    #[test]
    fn grid_in_reference_pixel_space_is_copied() -> Result<()> {
        let trans = GeoTransform::scale_translate(10.0, -10.0, 300000.0, 5000000.0);
        let source = grid(trans)?;
        let resampled = resample_tie_point_grid(&source, &trans, RasterSize::with_rows_cols(20, 30))?;

        assert_eq!(resampled, source);
        assert!(resampled.shares_tie_points_with(&source));
        Ok(())
    }

    #[test]
    fn grid_on_coarser_reference() -> Result<()> {
        let source = grid(GeoTransform::scale_translate(10.0, -10.0, 300000.0, 5000000.0))?;
        let reference = GeoTransform::scale_translate(20.0, -20.0, 300000.0, 5000000.0);
        let resampled = resample_tie_point_grid(&source, &reference, RasterSize::with_rows_cols(10, 15))?;

        assert_relative_eq!(resampled.offset().0, 0.25);
        assert_relative_eq!(resampled.offset().1, 0.25);
        assert_relative_eq!(resampled.sub_sampling().0, 5.0);
        assert_relative_eq!(resampled.sub_sampling().1, 5.0);
        assert_eq!(resampled.size(), RasterSize::with_rows_cols(10, 15));
        assert_eq!(resampled.image_to_model(), reference);
        assert_eq!(resampled.grid_width(), 3);
        assert_eq!(resampled.tie_points(), source.tie_points());
        assert!(resampled.shares_tie_points_with(&source));

        Ok(())
    }

    #[test]
    fn grid_with_shifted_origin() -> Result<()> {
        let source = grid(GeoTransform::scale_translate(10.0, -10.0, 300000.0, 5000000.0))?;
        let reference = GeoTransform::scale_translate(10.0, -10.0, 299990.0, 5000000.0);
        let resampled = resample_tie_point_grid(&source, &reference, RasterSize::with_rows_cols(20, 31))?;

        assert_relative_eq!(resampled.offset().0, 1.5);
        assert_relative_eq!(resampled.offset().1, 0.5);
        assert_relative_eq!(resampled.sub_sampling().0, 10.0);

        Ok(())
    }

    #[test]
    fn flipped_or_rotated_reference_is_rejected() -> Result<()> {
        let source = grid(GeoTransform::scale_translate(10.0, 10.0, 0.0, 0.0))?;

        let flipped = GeoTransform::scale_translate(20.0, -20.0, 0.0, 200.0);
        assert!(matches!(
            resample_tie_point_grid(&source, &flipped, RasterSize::square(10)),
            Err(Error::InvalidArgument(msg)) if msg.contains("sun_zenith")
        ));

        let rotated = GeoTransform::from_components(10.0, 5.0, 0.0, 10.0, 0.0, 0.0);
        assert!(matches!(
            resample_tie_point_grid(&source, &rotated, RasterSize::square(10)),
            Err(Error::InvalidArgument(_))
        ));

        Ok(())
    }

    #[test]
    fn invalid_grids() {
        let trans = GeoTransform::identity();
        let size = RasterSize::square(10);
        assert!(TiePointGrid::new("g", 2, 2, (0.0, 0.0), (0.0, 1.0), vec![0.0; 4], size, trans).is_err());
        assert!(TiePointGrid::new("g", 2, 2, (0.0, 0.0), (1.0, 1.0), vec![0.0; 3], size, trans).is_err());
    }

    #[test]
    fn singular_reference_transform() -> Result<()> {
        let source = grid(GeoTransform::identity())?;
        let singular = GeoTransform::from_components(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            resample_tie_point_grid(&source, &singular, RasterSize::square(10)),
            Err(Error::NonInvertibleTransform(_))
        ));

        Ok(())
    }
}
