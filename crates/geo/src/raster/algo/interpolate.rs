use std::{fmt, str::FromStr, sync::Arc};

use crate::{
    ArrayNum, DenseArray, Error, GeoTransform, LevelFactory, MultiLevelImage, MultiLevelModel, PixelWindow, RasterSize, Result,
    TileSource, TiledImage, nodata::is_nodata_value,
};

use super::footprint::source_window;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationMethod {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "NearestNeighbour"))]
    Nearest,
    Bilinear,
}

impl InterpolationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            InterpolationMethod::Nearest => "NearestNeighbour",
            InterpolationMethod::Bilinear => "Bilinear",
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for InterpolationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NearestNeighbour" | "Nearest" => Ok(InterpolationMethod::Nearest),
            "Bilinear" => Ok(InterpolationMethod::Bilinear),
            _ => Err(Error::InvalidInterpolationMethod(s.to_string())),
        }
    }
}

/// Samples a source image at the centers of the target pixels.
struct Interpolator<T: ArrayNum> {
    target_to_source: GeoTransform,
    source_size: RasterSize,
    nodata: Option<T>,
    method: InterpolationMethod,
}

impl<T: ArrayNum> Interpolator<T> {
    fn fill(&self) -> T {
        self.nodata.unwrap_or(T::NODATA)
    }

    /// Computes the target window, `region` holds the source pixels of `region_window`.
    fn interpolate_window(&self, window: &PixelWindow, region: &DenseArray<T>, region_window: &PixelWindow) -> DenseArray<T> {
        DenseArray::from_fn(window.size(), |cell| {
            let row = window.row + cell.row as usize;
            let col = window.col + cell.col as usize;
            let pos = self.target_to_source.apply(col as f64 + 0.5, row as f64 + 0.5);
            self.sample(pos.x(), pos.y(), region, region_window).unwrap_or_else(|| self.fill())
        })
    }

    fn sample(&self, x: f64, y: f64, region: &DenseArray<T>, region_window: &PixelWindow) -> Option<T> {
        if !(x >= 0.0 && y >= 0.0 && x < self.source_size.cols as f64 && y < self.source_size.rows as f64) {
            return None;
        }

        let value_at = |row: usize, col: usize| {
            if row < region_window.row || col < region_window.col || row >= region_window.end_row() || col >= region_window.end_col() {
                return None;
            }

            let val = region.value(row - region_window.row, col - region_window.col);
            if is_nodata_value(val, self.nodata) { None } else { Some(val) }
        };

        match self.method {
            InterpolationMethod::Nearest => value_at(y.floor() as usize, x.floor() as usize),
            InterpolationMethod::Bilinear => {
                let x = x - 0.5;
                let y = y - 0.5;
                let x0 = x.floor();
                let y0 = y.floor();
                let fx = x - x0;
                let fy = y - y0;

                let max_col = self.source_size.cols as f64 - 1.0;
                let max_row = self.source_size.rows as f64 - 1.0;
                let col0 = x0.clamp(0.0, max_col) as usize;
                let col1 = (x0 + 1.0).clamp(0.0, max_col) as usize;
                let row0 = y0.clamp(0.0, max_row) as usize;
                let row1 = (y0 + 1.0).clamp(0.0, max_row) as usize;

                let neighbours = [
                    (row0, col0, (1.0 - fx) * (1.0 - fy)),
                    (row0, col1, fx * (1.0 - fy)),
                    (row1, col0, (1.0 - fx) * fy),
                    (row1, col1, fx * fy),
                ];

                let mut sum = 0.0;
                for (row, col, weight) in neighbours {
                    if weight > 0.0 {
                        sum += weight * value_at(row, col)?.to_f64_lossy();
                    }
                }

                T::from_f64_rounded(sum)
            }
        }
    }
}

/// Tile source of an interpolated pyramid level.
struct InterpolatedSource<T: ArrayNum> {
    source: Arc<TiledImage<T>>,
    size: RasterSize,
    interpolator: Interpolator<T>,
}

impl<T: ArrayNum> TileSource<T> for InterpolatedSource<T> {
    fn size(&self) -> RasterSize {
        self.size
    }

    fn compute(&self, window: &PixelWindow) -> Result<DenseArray<T>> {
        match source_window(&self.interpolator.target_to_source, window, self.source.size(), 1.0) {
            Some(region_window) => {
                let region = self.source.read_window(&region_window)?;
                Ok(self.interpolator.interpolate_window(window, &region, &region_window))
            }
            None => Ok(DenseArray::filled_with(self.interpolator.fill(), window.size())),
        }
    }
}

fn require_method(method: Option<InterpolationMethod>) -> Result<InterpolationMethod> {
    method.ok_or_else(|| Error::InvalidInterpolationMethod("no interpolation method was provided".to_string()))
}

/// Resamples `source` onto the target grid.
///
/// Every target pixel center is mapped to model space with `target_transform` and back into
/// the source raster with the inverse of `source_transform`.
/// Pixels that map outside of the source and pixels that depend on no-data are set to no-data.
pub fn interpolate<T: ArrayNum>(
    source: &DenseArray<T>,
    source_transform: &GeoTransform,
    target_transform: &GeoTransform,
    target_size: RasterSize,
    nodata: Option<T>,
    method: Option<InterpolationMethod>,
) -> Result<DenseArray<T>> {
    let interpolator = Interpolator {
        target_to_source: target_transform.pixel_to_pixel(source_transform)?,
        source_size: source.size(),
        nodata,
        method: require_method(method)?,
    };

    let window = PixelWindow::for_size(target_size);
    Ok(interpolator.interpolate_window(&window, source, &PixelWindow::for_size(source.size())))
}

/// Lazily interpolated pyramid with the geometry of `target_model`.
///
/// Level `n` of the result is computed from the coarsest source level that still has
/// a resolution at least as fine as the target level.
pub fn interpolated_image<T: ArrayNum>(
    source: &MultiLevelImage<T>,
    target_model: &MultiLevelModel,
    nodata: Option<T>,
    method: Option<InterpolationMethod>,
    tile_size: RasterSize,
) -> Result<MultiLevelImage<T>> {
    let method = require_method(method)?;
    // Fail early on a singular source transform instead of on the first tile read
    source.model().model_to_image(0)?;

    let source = source.clone();
    let target_model = *target_model;
    let factory: LevelFactory<T> = Arc::new(move |level| {
        let source_level = source.model().level(target_model.scale(level));
        let target_to_source = source
            .model()
            .model_to_image(source_level)?
            .concatenate(&target_model.image_to_model(level));

        let source_image = source.image(source_level)?;

        Ok(TiledImage::new(
            InterpolatedSource {
                size: target_model.level_size(level),
                interpolator: Interpolator {
                    target_to_source,
                    source_size: source_image.size(),
                    nodata,
                    method,
                },
                source: source_image,
            },
            tile_size,
        ))
    });

    Ok(MultiLevelImage::new(target_model, factory))
}


#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test_log::test]
    fn method_names() -> Result<()> {
        assert_eq!("NearestNeighbour".parse::<InterpolationMethod>()?, InterpolationMethod::Nearest);
        assert_eq!("Bilinear".parse::<InterpolationMethod>()?, InterpolationMethod::Bilinear);
        assert_eq!(InterpolationMethod::Nearest.to_string(), "NearestNeighbour");
        assert!(matches!(
            "Bicubic".parse::<InterpolationMethod>(),
            Err(Error::InvalidInterpolationMethod(_))
        ));

        Ok(())
    }

    #[test_log::test]
    fn bilinear_fractions() -> Result<()> {
        let source = DenseArray::new(RasterSize::with_rows_cols(1, 2), vec![0.0f64, 10.0])?;
        let result = interpolate(
            &source,
            &GeoTransform::scale_translate(2.0, 1.0, 0.0, 0.0),
            &GeoTransform::identity(),
            RasterSize::with_rows_cols(1, 4),
            None,
            Some(InterpolationMethod::Bilinear),
        )?;

        assert_relative_eq!(result.value(0, 1), 2.5);
        assert_relative_eq!(result.value(0, 2), 7.5);
        Ok(())
    }

    #[test_log::test]
    fn identity_grid_is_unchanged() -> Result<()> {
        let source = DenseArray::from_fn(RasterSize::with_rows_cols(3, 5), |cell| (cell.row * 5 + cell.col) as f32 * 0.5);
        let transform = GeoTransform::scale_translate(10.0, -10.0, 1000.0, 2000.0);

        for method in [InterpolationMethod::Nearest, InterpolationMethod::Bilinear] {
            let result = interpolate(&source, &transform, &transform, source.size(), None, Some(method))?;
            assert_eq!(result, source);
        }

        Ok(())
    }

    #[test_log::test]
    fn missing_method() {
        let source = DenseArray::filled_with(1u8, RasterSize::square(2));
        let pyramid = MultiLevelImage::from_array(source.clone(), GeoTransform::identity(), RasterSize::square(256));
        let model = MultiLevelModel::new(1, GeoTransform::identity(), RasterSize::square(2));

        assert!(matches!(
            interpolate(&source, &GeoTransform::identity(), &GeoTransform::identity(), RasterSize::square(2), None, None),
            Err(Error::InvalidInterpolationMethod(_))
        ));
        assert!(matches!(
            interpolated_image(&pyramid, &model, None, None, RasterSize::square(256)),
            Err(Error::InvalidInterpolationMethod(_))
        ));
    }

    #[test_log::test]
    fn singular_source_transform() {
        let source = DenseArray::filled_with(1u8, RasterSize::square(2));
        let singular = GeoTransform::from_components(1.0, 2.0, 2.0, 4.0, 0.0, 0.0);
        let pyramid = MultiLevelImage::from_array(source.clone(), singular, RasterSize::square(256));
        let model = MultiLevelModel::new(1, GeoTransform::identity(), RasterSize::square(4));

        assert!(matches!(
            interpolate(&source, &singular, &GeoTransform::identity(), RasterSize::square(4), None, Some(InterpolationMethod::Nearest)),
            Err(Error::NonInvertibleTransform(_))
        ));
        assert!(matches!(
            interpolated_image(&pyramid, &model, None, Some(InterpolationMethod::Nearest), RasterSize::square(256)),
            Err(Error::NonInvertibleTransform(_))
        ));
    }
}
