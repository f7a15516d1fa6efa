use geo::{GeoTransform, RasterSize};

/// The axis that shrinks in a two pass resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShrinkingAxis {
    Width,
    Height,
}

/// How a band is brought onto the reference grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleStrategy {
    /// Same size as the reference or a virtual band: the pixels are reused
    Identity,
    /// No axis grows
    Aggregate,
    /// No axis shrinks
    Interpolate,
    /// One axis shrinks while the other grows: aggregate the shrinking axis, then interpolate
    AggregateThenInterpolate(ShrinkingAxis),
}

impl ResampleStrategy {
    /// Decides on the strategy by comparing the pixel counts per axis.
    pub fn select(source: RasterSize, reference: RasterSize, is_virtual: bool) -> Self {
        if source == reference || is_virtual {
            ResampleStrategy::Identity
        } else if reference.width() <= source.width() && reference.height() <= source.height() {
            ResampleStrategy::Aggregate
        } else if reference.width() >= source.width() && reference.height() >= source.height() {
            ResampleStrategy::Interpolate
        } else if reference.width() < source.width() {
            ResampleStrategy::AggregateThenInterpolate(ShrinkingAxis::Width)
        } else {
            ResampleStrategy::AggregateThenInterpolate(ShrinkingAxis::Height)
        }
    }

    /// True if the strategy reduces source pixels with an aggregation method.
    pub fn aggregates(&self) -> bool {
        matches!(self, ResampleStrategy::Aggregate | ResampleStrategy::AggregateThenInterpolate(_))
    }
}

impl std::fmt::Display for ResampleStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResampleStrategy::Identity => write!(f, "identity"),
            ResampleStrategy::Aggregate => write!(f, "aggregate"),
            ResampleStrategy::Interpolate => write!(f, "interpolate"),
            ResampleStrategy::AggregateThenInterpolate(ShrinkingAxis::Width) => write!(f, "aggregate width, interpolate height"),
            ResampleStrategy::AggregateThenInterpolate(ShrinkingAxis::Height) => write!(f, "aggregate height, interpolate width"),
        }
    }
}

/// Geometry of the intermediate raster of a two pass resampling.
///
/// The shrinking axis already has the reference pixel count and resolution,
/// the other axis keeps the source pixel count and resolution.
pub fn intermediate_geometry(
    axis: ShrinkingAxis,
    source_size: RasterSize,
    source_transform: &GeoTransform,
    reference_size: RasterSize,
    reference_transform: &GeoTransform,
) -> (RasterSize, GeoTransform) {
    let (src, rf) = (source_transform, reference_transform);

    match axis {
        ShrinkingAxis::Width => (
            RasterSize::with_rows_cols(source_size.rows, reference_size.cols),
            GeoTransform::from_components(rf.scale_x(), rf.shear_x(), src.shear_y(), src.scale_y(), rf.translate_x(), src.translate_y()),
        ),
        ShrinkingAxis::Height => (
            RasterSize::with_rows_cols(reference_size.rows, source_size.cols),
            GeoTransform::from_components(src.scale_x(), src.shear_x(), rf.shear_y(), rf.scale_y(), src.translate_x(), rf.translate_y()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(width: usize, height: usize) -> RasterSize {
        RasterSize::with_rows_cols(height, width)
    }

    #[test]
    fn strategy_selection() {
        let reference = size(100, 100);

        assert_eq!(ResampleStrategy::select(size(100, 100), reference, false), ResampleStrategy::Identity);
        assert_eq!(ResampleStrategy::select(size(50, 50), reference, true), ResampleStrategy::Identity);
        assert_eq!(ResampleStrategy::select(size(200, 200), reference, false), ResampleStrategy::Aggregate);
        assert_eq!(ResampleStrategy::select(size(100, 200), reference, false), ResampleStrategy::Aggregate);
        assert_eq!(ResampleStrategy::select(size(50, 50), reference, false), ResampleStrategy::Interpolate);
        assert_eq!(ResampleStrategy::select(size(100, 50), reference, false), ResampleStrategy::Interpolate);
        assert_eq!(
            ResampleStrategy::select(size(200, 50), reference, false),
            ResampleStrategy::AggregateThenInterpolate(ShrinkingAxis::Width)
        );
        assert_eq!(
            ResampleStrategy::select(size(50, 200), reference, false),
            ResampleStrategy::AggregateThenInterpolate(ShrinkingAxis::Height)
        );

        assert!(ResampleStrategy::Aggregate.aggregates());
        assert!(ResampleStrategy::AggregateThenInterpolate(ShrinkingAxis::Height).aggregates());
        assert!(!ResampleStrategy::Interpolate.aggregates());
        assert!(!ResampleStrategy::Identity.aggregates());
    }

    #[test]
    fn two_pass_intermediate() {
        let source = GeoTransform::scale_translate(5.0, -20.0, 0.0, 1000.0);
        let reference = GeoTransform::scale_translate(10.0, -10.0, 2.0, 1001.0);

        let (intermediate_size, intermediate_transform) =
            intermediate_geometry(ShrinkingAxis::Width, size(200, 50), &source, size(100, 100), &reference);
        assert_eq!(intermediate_size, size(100, 50));
        assert_eq!(intermediate_transform, GeoTransform::scale_translate(10.0, -20.0, 2.0, 1000.0));

        let (intermediate_size, intermediate_transform) =
            intermediate_geometry(ShrinkingAxis::Height, size(50, 200), &source, size(100, 100), &reference);
        assert_eq!(intermediate_size, size(50, 100));
        assert_eq!(intermediate_transform, GeoTransform::scale_translate(5.0, -10.0, 0.0, 1001.0));
    }
}
