use std::{cmp::Ordering, fmt, str::FromStr, sync::Arc};

use crate::{
    ArrayNum, DenseArray, Error, GeoTransform, LevelFactory, MultiLevelImage, MultiLevelModel, PixelWindow, RasterSize, Result,
    TileSource, TiledImage, nodata::is_nodata_value,
};

use super::footprint::{Footprint, source_window};

/// Reduction applied to the source pixels covered by a target pixel.
///
/// `First`, `Min`, `Max`, `Mean` and `Median` are meant for measurements,
/// the `Flag*` methods treat the pixel values as bit masks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AggregationMethod {
    #[default]
    First,
    Min,
    Max,
    Mean,
    Median,
    FlagAnd,
    FlagOr,
    FlagMedianAnd,
    FlagMedianOr,
}

impl AggregationMethod {
    pub const NUMERIC: [AggregationMethod; 5] = [
        AggregationMethod::First,
        AggregationMethod::Min,
        AggregationMethod::Max,
        AggregationMethod::Mean,
        AggregationMethod::Median,
    ];

    pub const FLAG: [AggregationMethod; 5] = [
        AggregationMethod::First,
        AggregationMethod::FlagAnd,
        AggregationMethod::FlagOr,
        AggregationMethod::FlagMedianAnd,
        AggregationMethod::FlagMedianOr,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AggregationMethod::First => "First",
            AggregationMethod::Min => "Min",
            AggregationMethod::Max => "Max",
            AggregationMethod::Mean => "Mean",
            AggregationMethod::Median => "Median",
            AggregationMethod::FlagAnd => "FlagAnd",
            AggregationMethod::FlagOr => "FlagOr",
            AggregationMethod::FlagMedianAnd => "FlagMedianAnd",
            AggregationMethod::FlagMedianOr => "FlagMedianOr",
        }
    }

    /// True for the bitwise methods, `First` is valid for both flag and measurement bands.
    pub fn is_flag_method(&self) -> bool {
        matches!(
            self,
            AggregationMethod::FlagAnd | AggregationMethod::FlagOr | AggregationMethod::FlagMedianAnd | AggregationMethod::FlagMedianOr
        )
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AggregationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::NUMERIC
            .iter()
            .chain(Self::FLAG.iter())
            .find(|method| method.name() == s)
            .copied()
            .ok_or_else(|| Error::InvalidAggregationMethod(s.to_string()))
    }
}

/// Reduces the valid samples of a window, `None` when there are no samples.
/// The samples hold the value and the fraction of the source pixel covered by the target pixel.
fn reduce<T: ArrayNum>(method: AggregationMethod, samples: &mut [(T, f64)]) -> Option<T> {
    let (first, _) = *samples.first()?;

    match method {
        AggregationMethod::First => Some(first),
        AggregationMethod::Min => Some(samples.iter().fold(first, |acc, &(v, _)| if v < acc { v } else { acc })),
        AggregationMethod::Max => Some(samples.iter().fold(first, |acc, &(v, _)| if v > acc { v } else { acc })),
        AggregationMethod::Mean => {
            let (sum, weight) = samples
                .iter()
                .fold((0.0, 0.0), |(sum, weight), &(v, w)| (sum + v.to_f64_lossy() * w, weight + w));
            T::from_f64_rounded(sum / weight)
        }
        AggregationMethod::Median => {
            samples.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
            let mid = samples.len() / 2;
            if samples.len() % 2 == 1 {
                Some(samples[mid].0)
            } else {
                T::from_f64_rounded((samples[mid - 1].0.to_f64_lossy() + samples[mid].0.to_f64_lossy()) / 2.0)
            }
        }
        AggregationMethod::FlagAnd => Some(T::from_bits(samples.iter().fold(u64::MAX, |acc, (v, _)| acc & v.to_bits()))),
        AggregationMethod::FlagOr => Some(T::from_bits(samples.iter().fold(0, |acc, (v, _)| acc | v.to_bits()))),
        AggregationMethod::FlagMedianAnd => Some(T::from_bits(bit_vote(samples, |count, valid| 2 * count > valid))),
        AggregationMethod::FlagMedianOr => Some(T::from_bits(bit_vote(samples, |count, valid| 2 * count >= valid))),
    }
}

/// Sets every bit for which `keep(samples with the bit set, sample count)` holds.
fn bit_vote<T: ArrayNum>(samples: &[(T, f64)], keep: impl Fn(usize, usize) -> bool) -> u64 {
    (0..T::TYPE.bits())
        .filter(|bit| {
            let mask = 1u64 << bit;
            let count = samples.iter().filter(|(v, _)| v.to_bits() & mask != 0).count();
            keep(count, samples.len())
        })
        .fold(0, |acc, bit| acc | (1u64 << bit))
}

/// Overlap of the pixel `[index, index + 1)` with `[start, end)`.
fn coverage(index: usize, start: f64, end: f64) -> f64 {
    let index = index as f64;
    (end.min(index + 1.0) - start.max(index)).max(0.0)
}

struct Aggregator<T: ArrayNum> {
    target_to_source: GeoTransform,
    source_size: RasterSize,
    nodata: Option<T>,
    method: AggregationMethod,
}

impl<T: ArrayNum> Aggregator<T> {
    fn fill(&self) -> T {
        self.nodata.unwrap_or(T::NODATA)
    }

    fn aggregate_window(&self, window: &PixelWindow, region: &DenseArray<T>, region_window: &PixelWindow) -> DenseArray<T> {
        let mut samples = Vec::new();

        DenseArray::from_fn(window.size(), |cell| {
            let row = window.row + cell.row as usize;
            let col = window.col + cell.col as usize;

            samples.clear();
            self.collect_samples(row, col, region, region_window, &mut samples);
            reduce(self.method, &mut samples).unwrap_or_else(|| self.fill())
        })
    }

    /// The valid source pixels covered by the target pixel in row major order.
    fn collect_samples(&self, row: usize, col: usize, region: &DenseArray<T>, region_window: &PixelWindow, samples: &mut Vec<(T, f64)>) {
        let footprint = Footprint::of_pixel(&self.target_to_source, row, col).clipped(self.source_size);
        if footprint.is_empty() {
            return;
        }

        let Some(covered) = footprint
            .pixel_window(self.source_size, 0.0)
            .map(|w| w.intersection(region_window))
        else {
            return;
        };

        for src_row in covered.row..covered.end_row() {
            let wy = coverage(src_row, footprint.y0, footprint.y1);
            for src_col in covered.col..covered.end_col() {
                let weight = wy * coverage(src_col, footprint.x0, footprint.x1);
                let val = region.value(src_row - region_window.row, src_col - region_window.col);
                if weight > 0.0 && !is_nodata_value(val, self.nodata) {
                    samples.push((val, weight));
                }
            }
        }
    }
}

struct AggregatedSource<T: ArrayNum> {
    source: Arc<TiledImage<T>>,
    size: RasterSize,
    aggregator: Aggregator<T>,
}

impl<T: ArrayNum> TileSource<T> for AggregatedSource<T> {
    fn size(&self) -> RasterSize {
        self.size
    }

    fn compute(&self, window: &PixelWindow) -> Result<DenseArray<T>> {
        match source_window(&self.aggregator.target_to_source, window, self.source.size(), 0.0) {
            Some(region_window) => {
                let region = self.source.read_window(&region_window)?;
                Ok(self.aggregator.aggregate_window(window, &region, &region_window))
            }
            None => Ok(DenseArray::filled_with(self.aggregator.fill(), window.size())),
        }
    }
}

fn require_method(method: Option<AggregationMethod>) -> Result<AggregationMethod> {
    method.ok_or_else(|| Error::InvalidAggregationMethod("no aggregation method was provided".to_string()))
}

/// Downsamples `source` onto the target grid.
///
/// Every target pixel covers a rectangle of source pixels, the valid pixels in that rectangle
/// are reduced with `method`. Windows without valid pixels result in no-data.
pub fn aggregate<T: ArrayNum>(
    source: &DenseArray<T>,
    source_transform: &GeoTransform,
    target_transform: &GeoTransform,
    target_size: RasterSize,
    nodata: Option<T>,
    method: Option<AggregationMethod>,
) -> Result<DenseArray<T>> {
    let aggregator = Aggregator {
        target_to_source: target_transform.pixel_to_pixel(source_transform)?,
        source_size: source.size(),
        nodata,
        method: require_method(method)?,
    };

    let window = PixelWindow::for_size(target_size);
    Ok(aggregator.aggregate_window(&window, source, &PixelWindow::for_size(source.size())))
}

/// Lazily aggregated pyramid with the geometry of `target_model`.
pub fn aggregated_image<T: ArrayNum>(
    source: &MultiLevelImage<T>,
    target_model: &MultiLevelModel,
    nodata: Option<T>,
    method: Option<AggregationMethod>,
    tile_size: RasterSize,
) -> Result<MultiLevelImage<T>> {
    let method = require_method(method)?;
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
            AggregatedSource {
                size: target_model.level_size(level),
                aggregator: Aggregator {
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
#[generic_tests::define]
mod generictests {
    use super::*;
    use crate::testutils::{NOD, create_vec, number_cast};

    fn array<T: ArrayNum>(rows: usize, cols: usize, data: &[f64]) -> DenseArray<T> {
        DenseArray::new(RasterSize::with_rows_cols(rows, cols), create_vec(data)).unwrap()
    }

    fn halve<T: ArrayNum>(source: &DenseArray<T>, nodata: Option<T>, method: AggregationMethod) -> Result<DenseArray<T>> {
        let size = RasterSize::with_rows_cols(source.rows().div_ceil(2), source.columns().div_ceil(2));
        aggregate(
            source,
            &GeoTransform::identity(),
            &GeoTransform::scale_translate(2.0, 2.0, 0.0, 0.0),
            size,
            nodata,
            Some(method),
        )
    }

    #[test]
    fn numeric_methods<T: ArrayNum>() -> Result<()> {
        #[rustfmt::skip]
        let source = array::<T>(2, 4, &[
            4.0, 2.0,  1.0, 9.0,
            6.0, 8.0,  5.0, 9.0,
        ]);

        assert_eq!(halve(&source, None, AggregationMethod::First)?, array(1, 2, &[4.0, 1.0]));
        assert_eq!(halve(&source, None, AggregationMethod::Min)?, array(1, 2, &[2.0, 1.0]));
        assert_eq!(halve(&source, None, AggregationMethod::Max)?, array(1, 2, &[8.0, 9.0]));
        assert_eq!(halve(&source, None, AggregationMethod::Mean)?, array(1, 2, &[5.0, 6.0]));
        assert_eq!(halve(&source, None, AggregationMethod::Median)?, array(1, 2, &[5.0, 7.0]));

        Ok(())
    }

    #[test]
    fn nodata_is_excluded<T: ArrayNum>() -> Result<()> {
        let nod = number_cast::<T>(NOD);
        #[rustfmt::skip]
        let source = DenseArray::new(RasterSize::with_rows_cols(2, 4), vec![
            nod,                      number_cast::<T>(3.0), nod, nod,
            number_cast::<T>(5.0),    nod,                   nod, nod,
        ])?;

        let first = halve(&source, Some(nod), AggregationMethod::First)?;
        assert_eq!(first.as_slice(), &[number_cast::<T>(3.0), nod]);

        let mean = halve(&source, Some(nod), AggregationMethod::Mean)?;
        assert_eq!(mean.as_slice(), &[number_cast::<T>(4.0), nod]);

        Ok(())
    }

    #[test]
    fn partial_windows_at_the_edge<T: ArrayNum>() -> Result<()> {
        #[rustfmt::skip]
        let source = array::<T>(3, 3, &[
            1.0, 1.0, 7.0,
            1.0, 1.0, 9.0,
            2.0, 4.0, 3.0,
        ]);

        let result = halve(&source, None, AggregationMethod::Max)?;
        assert_eq!(result, array(2, 2, &[1.0, 9.0, 4.0, 3.0]));
        Ok(())
    }

    #[test]
    fn tiled_result_matches_array_result<T: ArrayNum>() -> Result<()> {
        let source = DenseArray::from_fn(RasterSize::square(20), |cell| number_cast::<T>(((cell.row * 7 + cell.col * 3) % 50) as f64));
        let source_transform = GeoTransform::scale_translate(1.0, -1.0, 10.0, 40.0);
        let target_transform = GeoTransform::scale_translate(4.0, -4.0, 10.0, 40.0);
        let target_size = RasterSize::square(5);

        let pyramid = MultiLevelImage::from_array(source.clone(), source_transform, RasterSize::square(8));
        let target_model = MultiLevelModel::new(1, target_transform, target_size);

        for method in [AggregationMethod::First, AggregationMethod::Max, AggregationMethod::Median, AggregationMethod::FlagOr] {
            let expected = aggregate(&source, &source_transform, &target_transform, target_size, None, Some(method))?;
            let image = aggregated_image(&pyramid, &target_model, None, Some(method), RasterSize::square(2))?;
            assert_eq!(image.read()?, expected);
        }

        Ok(())
    }

    #[instantiate_tests(<u8>)]
    mod u8 {}

    #[instantiate_tests(<i16>)]
    mod i16 {}

    #[instantiate_tests(<u32>)]
    mod u32 {}

    #[instantiate_tests(<i64>)]
    mod i64 {}

    #[instantiate_tests(<f32>)]
    mod f32 {}

    #[instantiate_tests(<f64>)]
    mod f64 {}
}
