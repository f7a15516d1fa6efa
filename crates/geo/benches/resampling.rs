use std::time::Duration;

use criterion::Criterion;
use geo::{
    ArrayNum, DenseArray, GeoTransform, MultiLevelImage, MultiLevelModel, RasterSize,
    raster::algo::{AggregationMethod, InterpolationMethod, aggregated_image, interpolated_image},
};
use num::NumCast;

const SOURCE_SIZE: RasterSize = RasterSize::with_rows_cols(768, 1024);
const TILE_SIZE: RasterSize = RasterSize::square(256);

pub fn bench_name<T: ArrayNum>(name: &str) -> String {
    format!("{}_{:?}", name, T::TYPE)
}

fn source_image<T: ArrayNum>() -> MultiLevelImage<T> {
    let array = DenseArray::from_fn(SOURCE_SIZE, |cell| NumCast::from((cell.row + cell.col) % 100).unwrap_or(T::zero()));
    MultiLevelImage::from_array(array, GeoTransform::scale_translate(10.0, -10.0, 0.0, 0.0), TILE_SIZE)
}

pub fn bench_resampling<T: ArrayNum>(c: &mut Criterion) {
    let source = source_image::<T>();

    let coarse = MultiLevelModel::new(
        1,
        GeoTransform::scale_translate(20.0, -20.0, 0.0, 0.0),
        RasterSize::with_rows_cols(SOURCE_SIZE.rows / 2, SOURCE_SIZE.cols / 2),
    );
    let fine = MultiLevelModel::new(
        1,
        GeoTransform::scale_translate(5.0, -5.0, 0.0, 0.0),
        RasterSize::with_rows_cols(SOURCE_SIZE.rows * 2, SOURCE_SIZE.cols * 2),
    );

    let mut group = c.benchmark_group(bench_name::<T>("resampling"));
    group.warm_up_time(Duration::from_secs(1));

    for method in [AggregationMethod::Mean, AggregationMethod::Median, AggregationMethod::FlagMedianAnd] {
        group.bench_function(bench_name::<T>(&format!("aggregate_{method}")), |b| {
            b.iter(|| {
                aggregated_image(&source, &coarse, None, Some(method), TILE_SIZE)
                    .and_then(|img| img.read())
                    .expect("aggregation failed")
            });
        });
    }

    for method in [InterpolationMethod::Nearest, InterpolationMethod::Bilinear] {
        group.bench_function(bench_name::<T>(&format!("interpolate_{method}")), |b| {
            b.iter(|| {
                interpolated_image(&source, &fine, None, Some(method), TILE_SIZE)
                    .and_then(|img| img.read())
                    .expect("interpolation failed")
            });
        });
    }

    group.finish();
}

criterion::criterion_group!(benches_u8, bench_resampling<u8>);
criterion::criterion_group!(benches_i32, bench_resampling<i32>);
criterion::criterion_group!(benches_f32, bench_resampling<f32>);
criterion::criterion_main!(benches_u8, benches_i32, benches_f32);
