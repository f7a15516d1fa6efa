use geo::{
    AnyMultiLevelImage, ArrayNum, MultiLevelImage, MultiLevelModel, RasterSize,
    raster::algo::{AggregationMethod, InterpolationMethod, aggregated_image, interpolated_image},
    try_apply_to_anymultilevelimage,
};

use crate::{
    AncillaryTransfer, Band, BandSource, Error, NoAncillaryTransfer, Product, ResampleStrategy, ResamplingOptions, Result,
    ancillary, resample_tie_point_grid,
    strategy::intermediate_geometry,
};

const NAME_SUFFIX: &str = "resampled";

/// Everything needed to compute the resampled image of a band.
struct BandPlan<'a> {
    band: &'a Band,
    strategy: ResampleStrategy,
    reference_model: MultiLevelModel,
    interpolation: Option<InterpolationMethod>,
    aggregation: Option<AggregationMethod>,
    tile_size: RasterSize,
}

impl BandPlan<'_> {
    fn nodata<T: ArrayNum>(&self) -> Option<T> {
        let nodata = self.band.nodata()?;
        let typed = <T as num::NumCast>::from(nodata);
        if typed.is_none() {
            log::warn!(
                "No-data value {nodata} of band '{}' is not representable as {}, it is ignored",
                self.band.name(),
                T::TYPE
            );
        }

        typed
    }
}

fn resample_image<T: ArrayNum>(image: &MultiLevelImage<T>, plan: &BandPlan) -> geo::Result<MultiLevelImage<T>> {
    let reference_model = &plan.reference_model;

    match plan.strategy {
        // The pyramid of the reference decides on the levels, limited to the levels the image can provide
        ResampleStrategy::Identity => Ok(image.with_model(*reference_model)),
        ResampleStrategy::Aggregate => aggregated_image(image, reference_model, plan.nodata(), plan.aggregation, plan.tile_size),
        ResampleStrategy::Interpolate => interpolated_image(image, reference_model, plan.nodata(), plan.interpolation, plan.tile_size),
        ResampleStrategy::AggregateThenInterpolate(axis) => {
            let nodata = plan.nodata();
            let (size, transform) = intermediate_geometry(
                axis,
                plan.band.size(),
                &plan.band.image_to_model(),
                reference_model.size(),
                &reference_model.image_to_model(0),
            );

            let intermediate_model = MultiLevelModel::for_tile_size(transform, size, plan.tile_size);
            let intermediate = aggregated_image(image, &intermediate_model, nodata, plan.aggregation, plan.tile_size)?;
            interpolated_image(&intermediate, reference_model, nodata, plan.interpolation, plan.tile_size)
        }
    }
}

fn resample_any(image: &AnyMultiLevelImage, plan: &BandPlan) -> geo::Result<AnyMultiLevelImage> {
    Ok(try_apply_to_anymultilevelimage!(image, img, resample_image(img, plan)))
}

fn resample_band(band: &Band, strategy: ResampleStrategy, reference_model: &MultiLevelModel, options: &ResamplingOptions) -> Result<Band> {
    let reference_size = reference_model.size();
    let reference_transform = reference_model.image_to_model(0);

    match band.source() {
        BandSource::Virtual { expression } => Ok(band.derive(
            BandSource::Virtual {
                expression: expression.clone(),
            },
            reference_size,
            reference_transform,
        )),
        BandSource::Image(image) => {
            let node = format!("band '{}'", band.name());
            band.image_to_model().invert().map_err(|err| Error::for_node(&node, err))?;

            let aggregation = if band.is_flag_band() {
                options.flag_aggregation
            } else {
                options.aggregation
            };

            // The bitwise reductions need integer pixels
            if strategy.aggregates()
                && band.data_type().is_floating_point()
                && let Some(method) = aggregation
                && method.is_flag_method()
            {
                return Err(Error::InvalidArgument(format!(
                    "{node}: {method} needs an integer pixel type, the band is {}",
                    band.data_type()
                )));
            }

            let plan = BandPlan {
                band,
                strategy,
                reference_model: *reference_model,
                interpolation: options.interpolation,
                aggregation,
                tile_size: options.tile_size(),
            };

            let image = resample_any(image, &plan).map_err(|err| Error::for_node(&node, err))?;
            Ok(band.derive(BandSource::Image(image), reference_size, reference_transform))
        }
    }
}

/// True if the product only contains rasters with an identity model to scene transform.
pub fn can_be_applied(product: &Product) -> bool {
    product.can_be_resampled()
}

/// Resamples all bands and tie point grids of a product to the size and resolution of the reference band.
///
/// Products where all rasters already have the same size are returned as is.
pub fn resample_product(source: &Product, options: &ResamplingOptions) -> Result<Product> {
    resample_product_with(source, options, &NoAncillaryTransfer)
}

/// Same as [`resample_product`], the non raster content is copied with `ancillary`.
pub fn resample_product_with(source: &Product, options: &ResamplingOptions, ancillary: &dyn AncillaryTransfer) -> Result<Product> {
    if !source.is_multi_size() {
        log::info!("Product '{}' is not multi-size, no resampling needed", source.name());
        return Ok(source.clone());
    }

    if let Some(node) = source.first_non_identity_scene_node() {
        return Err(Error::NonIdentitySceneTransform(format!(
            "'{node}' of product '{}' is not in scene coordinates",
            source.name()
        )));
    }

    options.validate()?;

    let reference = source.band(&options.reference_band).ok_or_else(|| {
        Error::MissingReferenceBand(format!("product '{}' has no band '{}'", source.name(), options.reference_band))
    })?;

    let reference_transform = reference.image_to_model();
    reference_transform
        .invert()
        .map_err(|err| Error::for_node(&format!("reference band '{}'", reference.name()), err))?;

    let reference_size = reference.size();
    let reference_model = MultiLevelModel::for_tile_size(reference_transform, reference_size, options.tile_size());

    let mut target = Product::new(format!("{}_{NAME_SUFFIX}", source.name()), source.product_type(), reference_size);

    let mut resampled_count = 0;
    for band in source.bands() {
        let strategy = ResampleStrategy::select(band.size(), reference_size, band.is_virtual());
        log::debug!("Band '{}' {} -> {reference_size}: {strategy}", band.name(), band.size());
        if strategy != ResampleStrategy::Identity {
            resampled_count += 1;
        }

        target.add_band(resample_band(band, strategy, &reference_model, options)?);
    }

    for grid in source.tie_point_grids() {
        target.add_tie_point_grid(resample_tie_point_grid(grid, &reference_transform, reference_size)?);
    }

    ancillary::transfer_all(ancillary, source, reference, &mut target)?;

    log::info!(
        "Resampled product '{}' to {reference_size} using band '{}' ({resampled_count} of {} bands resampled, {} tie point grids)",
        source.name(),
        reference.name(),
        source.bands().len(),
        source.tie_point_grids().len()
    );

    Ok(target)
}
