use geo::{
    DEFAULT_TILE_SIZE, RasterSize,
    raster::algo::{AggregationMethod, InterpolationMethod},
};

use crate::{Error, Result};

/// Parameters of a product resampling.
///
/// A method that is `None` is only reported as an error when a band actually needs it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResamplingOptions {
    /// The name of the band whose size and resolution all other bands are resampled to
    pub reference_band: String,
    /// Used when upsampling to a finer resolution (default = `NearestNeighbour`)
    #[cfg_attr(feature = "serde", serde(default = "default_interpolation"))]
    pub interpolation: Option<InterpolationMethod>,
    /// Used when downsampling measurement bands to a coarser resolution (default = `First`)
    #[cfg_attr(feature = "serde", serde(default = "default_aggregation"))]
    pub aggregation: Option<AggregationMethod>,
    /// Used when downsampling flag bands to a coarser resolution (default = `First`)
    #[cfg_attr(feature = "serde", serde(default = "default_aggregation"))]
    pub flag_aggregation: Option<AggregationMethod>,
    /// Tile size of the resampled images (default = 256x256)
    #[cfg_attr(feature = "serde", serde(default))]
    pub tile_size: Option<RasterSize>,
}

#[cfg(feature = "serde")]
fn default_interpolation() -> Option<InterpolationMethod> {
    Some(InterpolationMethod::default())
}

#[cfg(feature = "serde")]
fn default_aggregation() -> Option<AggregationMethod> {
    Some(AggregationMethod::default())
}

impl ResamplingOptions {
    pub fn new(reference_band: impl Into<String>) -> Self {
        ResamplingOptions {
            reference_band: reference_band.into(),
            interpolation: Some(InterpolationMethod::default()),
            aggregation: Some(AggregationMethod::default()),
            flag_aggregation: Some(AggregationMethod::default()),
            tile_size: None,
        }
    }

    /// Creates the options from the textual parameter values.
    pub fn from_parameters(reference_band: &str, interpolation: &str, aggregation: &str, flag_aggregation: &str) -> Result<Self> {
        let options = ResamplingOptions {
            reference_band: reference_band.to_string(),
            interpolation: Some(interpolation.parse()?),
            aggregation: Some(aggregation.parse()?),
            flag_aggregation: Some(flag_aggregation.parse()?),
            tile_size: None,
        };

        options.validate()?;
        Ok(options)
    }

    pub fn with_interpolation(mut self, method: InterpolationMethod) -> Self {
        self.interpolation = Some(method);
        self
    }

    pub fn with_aggregation(mut self, method: AggregationMethod) -> Self {
        self.aggregation = Some(method);
        self
    }

    pub fn with_flag_aggregation(mut self, method: AggregationMethod) -> Self {
        self.flag_aggregation = Some(method);
        self
    }

    pub fn with_tile_size(mut self, tile_size: RasterSize) -> Self {
        self.tile_size = Some(tile_size);
        self
    }

    pub fn tile_size(&self) -> RasterSize {
        self.tile_size.unwrap_or(DEFAULT_TILE_SIZE)
    }

    /// The measurement and flag aggregation methods are separate value sets, `First` is part of both.
    pub fn validate(&self) -> Result<()> {
        if self.reference_band.is_empty() {
            return Err(Error::MissingReferenceBand("no reference band name provided".to_string()));
        }

        if let Some(method) = self.aggregation
            && !AggregationMethod::NUMERIC.contains(&method)
        {
            return Err(Error::InvalidAggregationMethod(format!("{method} can not be used for measurement bands")));
        }

        if let Some(method) = self.flag_aggregation
            && !AggregationMethod::FLAG.contains(&method)
        {
            return Err(Error::InvalidAggregationMethod(format!("{method} can not be used for flag bands")));
        }

        if let Some(tile_size) = self.tile_size
            && tile_size.is_empty()
        {
            return Err(Error::InvalidArgument(format!("Invalid tile size: {tile_size}")));
        }

        Ok(())
    }
}
