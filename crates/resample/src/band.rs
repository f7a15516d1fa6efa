use geo::{AnyMultiLevelImage, ArrayDataType, ArrayNum, DEFAULT_TILE_SIZE, DenseArray, EPSILON, GeoTransform, MultiLevelImage, RasterSize};

use crate::{Error, Result};

/// Transform from model coordinates to the scene coordinates of a product.
/// Only the identity transform can be resampled.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SceneTransform {
    #[default]
    Identity,
    Affine(GeoTransform),
    /// A transform that is not affine, e.g. a lookup based on a geolocation grid
    NonLinear(String),
}

impl SceneTransform {
    pub fn is_identity(&self) -> bool {
        match self {
            SceneTransform::Identity => true,
            SceneTransform::Affine(trans) => trans.is_identity(EPSILON),
            SceneTransform::NonLinear(_) => false,
        }
    }
}

/// Descriptive properties that travel with a raster when it is resampled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterProperties {
    pub description: Option<String>,
    pub unit: Option<String>,
    pub valid_pixel_expression: Option<String>,
}

/// Where the pixels of a band come from.
#[derive(Debug, Clone)]
pub enum BandSource {
    Image(AnyMultiLevelImage),
    /// Pixels are computed from an expression over other bands
    Virtual { expression: String },
}

/// A raster band of a product.
#[derive(Debug, Clone)]
pub struct Band {
    name: String,
    data_type: ArrayDataType,
    size: RasterSize,
    image_to_model: GeoTransform,
    scene_transform: SceneTransform,
    nodata: Option<f64>,
    flag_band: bool,
    properties: RasterProperties,
    source: BandSource,
}

impl Band {
    /// A band backed by an image, size, data type and transform are taken from the image.
    pub fn new(name: impl Into<String>, image: AnyMultiLevelImage) -> Result<Self> {
        let name = name.into();
        let size = image.size();
        if size.is_empty() {
            return Err(Error::InvalidArgument(format!("Band '{name}' has an empty raster size ({size})")));
        }

        Ok(Band {
            name,
            data_type: image.data_type(),
            size,
            image_to_model: image.image_to_model(),
            scene_transform: SceneTransform::Identity,
            nodata: None,
            flag_band: false,
            properties: RasterProperties::default(),
            source: BandSource::Image(image),
        })
    }

    /// A band on top of in memory pixel data.
    pub fn from_array<T: ArrayNum>(name: impl Into<String>, array: DenseArray<T>, image_to_model: GeoTransform) -> Result<Self>
    where
        MultiLevelImage<T>: Into<AnyMultiLevelImage>,
    {
        Self::new(name, MultiLevelImage::from_array(array, image_to_model, DEFAULT_TILE_SIZE).into())
    }

    pub fn new_virtual(
        name: impl Into<String>,
        data_type: ArrayDataType,
        size: RasterSize,
        image_to_model: GeoTransform,
        expression: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if size.is_empty() {
            return Err(Error::InvalidArgument(format!("Band '{name}' has an empty raster size ({size})")));
        }

        Ok(Band {
            name,
            data_type,
            size,
            image_to_model,
            scene_transform: SceneTransform::Identity,
            nodata: None,
            flag_band: false,
            properties: RasterProperties::default(),
            source: BandSource::Virtual {
                expression: expression.into(),
            },
        })
    }

    pub fn with_nodata(mut self, nodata: Option<f64>) -> Self {
        self.nodata = nodata;
        self
    }

    pub fn with_flag_band(mut self, flag_band: bool) -> Self {
        self.flag_band = flag_band;
        self
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

    pub fn data_type(&self) -> ArrayDataType {
        self.data_type
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

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn is_flag_band(&self) -> bool {
        self.flag_band
    }

    pub fn properties(&self) -> &RasterProperties {
        &self.properties
    }

    pub fn source(&self) -> &BandSource {
        &self.source
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self.source, BandSource::Virtual { .. })
    }

    pub fn image(&self) -> Option<&AnyMultiLevelImage> {
        match &self.source {
            BandSource::Image(image) => Some(image),
            BandSource::Virtual { .. } => None,
        }
    }

    pub fn expression(&self) -> Option<&str> {
        match &self.source {
            BandSource::Image(_) => None,
            BandSource::Virtual { expression } => Some(expression),
        }
    }

    /// Reads the full resolution pixels, virtual bands have no pixel data.
    pub fn read<T: ArrayNum>(&self) -> Result<DenseArray<T>> {
        match &self.source {
            BandSource::Image(image) => Ok(image.read::<T>()?),
            BandSource::Virtual { .. } => Err(Error::InvalidArgument(format!("Band '{}' is a virtual band", self.name))),
        }
    }

    /// A new band with the geometry and pixels of `source` that keeps the descriptive properties of this band.
    pub(crate) fn derive(&self, source: BandSource, size: RasterSize, image_to_model: GeoTransform) -> Band {
        Band {
            name: self.name.clone(),
            data_type: self.data_type,
            size,
            image_to_model,
            scene_transform: SceneTransform::Identity,
            nodata: self.nodata,
            flag_band: self.flag_band,
            properties: self.properties.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_geometry_comes_from_the_image() -> Result<()> {
        let trans = GeoTransform::scale_translate(20.0, -20.0, 500.0, 1000.0);
        let band = Band::from_array("B11", DenseArray::filled_with(7u16, RasterSize::with_rows_cols(3, 4)), trans)?
            .with_nodata(Some(0.0))
            .with_flag_band(true);

        assert_eq!(band.name(), "B11");
        assert_eq!(band.data_type(), ArrayDataType::Uint16);
        assert_eq!(band.size(), RasterSize::with_rows_cols(3, 4));
        assert_eq!(band.image_to_model(), trans);
        assert_eq!(band.nodata(), Some(0.0));
        assert!(band.is_flag_band());
        assert!(!band.is_virtual());
        assert_eq!(band.read::<u16>()?.as_slice(), &[7; 12]);

        Ok(())
    }

    #[test]
    fn virtual_band() -> Result<()> {
        let band = Band::new_virtual("ndvi", ArrayDataType::Float32, RasterSize::square(10), GeoTransform::identity(), "(B8 - B4) / (B8 + B4)")?;
        assert!(band.is_virtual());
        assert_eq!(band.expression(), Some("(B8 - B4) / (B8 + B4)"));
        assert!(band.image().is_none());
        assert!(band.read::<f32>().is_err());

        assert!(Band::new_virtual("empty", ArrayDataType::Float32, RasterSize::empty(), GeoTransform::identity(), "1").is_err());

        Ok(())
    }

    #[test]
    fn scene_transforms() {
        assert!(SceneTransform::Identity.is_identity());
        assert!(SceneTransform::Affine(GeoTransform::identity()).is_identity());
        assert!(!SceneTransform::Affine(GeoTransform::scale_translate(1.0, 1.0, 0.5, 0.0)).is_identity());
        assert!(!SceneTransform::NonLinear("pixel geocoding".into()).is_identity());
    }
}
