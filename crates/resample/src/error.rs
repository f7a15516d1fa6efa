use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported model to scene transform: {0}")]
    NonIdentitySceneTransform(String),
    #[error("Reference band not found: {0}")]
    MissingReferenceBand(String),
    #[error("Non invertible transform: {0}")]
    NonInvertibleTransform(String),
    #[error("Invalid interpolation method: {0}")]
    InvalidInterpolationMethod(String),
    #[error("Invalid aggregation method: {0}")]
    InvalidAggregationMethod(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Raster error: {0}")]
    Geo(geo::Error),
}

impl Error {
    /// Prefixes the message with the raster node that caused the error.
    pub fn for_node(node: &str, err: geo::Error) -> Self {
        match err {
            geo::Error::NonInvertibleTransform(msg) => Error::NonInvertibleTransform(format!("{node}: {msg}")),
            geo::Error::InvalidInterpolationMethod(msg) => Error::InvalidInterpolationMethod(format!("{node}: {msg}")),
            geo::Error::InvalidAggregationMethod(msg) => Error::InvalidAggregationMethod(format!("{node}: {msg}")),
            geo::Error::InvalidArgument(msg) => Error::InvalidArgument(format!("{node}: {msg}")),
            err => Error::Geo(err),
        }
    }
}

impl From<geo::Error> for Error {
    fn from(err: geo::Error) -> Self {
        match err {
            geo::Error::NonInvertibleTransform(msg) => Error::NonInvertibleTransform(msg),
            geo::Error::InvalidInterpolationMethod(msg) => Error::InvalidInterpolationMethod(msg),
            geo::Error::InvalidAggregationMethod(msg) => Error::InvalidAggregationMethod(msg),
            geo::Error::InvalidArgument(msg) => Error::InvalidArgument(msg),
            err => Error::Geo(err),
        }
    }
}
