use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Raster dimensions do not match ({}x{}) <-> ({}x{})", .size1.0, .size1.1, .size2.0, .size2.1)]
    SizeMismatch { size1: (usize, usize), size2: (usize, usize) },
    #[error("Non invertible transform: {0}")]
    NonInvertibleTransform(String),
    #[error("Invalid interpolation method: {0}")]
    InvalidInterpolationMethod(String),
    #[error("Invalid aggregation method: {0}")]
    InvalidAggregationMethod(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Error::Runtime(format!("Lock poisoned: {err}"))
    }
}
