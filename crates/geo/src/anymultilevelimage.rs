use std::any::Any;

use crate::{ArrayDataType, ArrayNum, DenseArray, Error, GeoTransform, MultiLevelImage, MultiLevelModel, RasterSize, Result};

/// Type erased `MultiLevelImage`, the pixel type is only known at runtime for the bands of a product.
#[derive(Clone, Debug)]
pub enum AnyMultiLevelImage {
    U8(MultiLevelImage<u8>),
    U16(MultiLevelImage<u16>),
    U32(MultiLevelImage<u32>),
    U64(MultiLevelImage<u64>),
    I8(MultiLevelImage<i8>),
    I16(MultiLevelImage<i16>),
    I32(MultiLevelImage<i32>),
    I64(MultiLevelImage<i64>),
    F32(MultiLevelImage<f32>),
    F64(MultiLevelImage<f64>),
}

/// Dispatch on the `AnyMultiLevelImage` variants and apply an expression to the inner image.
/// The result is not wrapped.
#[macro_export]
macro_rules! dispatch_anymultilevelimage {
    ($image:expr, $var:ident, $expr:expr) => {
        match $image {
            $crate::AnyMultiLevelImage::U8($var) => $expr,
            $crate::AnyMultiLevelImage::U16($var) => $expr,
            $crate::AnyMultiLevelImage::U32($var) => $expr,
            $crate::AnyMultiLevelImage::U64($var) => $expr,
            $crate::AnyMultiLevelImage::I8($var) => $expr,
            $crate::AnyMultiLevelImage::I16($var) => $expr,
            $crate::AnyMultiLevelImage::I32($var) => $expr,
            $crate::AnyMultiLevelImage::I64($var) => $expr,
            $crate::AnyMultiLevelImage::F32($var) => $expr,
            $crate::AnyMultiLevelImage::F64($var) => $expr,
        }
    };
}

/// Dispatch on the `AnyMultiLevelImage` variants and wrap the result in the same variant.
#[macro_export]
macro_rules! apply_to_anymultilevelimage {
    ($image:expr, $var:ident, $expr:expr) => {
        match $image {
            $crate::AnyMultiLevelImage::U8($var) => $crate::AnyMultiLevelImage::U8($expr),
            $crate::AnyMultiLevelImage::U16($var) => $crate::AnyMultiLevelImage::U16($expr),
            $crate::AnyMultiLevelImage::U32($var) => $crate::AnyMultiLevelImage::U32($expr),
            $crate::AnyMultiLevelImage::U64($var) => $crate::AnyMultiLevelImage::U64($expr),
            $crate::AnyMultiLevelImage::I8($var) => $crate::AnyMultiLevelImage::I8($expr),
            $crate::AnyMultiLevelImage::I16($var) => $crate::AnyMultiLevelImage::I16($expr),
            $crate::AnyMultiLevelImage::I32($var) => $crate::AnyMultiLevelImage::I32($expr),
            $crate::AnyMultiLevelImage::I64($var) => $crate::AnyMultiLevelImage::I64($expr),
            $crate::AnyMultiLevelImage::F32($var) => $crate::AnyMultiLevelImage::F32($expr),
            $crate::AnyMultiLevelImage::F64($var) => $crate::AnyMultiLevelImage::F64($expr),
        }
    };
}

/// Like `apply_to_anymultilevelimage!` for fallible expressions, the error is propagated.
#[macro_export]
macro_rules! try_apply_to_anymultilevelimage {
    ($image:expr, $var:ident, $expr:expr) => {
        match $image {
            $crate::AnyMultiLevelImage::U8($var) => $crate::AnyMultiLevelImage::U8($expr?),
            $crate::AnyMultiLevelImage::U16($var) => $crate::AnyMultiLevelImage::U16($expr?),
            $crate::AnyMultiLevelImage::U32($var) => $crate::AnyMultiLevelImage::U32($expr?),
            $crate::AnyMultiLevelImage::U64($var) => $crate::AnyMultiLevelImage::U64($expr?),
            $crate::AnyMultiLevelImage::I8($var) => $crate::AnyMultiLevelImage::I8($expr?),
            $crate::AnyMultiLevelImage::I16($var) => $crate::AnyMultiLevelImage::I16($expr?),
            $crate::AnyMultiLevelImage::I32($var) => $crate::AnyMultiLevelImage::I32($expr?),
            $crate::AnyMultiLevelImage::I64($var) => $crate::AnyMultiLevelImage::I64($expr?),
            $crate::AnyMultiLevelImage::F32($var) => $crate::AnyMultiLevelImage::F32($expr?),
            $crate::AnyMultiLevelImage::F64($var) => $crate::AnyMultiLevelImage::F64($expr?),
        }
    };
}

impl AnyMultiLevelImage {
    pub fn data_type(&self) -> ArrayDataType {
        match self {
            AnyMultiLevelImage::U8(_) => ArrayDataType::Uint8,
            AnyMultiLevelImage::U16(_) => ArrayDataType::Uint16,
            AnyMultiLevelImage::U32(_) => ArrayDataType::Uint32,
            AnyMultiLevelImage::U64(_) => ArrayDataType::Uint64,
            AnyMultiLevelImage::I8(_) => ArrayDataType::Int8,
            AnyMultiLevelImage::I16(_) => ArrayDataType::Int16,
            AnyMultiLevelImage::I32(_) => ArrayDataType::Int32,
            AnyMultiLevelImage::I64(_) => ArrayDataType::Int64,
            AnyMultiLevelImage::F32(_) => ArrayDataType::Float32,
            AnyMultiLevelImage::F64(_) => ArrayDataType::Float64,
        }
    }

    pub fn size(&self) -> RasterSize {
        dispatch_anymultilevelimage!(self, img, img.size())
    }

    pub fn model(&self) -> &MultiLevelModel {
        dispatch_anymultilevelimage!(self, img, img.model())
    }

    pub fn image_to_model(&self) -> GeoTransform {
        self.model().image_to_model(0)
    }

    pub fn with_model(&self, model: MultiLevelModel) -> Self {
        apply_to_anymultilevelimage!(self, img, img.with_model(model))
    }

    pub fn shares_levels_with(&self, other: &AnyMultiLevelImage) -> bool {
        match (self, other) {
            (AnyMultiLevelImage::U8(a), AnyMultiLevelImage::U8(b)) => a.shares_levels_with(b),
            (AnyMultiLevelImage::U16(a), AnyMultiLevelImage::U16(b)) => a.shares_levels_with(b),
            (AnyMultiLevelImage::U32(a), AnyMultiLevelImage::U32(b)) => a.shares_levels_with(b),
            (AnyMultiLevelImage::U64(a), AnyMultiLevelImage::U64(b)) => a.shares_levels_with(b),
            (AnyMultiLevelImage::I8(a), AnyMultiLevelImage::I8(b)) => a.shares_levels_with(b),
            (AnyMultiLevelImage::I16(a), AnyMultiLevelImage::I16(b)) => a.shares_levels_with(b),
            (AnyMultiLevelImage::I32(a), AnyMultiLevelImage::I32(b)) => a.shares_levels_with(b),
            (AnyMultiLevelImage::I64(a), AnyMultiLevelImage::I64(b)) => a.shares_levels_with(b),
            (AnyMultiLevelImage::F32(a), AnyMultiLevelImage::F32(b)) => a.shares_levels_with(b),
            (AnyMultiLevelImage::F64(a), AnyMultiLevelImage::F64(b)) => a.shares_levels_with(b),
            _ => false,
        }
    }

    /// Typed access to the inner image.
    pub fn as_typed<T: ArrayNum>(&self) -> Result<&MultiLevelImage<T>> {
        dispatch_anymultilevelimage!(self, img, downcast_ref::<T, _>(img))
    }

    /// Reads the full resolution image as the requested pixel type, the type has to match the image type.
    pub fn read<T: ArrayNum>(&self) -> Result<DenseArray<T>> {
        self.as_typed::<T>()?.read()
    }
}

fn downcast_ref<TDest: ArrayNum, T: ArrayNum>(image: &MultiLevelImage<T>) -> Result<&MultiLevelImage<TDest>> {
    (image as &dyn Any)
        .downcast_ref::<MultiLevelImage<TDest>>()
        .ok_or_else(|| Error::InvalidArgument(format!("Type mismatch: {} != {}", TDest::TYPE, T::TYPE)))
}

macro_rules! impl_from_multilevelimage {
    ( $t:ty, $variant:ident ) => {
        impl From<MultiLevelImage<$t>> for AnyMultiLevelImage {
            fn from(image: MultiLevelImage<$t>) -> Self {
                AnyMultiLevelImage::$variant(image)
            }
        }
    };
}

impl_from_multilevelimage!(u8, U8);
impl_from_multilevelimage!(u16, U16);
impl_from_multilevelimage!(u32, U32);
impl_from_multilevelimage!(u64, U64);
impl_from_multilevelimage!(i8, I8);
impl_from_multilevelimage!(i16, I16);
impl_from_multilevelimage!(i32, I32);
impl_from_multilevelimage!(i64, I64);
impl_from_multilevelimage!(f32, F32);
impl_from_multilevelimage!(f64, F64);
