use crate::{ArrayDataType, Nodata};

// Type requirements for pixel data in rasters
pub trait ArrayNum:
    Copy
    + Nodata
    + num::Num
    + num::NumCast
    + num::Bounded
    + std::cmp::PartialOrd
    + std::fmt::Debug
    + std::string::ToString
    + Send
    + Sync
    + 'static
{
    const TYPE: ArrayDataType;

    /// The value as a bit mask limited to the width of the type, used by the flag aggregations.
    /// Floating point values are truncated towards zero and negative values become 0,
    /// flag rasters are expected to have an integer type.
    fn to_bits(self) -> u64;

    /// Builds a value from a bit mask, bits beyond the width of the type are discarded.
    fn from_bits(bits: u64) -> Self;

    /// Converts a computed value back to the pixel type.
    /// Integer types round to the nearest value, `None` is returned for values that do not fit the type.
    fn from_f64_rounded(val: f64) -> Option<Self>;

    #[inline]
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

macro_rules! impl_arraynum_int {
    ( $t:ty, $data_type:expr ) => {
        impl ArrayNum for $t {
            const TYPE: ArrayDataType = $data_type;

            #[inline]
            fn to_bits(self) -> u64 {
                let bits = Self::TYPE.bits();
                let mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
                (self as u64) & mask
            }

            #[inline]
            fn from_bits(bits: u64) -> Self {
                bits as $t
            }

            #[inline]
            fn from_f64_rounded(val: f64) -> Option<Self> {
                num::NumCast::from(val.round())
            }
        }
    };
}

macro_rules! impl_arraynum_fp {
    ( $t:ty, $data_type:expr ) => {
        impl ArrayNum for $t {
            const TYPE: ArrayDataType = $data_type;

            #[inline]
            fn to_bits(self) -> u64 {
                self as u64
            }

            #[inline]
            fn from_bits(bits: u64) -> Self {
                bits as $t
            }

            #[inline]
            fn from_f64_rounded(val: f64) -> Option<Self> {
                num::NumCast::from(val)
            }
        }
    };
}

impl_arraynum_int!(i8, ArrayDataType::Int8);
impl_arraynum_int!(u8, ArrayDataType::Uint8);
impl_arraynum_int!(i16, ArrayDataType::Int16);
impl_arraynum_int!(u16, ArrayDataType::Uint16);
impl_arraynum_int!(i32, ArrayDataType::Int32);
impl_arraynum_int!(u32, ArrayDataType::Uint32);
impl_arraynum_int!(i64, ArrayDataType::Int64);
impl_arraynum_int!(u64, ArrayDataType::Uint64);

impl_arraynum_fp!(f32, ArrayDataType::Float32);
impl_arraynum_fp!(f64, ArrayDataType::Float64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_limited_to_type_width() {
        assert_eq!((-1i8).to_bits(), 0xFF);
        assert_eq!(i8::from_bits(0xFF), -1);
        assert_eq!(0b110u16.to_bits(), 0b110);
        assert_eq!(u8::from_bits(0x1FF), 0xFF);
    }

    #[test]
    fn rounded_conversion() {
        assert_eq!(u8::from_f64_rounded(2.5), Some(3));
        assert_eq!(i32::from_f64_rounded(-1.4), Some(-1));
        assert_eq!(u8::from_f64_rounded(300.0), None);
        assert_eq!(f32::from_f64_rounded(2.5), Some(2.5));
    }
}
