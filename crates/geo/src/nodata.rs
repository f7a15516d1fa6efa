use num::ToPrimitive;

/// Trait for types that can represent a no-data value in raster data.
/// Floating point types use NaN as the no-data value, while integer types use their maximum value for unsigned types
/// and minimum value for signed types.
/// The predefined value is only used as fill value when a band does not define its own no-data value.
pub trait Nodata: ToPrimitive + PartialEq + Sized + Copy {
    const NODATA: Self;

    #[inline]
    fn is_nodata(self) -> bool {
        self == Self::NODATA
    }

    fn is_nan(self) -> bool;
}

/// Checks a value against the no-data value of a band.
/// NaN values are always considered no-data.
#[inline]
pub fn is_nodata_value<T: Nodata>(value: T, nodata: Option<T>) -> bool {
    value.is_nan() || nodata.is_some_and(|nod| value == nod)
}

macro_rules! impl_nodata_fixed_point {
    ( $t:ident, $nodata:ident ) => {
        impl Nodata for $t {
            const NODATA: $t = $t::$nodata;

            fn is_nan(self) -> bool {
                false
            }
        }
    };
}

macro_rules! impl_nodata_floating_point {
    ( $t:ident ) => {
        impl Nodata for $t {
            const NODATA: $t = $t::NAN;

            fn is_nodata(self) -> bool {
                self.is_nan()
            }

            fn is_nan(self) -> bool {
                self.is_nan()
            }
        }
    };
}

impl_nodata_fixed_point!(u8, MAX);
impl_nodata_fixed_point!(u16, MAX);
impl_nodata_fixed_point!(u32, MAX);
impl_nodata_fixed_point!(u64, MAX);
impl_nodata_fixed_point!(i8, MIN);
impl_nodata_fixed_point!(i16, MIN);
impl_nodata_fixed_point!(i32, MIN);
impl_nodata_fixed_point!(i64, MIN);

impl_nodata_floating_point!(f32);
impl_nodata_floating_point!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodata_value_check() {
        assert!(is_nodata_value(5u8, Some(5)));
        assert!(!is_nodata_value(5u8, Some(4)));
        assert!(!is_nodata_value(u8::MAX, None));
        assert!(is_nodata_value(f32::NAN, None));
        assert!(is_nodata_value(-1.0f64, Some(-1.0)));
    }

    #[test]
    fn predefined_nodata() {
        assert!(i16::MIN.is_nodata());
        assert!(u32::MAX.is_nodata());
        assert!(f64::NAN.is_nodata());
        assert!(!0.0f32.is_nodata());
    }
}
