use approx::relative_eq;

use crate::ArrayNum;

pub const NOD: f64 = 255.0;

pub fn number_cast<T: ArrayNum>(val: f64) -> T {
    num::NumCast::from(val).expect("F64 could not be convertd to the specified type")
}

/// Values equal to `NOD` are replaced by the no-data value of the type.
pub fn create_vec<T: ArrayNum>(data: &[f64]) -> Vec<T> {
    data.iter()
        .map(|&v| if relative_eq!(v, NOD) { T::NODATA } else { number_cast(v) })
        .collect()
}
