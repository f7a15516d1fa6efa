use std::fmt::Debug;

use approx::{AbsDiffEq, RelativeEq};

use crate::{Error, Point, Result};

/// Tolerance used for every transform and scale equality test.
/// Keeping a single value makes the resampling decisions consistent across the crate.
pub const EPSILON: f64 = 1e-8;

/// Relative threshold below which the determinant of the linear part is considered zero.
const DETERMINANT_EPSILON: f64 = 1e-10;

/// Affine pixel to model transform.
///
/// The coefficients are stored in GDAL order:
/// `[translate x, scale x, shear x, translate y, shear y, scale y]`
///
/// ```text
/// x = translate_x + scale_x * col + shear_x * row
/// y = translate_y + shear_y * col + scale_y * row
/// ```
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoTransform([f64; 6]);

impl Default for GeoTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl GeoTransform {
    /// Creates a new `GeoTransform` from the provided coefficients in GDAL order.
    pub const fn new(coefficients: [f64; 6]) -> Self {
        GeoTransform(coefficients)
    }

    pub const fn identity() -> Self {
        GeoTransform([0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }

    /// Creates a transform from its named components.
    pub const fn from_components(scale_x: f64, shear_x: f64, shear_y: f64, scale_y: f64, translate_x: f64, translate_y: f64) -> Self {
        GeoTransform([translate_x, scale_x, shear_x, translate_y, shear_y, scale_y])
    }

    /// A transform without rotation that only scales and translates.
    pub const fn scale_translate(scale_x: f64, scale_y: f64, translate_x: f64, translate_y: f64) -> Self {
        Self::from_components(scale_x, 0.0, 0.0, scale_y, translate_x, translate_y)
    }

    /// Translates a pixel coordinate to a model coordinate.
    /// Cell (0, 0) is the top left corner of the raster.
    pub fn apply(&self, col: f64, row: f64) -> Point<f64> {
        let x = self.0[0] + self.0[1] * col + self.0[2] * row;
        let y = self.0[3] + self.0[4] * col + self.0[5] * row;
        Point::new(x, y)
    }

    pub fn scale_x(&self) -> f64 {
        self.0[1]
    }

    pub fn shear_x(&self) -> f64 {
        self.0[2]
    }

    pub fn shear_y(&self) -> f64 {
        self.0[4]
    }

    pub fn scale_y(&self) -> f64 {
        self.0[5]
    }

    pub fn translate_x(&self) -> f64 {
        self.0[0]
    }

    pub fn translate_y(&self) -> f64 {
        self.0[3]
    }

    /// Returns the coefficients of the transformation.
    pub fn coefficients(&self) -> [f64; 6] {
        self.0
    }

    /// Returns the transform that first applies `other` and then `self`.
    pub fn concatenate(&self, other: &GeoTransform) -> GeoTransform {
        let a = &self.0;
        let b = &other.0;

        GeoTransform([
            a[1] * b[0] + a[2] * b[3] + a[0],
            a[1] * b[1] + a[2] * b[4],
            a[1] * b[2] + a[2] * b[5],
            a[4] * b[0] + a[5] * b[3] + a[3],
            a[4] * b[1] + a[5] * b[4],
            a[4] * b[2] + a[5] * b[5],
        ])
    }

    /// The transform with its pixel size multiplied by `factor`, the origin is kept.
    /// Used to derive the transform of a decimated pyramid level.
    pub fn scaled(&self, factor: f64) -> GeoTransform {
        self.concatenate(&GeoTransform::scale_translate(factor, factor, 0.0, 0.0))
    }

    /// The determinant of the 2x2 linear part.
    pub fn determinant(&self) -> f64 {
        self.0[1] * self.0[5] - self.0[2] * self.0[4]
    }

    pub fn is_invertible(&self) -> bool {
        let magnitude = f64::max(
            f64::max(self.0[1].abs(), self.0[2].abs()),
            f64::max(self.0[4].abs(), self.0[5].abs()),
        );

        magnitude > 0.0 && self.determinant().abs() > DETERMINANT_EPSILON * magnitude * magnitude
    }

    pub fn is_identity(&self, tolerance: f64) -> bool {
        (self.0[1] - 1.0).abs() <= tolerance
            && (self.0[5] - 1.0).abs() <= tolerance
            && self.0[2].abs() <= tolerance
            && self.0[4].abs() <= tolerance
            && self.0[0].abs() <= tolerance
            && self.0[3].abs() <= tolerance
    }

    pub fn invert(&self) -> Result<Self> {
        let gt_in = &self.0;

        if !self.is_invertible() {
            return Err(Error::NonInvertibleTransform(format!(
                "{self:?} has a determinant of {}",
                self.determinant()
            )));
        }

        if gt_in[2] == 0.0 && gt_in[4] == 0.0 && gt_in[1] != 0.0 && gt_in[5] != 0.0 {
            // No rotation: avoid the determinant to keep full precision
            // X = gt_in[0] + x * gt_in[1]
            // Y = gt_in[3] + y * gt_in[5]
            // -->
            // x = -gt_in[0] / gt_in[1] + (1 / gt_in[1]) * X
            // y = -gt_in[3] / gt_in[5] + (1 / gt_in[5]) * Y
            return Ok(GeoTransform([
                -gt_in[0] / gt_in[1],
                1.0 / gt_in[1],
                0.0,
                -gt_in[3] / gt_in[5],
                0.0,
                1.0 / gt_in[5],
            ]));
        }

        let inv_det = 1.0 / self.determinant();

        // Adjoint divided by the determinant
        Ok(GeoTransform([
            (gt_in[2] * gt_in[3] - gt_in[0] * gt_in[5]) * inv_det,
            gt_in[5] * inv_det,
            -gt_in[2] * inv_det,
            (-gt_in[1] * gt_in[3] + gt_in[0] * gt_in[4]) * inv_det,
            -gt_in[4] * inv_det,
            gt_in[1] * inv_det,
        ]))
    }

    /// The transform mapping pixel coordinates of `self` onto pixel coordinates of `target`:
    /// `invert(target) ∘ self`
    pub fn pixel_to_pixel(&self, target: &GeoTransform) -> Result<GeoTransform> {
        Ok(target.invert()?.concatenate(self))
    }
}

impl From<[f64; 6]> for GeoTransform {
    fn from(coefficients: [f64; 6]) -> Self {
        GeoTransform(coefficients)
    }
}

impl From<GeoTransform> for [f64; 6] {
    fn from(geo_trans: GeoTransform) -> [f64; 6] {
        geo_trans.0
    }
}

impl Debug for GeoTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GeoTransform(translate: ({}, {}), scale: ({}, {}), shear: ({}, {}))",
            self.translate_x(),
            self.translate_y(),
            self.scale_x(),
            self.scale_y(),
            self.shear_x(),
            self.shear_y()
        )
    }
}

impl AbsDiffEq for GeoTransform {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.0.abs_diff_eq(&other.0, epsilon)
    }
}

impl RelativeEq for GeoTransform {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.0.relative_eq(&other.0, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn apply_with_offset_and_scale() {
        let trans = GeoTransform::scale_translate(10.0, -10.0, 500000.0, 6000000.0);
        assert_eq!(trans.apply(0.0, 0.0), Point::new(500000.0, 6000000.0));
        assert_eq!(trans.apply(100.0, 100.0), Point::new(501000.0, 5999000.0));
    }

    #[test]
    fn named_components() {
        let trans = GeoTransform::from_components(2.0, 0.1, 0.2, 3.0, 10.0, 20.0);
        assert_eq!(trans.scale_x(), 2.0);
        assert_eq!(trans.shear_x(), 0.1);
        assert_eq!(trans.shear_y(), 0.2);
        assert_eq!(trans.scale_y(), 3.0);
        assert_eq!(trans.translate_x(), 10.0);
        assert_eq!(trans.translate_y(), 20.0);
        let point = trans.apply(1.0, 1.0);
        assert_relative_eq!(point.x(), 12.1, epsilon = 1e-12);
        assert_relative_eq!(point.y(), 23.2, epsilon = 1e-12);
    }

    #[test]
    fn concatenate_applies_rhs_first() {
        let scale = GeoTransform::scale_translate(2.0, 2.0, 0.0, 0.0);
        let translate = GeoTransform::scale_translate(1.0, 1.0, 5.0, 7.0);

        // translate after scale
        let composed = translate.concatenate(&scale);
        assert_eq!(composed.apply(1.0, 1.0), Point::new(7.0, 9.0));

        // scale after translate
        let composed = scale.concatenate(&translate);
        assert_eq!(composed.apply(1.0, 1.0), Point::new(12.0, 16.0));
    }

    #[test]
    fn concatenate_is_associative() {
        let a = GeoTransform::from_components(2.0, 0.5, 0.0, 3.0, 1.0, -1.0);
        let b = GeoTransform::from_components(0.5, 0.0, 0.25, -1.0, 4.0, 2.0);
        let c = GeoTransform::scale_translate(10.0, -10.0, 100.0, 200.0);

        assert_relative_eq!(a.concatenate(&b).concatenate(&c), a.concatenate(&b.concatenate(&c)), epsilon = 1e-12);
    }

    #[test]
    fn invert_without_rotation() -> Result<()> {
        let trans = GeoTransform::scale_translate(10.0, -10.0, 500000.0, 6000000.0);
        let inv = trans.invert()?;
        let pixel = inv.apply(501000.0, 5999000.0);
        assert_relative_eq!(pixel.x(), 100.0, epsilon = 1e-10);
        assert_relative_eq!(pixel.y(), 100.0, epsilon = 1e-10);
        assert!(trans.concatenate(&inv).is_identity(EPSILON));

        Ok(())
    }

    #[test]
    fn invert_with_rotation() -> Result<()> {
        let trans = GeoTransform::from_components(2.0, 1.0, 0.5, 3.0, 10.0, 20.0);
        let inv = trans.invert()?;
        assert!(inv.concatenate(&trans).is_identity(EPSILON));
        assert!(trans.concatenate(&inv).is_identity(EPSILON));

        Ok(())
    }

    #[test]
    fn invert_singular() {
        let trans = GeoTransform::from_components(1.0, 2.0, 2.0, 4.0, 0.0, 0.0);
        assert!(matches!(trans.invert(), Err(Error::NonInvertibleTransform(_))));
        assert!(matches!(GeoTransform::new([0.0; 6]).invert(), Err(Error::NonInvertibleTransform(_))));

        // near zero determinant without rotation
        let degenerate = GeoTransform::scale_translate(1e-20, 1.0, 0.0, 0.0);
        assert!(!degenerate.is_invertible());
        assert!(matches!(degenerate.invert(), Err(Error::NonInvertibleTransform(_))));
    }

    #[test]
    fn identity_tolerance() {
        assert!(GeoTransform::identity().is_identity(EPSILON));
        assert!(GeoTransform::scale_translate(1.0 + 1e-10, 1.0, 0.0, 0.0).is_identity(EPSILON));
        assert!(!GeoTransform::scale_translate(1.0, 1.0, 0.5, 0.0).is_identity(EPSILON));
        assert!(!GeoTransform::scale_translate(2.0, 1.0, 0.0, 0.0).is_identity(EPSILON));
    }

    #[test]
    fn pixel_to_pixel() -> Result<()> {
        let source = GeoTransform::scale_translate(10.0, -10.0, 1000.0, 2000.0);
        let reference = GeoTransform::scale_translate(20.0, -20.0, 1000.0, 2000.0);

        let chain = source.pixel_to_pixel(&reference)?;
        assert_relative_eq!(chain, GeoTransform::scale_translate(0.5, 0.5, 0.0, 0.0), epsilon = 1e-12);

        let singular = GeoTransform::new([0.0; 6]);
        assert!(source.pixel_to_pixel(&singular).is_err());

        Ok(())
    }

    #[test]
    fn scaled_keeps_origin() {
        let trans = GeoTransform::scale_translate(10.0, -10.0, 100.0, 200.0);
        let level = trans.scaled(4.0);
        assert_eq!(level, GeoTransform::scale_translate(40.0, -40.0, 100.0, 200.0));
    }
}
