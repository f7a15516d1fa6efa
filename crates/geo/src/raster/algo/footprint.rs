use crate::{EPSILON, GeoTransform, PixelWindow, Point, RasterSize};

/// Continuous pixel rectangle in source image space, `x` runs along the columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Footprint {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Footprint {
    /// Bounding box of the transformed corner points.
    pub fn from_corners(points: [Point<f64>; 4]) -> Self {
        let mut fp = Footprint {
            x0: f64::INFINITY,
            y0: f64::INFINITY,
            x1: f64::NEG_INFINITY,
            y1: f64::NEG_INFINITY,
        };

        for p in points {
            fp.x0 = fp.x0.min(p.x());
            fp.y0 = fp.y0.min(p.y());
            fp.x1 = fp.x1.max(p.x());
            fp.y1 = fp.y1.max(p.y());
        }

        fp
    }

    /// The area covered by a target pixel in source pixel space.
    pub fn of_pixel(target_to_source: &GeoTransform, row: usize, col: usize) -> Self {
        let (r, c) = (row as f64, col as f64);
        Self::from_corners([
            target_to_source.apply(c, r),
            target_to_source.apply(c + 1.0, r),
            target_to_source.apply(c, r + 1.0),
            target_to_source.apply(c + 1.0, r + 1.0),
        ])
        .snapped()
    }

    /// Edges within `EPSILON` of a pixel boundary are moved onto the boundary.
    pub fn snapped(self) -> Self {
        Footprint {
            x0: snap(self.x0),
            y0: snap(self.y0),
            x1: snap(self.x1),
            y1: snap(self.y1),
        }
    }

    pub fn clipped(self, size: RasterSize) -> Self {
        Footprint {
            x0: self.x0.max(0.0),
            y0: self.y0.max(0.0),
            x1: self.x1.min(size.cols as f64),
            y1: self.y1.min(size.rows as f64),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x1 - self.x0 <= EPSILON || self.y1 - self.y0 <= EPSILON
    }

    /// The pixels touched by the footprint, limited to the raster.
    /// Returns `None` when the footprint lies completely outside of the raster.
    pub fn pixel_window(&self, size: RasterSize, margin: f64) -> Option<PixelWindow> {
        let first_col = (self.x0 - margin).floor().max(0.0);
        let first_row = (self.y0 - margin).floor().max(0.0);
        let end_col = (self.x1 + margin).ceil().min(size.cols as f64);
        let end_row = (self.y1 + margin).ceil().min(size.rows as f64);

        if end_col <= first_col || end_row <= first_row {
            return None;
        }

        Some(PixelWindow::new(
            first_row as usize,
            first_col as usize,
            (end_row - first_row) as usize,
            (end_col - first_col) as usize,
        ))
    }
}

/// The source pixels needed to compute a target window.
/// The margin extends the region to cover interpolation neighbours.
pub(super) fn source_window(target_to_source: &GeoTransform, window: &PixelWindow, source_size: RasterSize, margin: f64) -> Option<PixelWindow> {
    let (r0, c0) = (window.row as f64, window.col as f64);
    let (r1, c1) = (window.end_row() as f64, window.end_col() as f64);

    Footprint::from_corners([
        target_to_source.apply(c0, r0),
        target_to_source.apply(c1, r0),
        target_to_source.apply(c0, r1),
        target_to_source.apply(c1, r1),
    ])
    .snapped()
    .pixel_window(source_size, margin)
}

fn snap(val: f64) -> f64 {
    let rounded = val.round();
    if (val - rounded).abs() < EPSILON { rounded } else { val }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_footprint() {
        let target_to_source = GeoTransform::scale_translate(2.0, 2.0, 0.0, 0.0);
        let fp = Footprint::of_pixel(&target_to_source, 1, 2);
        assert_eq!(fp, Footprint { x0: 4.0, y0: 2.0, x1: 6.0, y1: 4.0 });

        let size = RasterSize::square(5);
        assert_eq!(fp.pixel_window(size, 0.0), Some(PixelWindow::new(2, 4, 2, 1)));
        assert!(!fp.clipped(size).is_empty());
        assert!(Footprint::of_pixel(&target_to_source, 3, 3).clipped(size).is_empty());
    }

    #[test]
    fn almost_integer_edges_are_snapped() {
        let fp = Footprint {
            x0: 1.0 - 1e-10,
            y0: 2.0 + 1e-10,
            x1: 2.5,
            y1: 3.0,
        }
        .snapped();

        assert_eq!(fp.x0, 1.0);
        assert_eq!(fp.y0, 2.0);
        assert_eq!(fp.x1, 2.5);
    }

    #[test]
    fn window_outside_of_source() {
        let target_to_source = GeoTransform::scale_translate(1.0, 1.0, 10.0, 0.0);
        assert_eq!(source_window(&target_to_source, &PixelWindow::new(0, 0, 2, 2), RasterSize::square(4), 1.0), None);
        assert_eq!(
            source_window(&GeoTransform::identity(), &PixelWindow::new(1, 1, 2, 2), RasterSize::square(4), 1.0),
            Some(PixelWindow::new(0, 0, 4, 4))
        );
    }
}
