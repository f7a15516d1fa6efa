use crate::RasterSize;

/// Rectangular region of a raster expressed in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelWindow {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl PixelWindow {
    pub const fn new(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        PixelWindow { row, col, rows, cols }
    }

    /// The window covering the full raster.
    pub const fn for_size(size: RasterSize) -> Self {
        PixelWindow::new(0, 0, size.rows, size.cols)
    }

    pub const fn size(&self) -> RasterSize {
        RasterSize::with_rows_cols(self.rows, self.cols)
    }

    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub const fn end_row(&self) -> usize {
        self.row + self.rows
    }

    pub const fn end_col(&self) -> usize {
        self.col + self.cols
    }

    pub fn contains(&self, other: &PixelWindow) -> bool {
        other.row >= self.row && other.col >= self.col && other.end_row() <= self.end_row() && other.end_col() <= self.end_col()
    }

    /// The overlapping part of both windows, an empty window if they do not overlap.
    pub fn intersection(&self, other: &PixelWindow) -> PixelWindow {
        let row = self.row.max(other.row);
        let col = self.col.max(other.col);
        let end_row = self.end_row().min(other.end_row());
        let end_col = self.end_col().min(other.end_col());

        if end_row <= row || end_col <= col {
            return PixelWindow::default();
        }

        PixelWindow::new(row, col, end_row - row, end_col - col)
    }
}
