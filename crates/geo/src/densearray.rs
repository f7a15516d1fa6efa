use crate::{ArrayNum, Cell, Error, PixelWindow, RasterSize, Result};

/// Raster data stored as a contiguous row-major buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseArray<T: ArrayNum> {
    size: RasterSize,
    data: Vec<T>,
}

impl<T: ArrayNum> DenseArray<T> {
    /// Create a new array with the given size and data buffer.
    pub fn new(size: RasterSize, data: Vec<T>) -> Result<Self> {
        if size.cell_count() != data.len() {
            return Err(Error::SizeMismatch {
                size1: (size.rows, size.cols),
                size2: (data.len(), 1),
            });
        }

        Ok(DenseArray { size, data })
    }

    /// Create a new array filled with the provided value.
    pub fn filled_with(val: T, size: RasterSize) -> Self {
        DenseArray {
            size,
            data: vec![val; size.cell_count()],
        }
    }

    /// Create a new array where every cell is computed by the callback, in row-major order.
    pub fn from_fn(size: RasterSize, mut op: impl FnMut(Cell) -> T) -> Self {
        let mut data = Vec::with_capacity(size.cell_count());
        for row in 0..size.rows {
            for col in 0..size.cols {
                data.push(op(Cell::from_row_col(row as i32, col as i32)));
            }
        }

        DenseArray { size, data }
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn rows(&self) -> usize {
        self.size.rows
    }

    pub fn columns(&self) -> usize {
        self.size.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn value(&self, row: usize, col: usize) -> T {
        self.data[row * self.size.cols + col]
    }

    #[inline]
    pub fn cell_value(&self, cell: Cell) -> Option<T> {
        if cell.is_in_raster(self.size) {
            Some(self.value(cell.row as usize, cell.col as usize))
        } else {
            None
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Copies the region of the window, the window has to be contained in the array.
    pub fn window(&self, window: &PixelWindow) -> Result<DenseArray<T>> {
        if !PixelWindow::for_size(self.size).contains(window) {
            return Err(Error::InvalidArgument(format!(
                "Window {window:?} is outside of the array bounds {}",
                self.size
            )));
        }

        let mut data = Vec::with_capacity(window.size().cell_count());
        for row in window.row..window.end_row() {
            let start = row * self.size.cols + window.col;
            data.extend_from_slice(&self.data[start..start + window.cols]);
        }

        DenseArray::new(window.size(), data)
    }

    /// Copies the contents of `src` into this array with its top left corner at `(row, col)`.
    /// Parts of `src` that do not fit are ignored.
    pub fn paste(&mut self, src: &DenseArray<T>, row: usize, col: usize) {
        let target = PixelWindow::new(row, col, src.rows(), src.columns()).intersection(&PixelWindow::for_size(self.size));
        for r in 0..target.rows {
            let src_start = r * src.columns();
            let dst_start = (target.row + r) * self.size.cols + target.col;
            self.data[dst_start..dst_start + target.cols].copy_from_slice(&src.data[src_start..src_start + target.cols]);
        }
    }
}

impl<T: ArrayNum> AsRef<[T]> for DenseArray<T> {
    fn as_ref(&self) -> &[T] {
        self.data.as_ref()
    }
}

impl<'a, T: ArrayNum> IntoIterator for &'a DenseArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
