//! Row-major single channel `f32` raster and a borrowed 2D view over it.
//!
//! All the row/offset arithmetic of the crate lives here, kernels and slabs
//! address pixels through `GridView::row` and `Grid::rows_span`.
use std::ops::Range;

use crate::{Result, StencilErr};

/// Allocates a zeroed buffer of `elements` samples, reporting failure instead of aborting.
pub(crate) fn try_zeroed(elements: usize) -> Result<Vec<f32>> {
    let mut data = Vec::new();
    data.try_reserve_exact(elements)
        .map_err(|source| StencilErr::Allocation { elements, source })?;
    data.resize(elements, 0.0);
    Ok(data)
}

/// Owned row-major intensity grid (stride == cols).
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Grid {
    /// Creates a zero filled `rows × cols` grid.
    ///
    /// # Errors
    /// `StencilErr::Allocation` if the buffer can't be reserved.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        let data = try_zeroed(rows.saturating_mul(cols))?;
        Ok(Self { rows, cols, data })
    }

    /// Wraps an existing row-major buffer.
    ///
    /// # Errors
    /// `StencilErr::ShapeMismatch` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        let expected = rows.saturating_mul(cols);
        if data.len() != expected {
            return Err(StencilErr::ShapeMismatch {
                what: "grid",
                got: data.len(),
                expected,
            });
        }

        Ok(Self { rows, cols, data })
    }

    /// Builds a grid by evaluating `f(row, col)` at every pixel.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f32,
    {
        let mut grid = Self::zeros(rows, cols)?;
        for i in 0..rows {
            for (j, px) in grid.row_mut(i).iter_mut().enumerate() {
                *px = f(i, j);
            }
        }

        Ok(grid)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Contiguous samples of the rows in `rows`.
    pub fn rows_span(&self, rows: Range<usize>) -> &[f32] {
        &self.data[rows.start * self.cols..rows.end * self.cols]
    }

    /// Mutable contiguous samples of the rows in `rows`.
    pub fn rows_span_mut(&mut self, rows: Range<usize>) -> &mut [f32] {
        &mut self.data[rows.start * self.cols..rows.end * self.cols]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Borrows the whole grid as a view.
    pub fn view(&self) -> GridView<'_> {
        GridView {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
            offset: 0,
            stride: self.cols,
        }
    }
}

/// Read-only 2D window over a row-major buffer: `offset` to the first sample
/// and `stride` samples between consecutive rows.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
    offset: usize,
    stride: usize,
}

impl<'a> GridView<'a> {
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn row(&self, row: usize) -> &'a [f32] {
        debug_assert!(row < self.rows);
        let start = self.offset + row * self.stride;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.row(row)[col]
    }

    /// Narrows the view to the rows in `rows`, relative to this view.
    pub fn sub_rows(&self, rows: Range<usize>) -> GridView<'a> {
        debug_assert!(rows.start <= rows.end && rows.end <= self.rows);
        GridView {
            data: self.data,
            rows: rows.end - rows.start,
            cols: self.cols,
            offset: self.offset + rows.start * self.stride,
            stride: self.stride,
        }
    }

    /// The three rows centred on `row`, which must be an interior row.
    #[inline]
    pub(crate) fn neighbourhood(&self, row: usize) -> [&'a [f32]; 3] {
        [self.row(row - 1), self.row(row), self.row(row + 1)]
    }

    /// Copies the viewed samples into a new owned grid.
    pub fn to_grid(&self) -> Result<Grid> {
        let mut grid = Grid::zeros(self.rows, self.cols)?;
        for i in 0..self.rows {
            grid.row_mut(i).copy_from_slice(self.row(i));
        }

        Ok(grid)
    }
}
