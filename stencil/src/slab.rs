use crate::{Grid, GridView, Partition, Result, StencilErr, grid::try_zeroed};

/// A worker's rows of the image, extended by its halo rows.
///
/// The first row is a halo row iff `has_top_halo`, the last one iff
/// `has_bottom_halo`. Halo rows are read-only context, only the interior rows
/// are authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct Slab {
    part: Partition,
    grid: Grid,
}

impl Slab {
    /// Wraps received rows, which must match `part.rows_with_halo() × cols`.
    ///
    /// # Errors
    /// `StencilErr::ShapeMismatch` if the length doesn't match, `StencilErr::TooLarge`
    /// if the slab can't be addressed.
    pub fn new(part: Partition, cols: usize, data: Vec<f32>) -> Result<Self> {
        let expected = part.slab_len(cols)?;
        if data.len() != expected {
            return Err(StencilErr::ShapeMismatch {
                what: "slab",
                got: data.len(),
                expected,
            });
        }

        let grid = Grid::from_vec(part.rows_with_halo(), cols, data)?;
        Ok(Self { part, grid })
    }

    /// Copies received rows into a newly allocated slab.
    ///
    /// # Errors
    /// `StencilErr::ShapeMismatch` on a length mismatch, `StencilErr::Allocation`
    /// if the slab can't be allocated.
    pub fn from_rows(part: Partition, cols: usize, rows: &[f32]) -> Result<Self> {
        let expected = part.slab_len(cols)?;
        if rows.len() != expected {
            return Err(StencilErr::ShapeMismatch {
                what: "slab",
                got: rows.len(),
                expected,
            });
        }

        let mut data = try_zeroed(expected)?;
        data.copy_from_slice(rows);
        Self::new(part, cols, data)
    }

    /// Copies the worker's rows, halo included, out of the full image.
    pub fn from_image(image: &Grid, part: Partition) -> Result<Self> {
        let grid = image.view().sub_rows(part.slab_rows()).to_grid()?;
        Ok(Self { part, grid })
    }

    pub(crate) fn with_grid(&self, grid: Grid) -> Self {
        Self {
            part: self.part,
            grid,
        }
    }

    pub fn partition(&self) -> &Partition {
        &self.part
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn view(&self) -> GridView<'_> {
        self.grid.view()
    }

    /// The authoritative rows, without halo.
    pub fn interior(&self) -> &[f32] {
        self.grid.rows_span(self.part.local_interior())
    }

    /// The interior rows a neighbour needs as its halo: the first one when
    /// there's a top halo, then the last one when there's a bottom halo.
    pub fn boundary_rows(&self) -> Vec<f32> {
        let interior = self.part.local_interior();
        let mut rows = Vec::with_capacity(self.part.halo_rows() * self.cols());

        if self.part.has_top_halo {
            rows.extend_from_slice(self.grid.row(interior.start));
        }
        if self.part.has_bottom_halo {
            rows.extend_from_slice(self.grid.row(interior.end - 1));
        }

        rows
    }

    /// Overwrites the halo rows, laid out like `boundary_rows`.
    ///
    /// # Errors
    /// `StencilErr::ShapeMismatch` if `rows` doesn't hold one row per halo.
    pub fn set_halo_rows(&mut self, rows: &[f32]) -> Result<()> {
        let cols = self.cols();
        let expected = self.part.halo_rows() * cols;
        if rows.len() != expected {
            return Err(StencilErr::ShapeMismatch {
                what: "halo",
                got: rows.len(),
                expected,
            });
        }

        let mut rows = rows.chunks_exact(cols.max(1));
        if self.part.has_top_halo {
            if let Some(top) = rows.next() {
                self.grid.row_mut(0).copy_from_slice(top);
            }
        }
        if self.part.has_bottom_halo {
            if let Some(bottom) = rows.next() {
                let last = self.grid.rows() - 1;
                self.grid.row_mut(last).copy_from_slice(bottom);
            }
        }

        Ok(())
    }
}
