//! Row partitioning of an image among the workers of a group.
//!
//! Properties:
//! - Ranges are contiguous, disjoint and cover `[0..rows)`.
//! - Sizes differ by at most 1, the first `rows % workers` workers get the extra row.
//! - Halo presence depends only on the position in the ordering.
use std::ops::Range;

use crate::{Result, StencilErr};

/// One worker's share of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub rank: usize,
    pub start_row: usize,
    pub row_count: usize,
    pub has_top_halo: bool,
    pub has_bottom_halo: bool,
}

impl Partition {
    /// Interior rows plus one row per halo.
    #[inline]
    pub fn rows_with_halo(&self) -> usize {
        self.row_count + usize::from(self.has_top_halo) + usize::from(self.has_bottom_halo)
    }

    /// The global rows this worker owns.
    pub fn interior_rows(&self) -> Range<usize> {
        self.start_row..self.start_row + self.row_count
    }

    /// The global rows shipped to this worker, halo rows included.
    pub fn slab_rows(&self) -> Range<usize> {
        let start = self.start_row - usize::from(self.has_top_halo);
        let end = self.start_row + self.row_count + usize::from(self.has_bottom_halo);
        start..end
    }

    /// The owned rows, in slab-local coordinates.
    pub fn local_interior(&self) -> Range<usize> {
        let start = usize::from(self.has_top_halo);
        start..start + self.row_count
    }

    /// Amount of halo rows in the slab.
    #[inline]
    pub fn halo_rows(&self) -> usize {
        usize::from(self.has_top_halo) + usize::from(self.has_bottom_halo)
    }

    /// Samples in this worker's slab for `cols` wide rows.
    ///
    /// # Errors
    /// `StencilErr::TooLarge` if the length overflows.
    pub fn slab_len(&self, cols: usize) -> Result<usize> {
        samples(self.rows_with_halo(), cols)
    }

    /// Samples in this worker's halo rows for `cols` wide rows.
    ///
    /// # Errors
    /// `StencilErr::TooLarge` if the length overflows.
    pub fn halo_len(&self, cols: usize) -> Result<usize> {
        samples(self.halo_rows(), cols)
    }
}

fn samples(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or(StencilErr::TooLarge { rows, cols })
}

/// The ordered row assignment of every worker in the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    rows: usize,
    parts: Vec<Partition>,
}

impl PartitionPlan {
    /// Splits `rows` among `workers`.
    ///
    /// # Errors
    /// `StencilErr::Configuration` if there are no workers or fewer rows than workers.
    pub fn new(rows: usize, workers: usize) -> Result<Self> {
        if workers == 0 || rows < workers {
            return Err(StencilErr::Configuration { rows, workers });
        }

        let base = rows / workers;
        let rem = rows % workers;

        let mut start_row = 0;
        let parts = (0..workers)
            .map(|rank| {
                let row_count = base + usize::from(rank < rem);
                let part = Partition {
                    rank,
                    start_row,
                    row_count,
                    has_top_halo: rank > 0,
                    has_bottom_halo: rank + 1 < workers,
                };

                start_row += row_count;
                part
            })
            .collect();

        Ok(Self { rows, parts })
    }

    /// Total rows covered by the plan.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Amount of workers in the plan.
    pub fn workers(&self) -> usize {
        self.parts.len()
    }

    pub fn get(&self, rank: usize) -> Option<&Partition> {
        self.parts.get(rank)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Partition> {
        self.parts.iter()
    }
}
