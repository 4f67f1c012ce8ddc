//! The transport independent halves of distribution and collection.
//!
//! The coordinator picks each worker's slab out of the full image, routes
//! smoothed boundary rows into neighbour halos between the two passes, and
//! reassembles interior rows keyed by the plan, never by arrival order.
use crate::{Grid, Partition, PartitionPlan, Result, StencilErr};

/// The contiguous samples shipped to the worker owning `part`.
pub fn slab_rows<'a>(image: &'a Grid, part: &Partition) -> &'a [f32] {
    image.rows_span(part.slab_rows())
}

/// Builds every worker's halo rows out of every worker's boundary rows.
///
/// `boundaries[w]` is laid out like `Slab::boundary_rows` of worker `w`. The
/// result for worker `w` holds worker `w - 1`'s last interior row when it has
/// a top halo, then worker `w + 1`'s first interior row when it has a bottom
/// halo.
///
/// # Errors
/// `StencilErr::ShapeMismatch` if the amount or length of the boundaries is off.
pub fn route_halos(
    plan: &PartitionPlan,
    boundaries: &[Vec<f32>],
    cols: usize,
) -> Result<Vec<Vec<f32>>> {
    if boundaries.len() != plan.workers() {
        return Err(StencilErr::ShapeMismatch {
            what: "boundary set",
            got: boundaries.len(),
            expected: plan.workers(),
        });
    }

    for (part, rows) in plan.iter().zip(boundaries) {
        let expected = part.halo_rows() * cols;
        if rows.len() != expected {
            return Err(StencilErr::ShapeMismatch {
                what: "boundary",
                got: rows.len(),
                expected,
            });
        }
    }

    let first_row = |rows: &[f32]| rows[..cols].to_vec();
    let last_row = |rows: &[f32]| rows[rows.len() - cols..].to_vec();

    let halos = plan
        .iter()
        .map(|part| {
            let w = part.rank;
            let mut halo = Vec::with_capacity(part.halo_rows() * cols);
            if part.has_top_halo {
                halo.extend(last_row(&boundaries[w - 1]));
            }
            if part.has_bottom_halo {
                halo.extend(first_row(&boundaries[w + 1]));
            }
            halo
        })
        .collect();

    Ok(halos)
}

/// Reassembles the global result out of every worker's interior rows.
#[derive(Debug)]
pub struct Collector {
    plan: PartitionPlan,
    output: Grid,
    filled: Vec<bool>,
}

impl Collector {
    /// Creates a collector with a zeroed `plan.rows() × cols` destination.
    pub fn new(plan: PartitionPlan, cols: usize) -> Result<Self> {
        let output = Grid::zeros(plan.rows(), cols)?;
        let filled = vec![false; plan.workers()];
        Ok(Self {
            plan,
            output,
            filled,
        })
    }

    /// Places worker `rank`'s interior rows at its start row.
    ///
    /// # Errors
    /// `StencilErr::UnknownRank` for a rank outside the plan and
    /// `StencilErr::ShapeMismatch` if `rows` isn't exactly its interior.
    pub fn place(&mut self, rank: usize, rows: &[f32]) -> Result<()> {
        let part = *self.plan.get(rank).ok_or(StencilErr::UnknownRank {
            rank,
            workers: self.plan.workers(),
        })?;

        let dst = self.output.rows_span_mut(part.interior_rows());
        if dst.len() != rows.len() {
            return Err(StencilErr::ShapeMismatch {
                what: "interior",
                got: rows.len(),
                expected: dst.len(),
            });
        }

        dst.copy_from_slice(rows);
        self.filled[rank] = true;
        Ok(())
    }

    /// Returns the assembled result once every worker was placed.
    ///
    /// # Errors
    /// `StencilErr::MissingRows` naming the first worker never placed.
    pub fn finish(self) -> Result<Grid> {
        if let Some(rank) = self.filled.iter().position(|filled| !filled) {
            return Err(StencilErr::MissingRows { rank });
        }

        Ok(self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slab_rows_include_the_halo() {
        let image = Grid::from_fn(4, 4, |_, _| 100.0).unwrap();
        let plan = PartitionPlan::new(4, 2).unwrap();

        assert_eq!(slab_rows(&image, plan.get(0).unwrap()).len(), 3 * 4);
        assert_eq!(slab_rows(&image, plan.get(1).unwrap()).len(), 3 * 4);
    }

    #[test]
    fn halos_come_from_the_neighbours() {
        let plan = PartitionPlan::new(6, 3).unwrap();
        let boundaries = vec![vec![1.0], vec![2.0, 3.0], vec![4.0]];

        let halos = route_halos(&plan, &boundaries, 1).unwrap();
        assert_eq!(halos, vec![vec![2.0], vec![1.0, 4.0], vec![3.0]]);
    }

    #[test]
    fn single_worker_has_no_halo() {
        let plan = PartitionPlan::new(3, 1).unwrap();
        let halos = route_halos(&plan, &[vec![]], 5).unwrap();
        assert_eq!(halos, vec![Vec::<f32>::new()]);
    }

    #[test]
    fn malformed_boundaries_are_rejected() {
        let plan = PartitionPlan::new(6, 2).unwrap();
        assert!(route_halos(&plan, &[vec![0.0; 2]], 2).is_err());
        assert!(route_halos(&plan, &[vec![0.0; 2], vec![0.0; 3]], 2).is_err());
    }

    #[test]
    fn placement_is_keyed_by_rank_not_arrival() {
        let plan = PartitionPlan::new(5, 2).unwrap();
        let mut collector = Collector::new(plan, 1).unwrap();

        collector.place(1, &[3.0, 4.0]).unwrap();
        collector.place(0, &[0.0, 1.0, 2.0]).unwrap();

        let out = collector.finish().unwrap();
        assert_eq!(out.as_slice(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn incomplete_collection_fails() {
        let plan = PartitionPlan::new(4, 2).unwrap();
        let mut collector = Collector::new(plan, 2).unwrap();
        collector.place(0, &[0.0; 4]).unwrap();

        assert!(collector.place(1, &[0.0; 3]).is_err());
        assert!(collector.place(7, &[0.0; 4]).is_err());
        assert!(matches!(collector.finish(), Err(StencilErr::MissingRows { rank: 1 })));
    }
}
