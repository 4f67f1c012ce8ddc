//! The two 3×3 stencils of the edge detector.
//!
//! Both read a `GridView` and write a freshly allocated `Grid` of the same
//! shape, so an output never aliases its input. Each output row only reads
//! input rows `i - 1`, `i` and `i + 1`, rows are computed independently and
//! may run on the rayon pool.
use rayon::prelude::*;

use crate::{Grid, GridView, Result};

type Kernel3 = [[i32; 3]; 3];

/// Horizontal Sobel operator.
pub const SOBEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
/// Vertical Sobel operator.
pub const SOBEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

const MEAN_WEIGHT: f32 = 1.0 / 9.0;

/// How the rows of a kernel pass are scheduled. Results are identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Execution {
    Serial,
    #[default]
    Parallel,
}

fn for_each_row<F>(out: &mut Grid, exec: Execution, f: F)
where
    F: Fn(usize, &mut [f32]) + Send + Sync,
{
    let cols = out.cols();
    if cols == 0 {
        return;
    }

    let rows = out.as_mut_slice();
    match exec {
        Execution::Serial => rows
            .chunks_mut(cols)
            .enumerate()
            .for_each(|(i, row)| f(i, row)),
        Execution::Parallel => rows
            .par_chunks_mut(cols)
            .enumerate()
            .for_each(|(i, row)| f(i, row)),
    }
}

#[inline]
fn is_interior_row(i: usize, rows: usize, cols: usize) -> bool {
    i > 0 && i + 1 < rows && cols >= 3
}

/// 3×3 mean filter.
///
/// Interior pixels get the unweighted mean of their neighbourhood, the
/// outermost rows and columns are copied verbatim from `input`.
///
/// # Errors
/// `StencilErr::Allocation` if the output can't be allocated.
pub fn smooth(input: GridView<'_>, exec: Execution) -> Result<Grid> {
    let mut out = Grid::zeros(input.rows(), input.cols())?;
    for_each_row(&mut out, exec, |i, dst| smooth_row(&input, i, dst));
    Ok(out)
}

fn smooth_row(input: &GridView<'_>, i: usize, dst: &mut [f32]) {
    let cols = dst.len();
    dst.copy_from_slice(input.row(i));

    if !is_interior_row(i, input.rows(), cols) {
        return;
    }

    let rows = input.neighbourhood(i);
    for j in 1..cols - 1 {
        let mut sum = 0.0_f32;
        for row in rows {
            for px in &row[j - 1..=j + 1] {
                sum += px;
            }
        }

        dst[j] = sum * MEAN_WEIGHT;
    }
}

/// Sobel gradient magnitude `sqrt(gx² + gy²)`.
///
/// The outermost rows and columns are forced to `0.0`.
///
/// # Errors
/// `StencilErr::Allocation` if the output can't be allocated.
pub fn gradient(input: GridView<'_>, exec: Execution) -> Result<Grid> {
    let mut out = Grid::zeros(input.rows(), input.cols())?;
    for_each_row(&mut out, exec, |i, dst| gradient_row(&input, i, dst));
    Ok(out)
}

fn gradient_row(input: &GridView<'_>, i: usize, dst: &mut [f32]) {
    let cols = dst.len();

    // borders stay at the zero the output was allocated with
    if !is_interior_row(i, input.rows(), cols) {
        return;
    }

    let rows = input.neighbourhood(i);
    for j in 1..cols - 1 {
        let mut sum_x = 0.0_f32;
        let mut sum_y = 0.0_f32;

        for (ki, row) in rows.iter().enumerate() {
            for kj in 0..3 {
                let px = row[j + kj - 1];
                sum_x += px * SOBEL_X[ki][kj] as f32;
                sum_y += px * SOBEL_Y[ki][kj] as f32;
            }
        }

        dst[j] = (sum_x * sum_x + sum_y * sum_y).sqrt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn spike() -> Grid {
        Grid::from_fn(5, 5, |i, j| if (i, j) == (2, 2) { 255.0 } else { 0.0 }).unwrap()
    }

    #[test]
    fn smoothing_a_uniform_grid_is_a_no_op() {
        let grid = Grid::from_fn(6, 7, |_, _| 42.0).unwrap();
        let out = smooth(grid.view(), Execution::Serial).unwrap();
        for px in out.as_slice() {
            assert!((px - 42.0).abs() < EPS);
        }
    }

    #[test]
    fn smoothing_copies_borders_verbatim() {
        let grid = Grid::from_fn(4, 5, |i, j| (i * 10 + j) as f32).unwrap();
        let out = smooth(grid.view(), Execution::Serial).unwrap();

        assert_eq!(out.row(0), grid.row(0));
        assert_eq!(out.row(3), grid.row(3));
        for i in 0..4 {
            assert_eq!(out.get(i, 0), grid.get(i, 0));
            assert_eq!(out.get(i, 4), grid.get(i, 4));
        }

        // mean of a linear ramp is its centre
        assert!((out.get(1, 2) - 12.0).abs() < EPS);
    }

    #[test]
    fn smoothing_spreads_a_spike_over_its_neighbourhood() {
        let out = smooth(spike().view(), Execution::Serial).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                let expected = if (1..=3).contains(&i) && (1..=3).contains(&j) {
                    255.0 / 9.0
                } else {
                    0.0
                };
                assert!((out.get(i, j) - expected).abs() < EPS, "({i}, {j})");
            }
        }
    }

    #[test]
    fn gradient_zeroes_borders_and_flat_regions() {
        let grid = Grid::from_fn(5, 6, |_, _| 100.0).unwrap();
        let out = gradient(grid.view(), Execution::Serial).unwrap();
        assert!(out.as_slice().iter().all(|&px| px == 0.0));
    }

    #[test]
    fn gradient_of_a_vertical_step() {
        // left half 0, right half 1: gx = 4 on the columns next to the step
        let grid = Grid::from_fn(3, 4, |_, j| if j >= 2 { 1.0 } else { 0.0 }).unwrap();
        let out = gradient(grid.view(), Execution::Serial).unwrap();
        assert_eq!(out.row(1), &[0.0, 4.0, 4.0, 0.0]);
    }

    #[test]
    fn serial_and_parallel_agree() {
        let grid = Grid::from_fn(17, 13, |i, j| ((i * 31 + j * 7) % 23) as f32).unwrap();

        let a = gradient(smooth(grid.view(), Execution::Serial).unwrap().view(), Execution::Serial);
        let b = gradient(
            smooth(grid.view(), Execution::Parallel).unwrap().view(),
            Execution::Parallel,
        );
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn degenerate_shapes_have_no_interior() {
        let thin = Grid::from_fn(2, 8, |i, j| (i + j) as f32).unwrap();
        assert_eq!(smooth(thin.view(), Execution::Serial).unwrap(), thin);

        let narrow = Grid::from_fn(6, 2, |i, j| (i * j) as f32).unwrap();
        let out = gradient(narrow.view(), Execution::Parallel).unwrap();
        assert!(out.as_slice().iter().all(|&px| px == 0.0));

        let empty = Grid::zeros(0, 0).unwrap();
        assert_eq!(smooth(empty.view(), Execution::Parallel).unwrap(), empty);
    }
}
