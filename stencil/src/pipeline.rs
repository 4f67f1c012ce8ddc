use log::debug;

use crate::{
    Grid, Result, Slab,
    kernels::{self, Execution},
};

/// Runs the two stencil passes over one worker's slab.
///
/// The passes are exposed separately because the halo rows of the smoothed
/// slab must hold the neighbours' smoothed rows before the gradient pass,
/// the caller refreshes them in between.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPipeline {
    exec: Execution,
}

impl LocalPipeline {
    pub fn new(exec: Execution) -> Self {
        Self { exec }
    }

    pub fn execution(&self) -> Execution {
        self.exec
    }

    /// Smoothing pass, the result is a new slab of the same shape.
    pub fn smooth(&self, slab: &Slab) -> Result<Slab> {
        let part = slab.partition();
        debug!(rank = part.rank, rows = part.rows_with_halo(); "smoothing slab");

        let grid = kernels::smooth(slab.view(), self.exec)?;
        Ok(slab.with_grid(grid))
    }

    /// Gradient pass over a smoothed slab whose halo rows were refreshed.
    pub fn gradient(&self, smoothed: &Slab) -> Result<Slab> {
        let part = smoothed.partition();
        debug!(rank = part.rank, rows = part.rows_with_halo(); "computing gradient");

        let grid = kernels::gradient(smoothed.view(), self.exec)?;
        Ok(smoothed.with_grid(grid))
    }
}

/// Single process edge detection over a whole image, smoothing then gradient.
pub fn edge_detect(image: &Grid, exec: Execution) -> Result<Grid> {
    let smoothed = kernels::smooth(image.view(), exec)?;
    kernels::gradient(smoothed.view(), exec)
}
