//! Local compute core of the distributed edge detector.
//!
//! Everything in here is free of communication: partitioning, slabs, the
//! smoothing and gradient stencils, and the pure halves of halo routing and
//! result collection. The worker runtime moves the data around.
pub mod distribute;
mod error;
mod grid;
pub mod kernels;
mod partition;
mod pipeline;
mod slab;

pub use distribute::{Collector, route_halos, slab_rows};
pub use error::{Result, StencilErr};
pub use grid::{Grid, GridView};
pub use kernels::Execution;
pub use partition::{Partition, PartitionPlan};
pub use pipeline::{LocalPipeline, edge_detect};
pub use slab::Slab;
