//! The worker group runtime of the distributed edge detector.
//!
//! A group is a fixed set of workers with 0-based ranks. Rank 0 is the
//! `Coordinator`, every other rank runs a `Peer`. Peers only talk to the
//! coordinator, which distributes slabs, relays halo rows between the two
//! stencil passes, drives both barriers and collects the result.
pub mod config;
pub mod coordinator;
pub mod error;
pub mod link;
pub mod local;
pub mod peer;
pub mod report;

pub use config::WorkerConfig;
pub use coordinator::{Coordinator, Outcome};
pub use error::{ErrorKind, Phase, Result, WorkerErr};
pub use local::run_local;
pub use peer::Peer;
pub use report::Report;
