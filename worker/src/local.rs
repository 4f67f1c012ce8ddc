//! Runs a whole group inside one process, every peer being a tokio task
//! connected to the coordinator through an in-memory duplex pipe.
use log::{debug, warn};
use stencil::{Grid, PartitionPlan};
use tokio::{io, task::JoinSet};

use crate::{
    Coordinator, Outcome, Peer, WorkerConfig,
    error::{Result, WorkerErr},
};

/// Capacity in bytes of each in-memory pipe direction.
const LINK_BUFFER: usize = 1 << 16;

/// Runs the distributed pipeline over `workers` in-process workers.
///
/// # Arguments
/// * `image` - The full input image, held by the coordinator.
/// * `workers` - Group size, coordinator included.
/// * `config` - Configuration shared by every worker.
///
/// # Errors
/// The coordinator's error if it failed, else the first peer failure.
pub async fn run_local(image: Grid, workers: usize, config: WorkerConfig) -> Result<Outcome> {
    PartitionPlan::new(image.rows(), workers)?;

    let mut peers = Vec::with_capacity(workers - 1);
    let mut tasks = JoinSet::new();

    for rank in 1..workers {
        let (coord_end, peer_end) = io::duplex(LINK_BUFFER);

        let (rx, tx) = io::split(coord_end);
        peers.push(comms::channel(rx, tx));

        let (rx, tx) = io::split(peer_end);
        let (rx, tx) = comms::channel(rx, tx);
        let peer = Peer::new(rx, tx, config.clone());

        debug!(rank = rank; "spawning in-process worker");
        tasks.spawn(peer.run());
    }

    let outcome = Coordinator::new(image, peers, config).run().await;

    let mut peer_err = None;
    while let Some(joined) = tasks.join_next().await {
        let res = joined.map_err(|e| WorkerErr::Io(std::io::Error::other(e)));
        if let Err(e) = res.and_then(|res| res.map(|_| ())) {
            warn!("in-process worker failed: {e}");
            peer_err.get_or_insert(e);
        }
    }

    let outcome = outcome?;
    match peer_err {
        Some(e) => Err(e),
        None => Ok(outcome),
    }
}
