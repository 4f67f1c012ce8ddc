use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg, Payload, PayloadKind},
    specs::group::GroupSpec,
};
use log::{debug, info, warn};
use stencil::{Collector, Grid, PartitionPlan, Slab, route_halos, slab_rows};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    WorkerConfig,
    error::{Phase, Result, WorkerErr},
    link::Link,
    report::{Report, Stopwatch, distinct_hosts},
};

/// The result of a successful run.
#[derive(Debug)]
pub struct Outcome {
    /// The gradient magnitude image, same shape as the input.
    pub output: Grid,
    pub report: Report,
}

/// Rank 0 of the group, the only holder of the full image.
///
/// Ships every other worker its slab, runs its own slab, routes halos between
/// the two passes, and collects the interior rows back in plan order.
pub struct Coordinator<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    image: Grid,
    links: Vec<Link<R, W>>,
    config: WorkerConfig,
}

impl<R, W> Coordinator<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a new `Coordinator`.
    ///
    /// # Arguments
    /// * `image` - The full input image.
    /// * `peers` - One channel per other worker, the i-th one becomes rank `i + 1`.
    /// * `config` - This process' configuration.
    pub fn new(
        image: Grid,
        peers: Vec<(OnoReceiver<R>, OnoSender<W>)>,
        config: WorkerConfig,
    ) -> Self {
        let links = peers
            .into_iter()
            .enumerate()
            .map(|(i, (rx, tx))| Link::new(i + 1, rx, tx))
            .collect();

        Self {
            image,
            links,
            config,
        }
    }

    /// Total amount of workers, this one included.
    pub fn workers(&self) -> usize {
        self.links.len() + 1
    }

    /// Runs the whole pipeline over the group.
    ///
    /// # Errors
    /// Any failure aborts every peer and is returned, no partial result survives.
    pub async fn run(mut self) -> Result<Outcome> {
        match self.execute().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.abort(&e).await;
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<Outcome> {
        let (rows, cols) = (self.image.rows(), self.image.cols());
        let workers = self.workers();
        let plan = PartitionPlan::new(rows, workers)?;
        let pipeline = self.config.pipeline();

        info!(rows = rows, cols = cols, workers = workers; "starting run");

        let own = self.distribute(&plan).await?;

        self.barrier().await?;
        let stopwatch = Stopwatch::start();

        let smoothed = pipeline.smooth(&own)?;
        drop(own);
        let smoothed = self.refresh_halos(&plan, smoothed).await?;
        let own = pipeline.gradient(&smoothed)?;
        drop(smoothed);

        self.barrier().await?;
        let elapsed = stopwatch.stop();

        let output = self.collect(plan, &own).await?;
        let hosts = self.gather_hosts().await?;
        self.disconnect().await?;

        let report = Report {
            rows,
            cols,
            hosts,
            workers,
            elapsed,
        };

        info!("run finished: {report}");
        Ok(Outcome { output, report })
    }

    /// Assigns every peer its rank and ships its slab, returns the local slab.
    async fn distribute(&mut self, plan: &PartitionPlan) -> Result<Slab> {
        let (rows, cols) = (self.image.rows(), self.image.cols());

        for link in &mut self.links {
            let rank = link.rank();
            let part = plan.get(rank).ok_or(stencil::StencilErr::UnknownRank {
                rank,
                workers: plan.workers(),
            })?;

            let spec = GroupSpec {
                rank,
                workers: plan.workers(),
                rows,
                cols,
            };

            link.send(&Msg::Control(Command::Assign(spec))).await?;

            let payload = slab_rows(&self.image, part);
            debug!(rank = rank, start = part.slab_rows().start, rows = part.rows_with_halo(); "sending slab");
            link.send(&Msg::Data(Payload::Slab(payload))).await?;
        }

        let own = plan.get(0).ok_or(stencil::StencilErr::UnknownRank {
            rank: 0,
            workers: plan.workers(),
        })?;

        Ok(Slab::from_image(&self.image, *own)?)
    }

    /// Waits for every peer to arrive, then releases them all.
    async fn barrier(&mut self) -> Result<()> {
        for link in &mut self.links {
            link.expect(Phase::Barrier, Command::Barrier).await?;
        }

        for link in &mut self.links {
            link.send(&Msg::Control(Command::Release)).await?;
        }

        debug!(workers = self.workers(); "barrier crossed");
        Ok(())
    }

    /// Replaces every worker's halo rows by its neighbours' smoothed rows.
    async fn refresh_halos(&mut self, plan: &PartitionPlan, mut own: Slab) -> Result<Slab> {
        if plan.workers() == 1 {
            return Ok(own);
        }

        let cols = own.cols();
        let mut boundaries = Vec::with_capacity(plan.workers());
        boundaries.push(own.boundary_rows());

        for (link, part) in self.links.iter_mut().zip(plan.iter().skip(1)) {
            let expected = part.halo_rows() * cols;
            let rows = link
                .recv_rows(Phase::HaloRefresh, PayloadKind::Boundary, expected)
                .await?;
            boundaries.push(rows.to_vec());
        }

        let halos = route_halos(plan, &boundaries, cols)?;
        own.set_halo_rows(&halos[0])?;

        for (link, halo) in self.links.iter_mut().zip(&halos[1..]) {
            link.send(&Msg::Data(Payload::Halo(halo))).await?;
        }

        debug!(workers = plan.workers(); "halos refreshed");
        Ok(own)
    }

    /// Assembles the global result from the local slab and every peer's interior rows.
    async fn collect(&mut self, plan: PartitionPlan, own: &Slab) -> Result<Grid> {
        let cols = own.cols();
        let parts: Vec<_> = plan.iter().copied().collect();
        let mut collector = Collector::new(plan, cols)?;
        collector.place(0, own.interior())?;

        for (link, part) in self.links.iter_mut().zip(parts.iter().skip(1)) {
            let expected = part.row_count * cols;
            let rows = link
                .recv_rows(Phase::Collection, PayloadKind::Interior, expected)
                .await?;
            collector.place(part.rank, rows)?;
        }

        Ok(collector.finish()?)
    }

    async fn gather_hosts(&mut self) -> Result<usize> {
        let mut hosts = Vec::with_capacity(self.workers());
        hosts.push(self.config.host().to_string());

        for link in &mut self.links {
            let rank = link.rank();
            match link.recv_control(Phase::Topology).await? {
                Command::Topology { host } => {
                    debug!(rank = rank, host = host.as_str(); "worker host");
                    hosts.push(host);
                }
                other => {
                    return Err(WorkerErr::UnexpectedMessage {
                        rank,
                        phase: Phase::Topology,
                        got: Msg::Control(other).kind(),
                    });
                }
            }
        }

        Ok(distinct_hosts(hosts.iter().map(String::as_str)))
    }

    async fn disconnect(&mut self) -> Result<()> {
        for link in &mut self.links {
            link.send(&Msg::Control(Command::Disconnect)).await?;
        }

        Ok(())
    }

    /// Best effort notification of every peer, failures are only logged.
    async fn abort(&mut self, err: &WorkerErr) {
        warn!("aborting run: {err}");
        let reason = err.to_string();

        for link in &mut self.links {
            if let Err(e) = link.send(&Msg::Err(reason.as_str().into())).await {
                debug!(rank = link.rank(); "failed to notify abort: {e}");
            }
        }
    }
}
