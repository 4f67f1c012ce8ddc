use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg, Payload, PayloadKind},
    specs::group::GroupSpec,
};
use log::{debug, info, warn};
use stencil::{Partition, PartitionPlan, Slab, StencilErr};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    WorkerConfig,
    error::{Phase, Result, WorkerErr},
    link::Link,
};

const COORDINATOR: usize = 0;

/// Any worker of the group other than the coordinator.
///
/// Only ever sees its own slab, the full image type never crosses its API.
pub struct Peer<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    link: Link<R, W>,
    config: WorkerConfig,
}

impl<R, W> Peer<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a new `Peer` talking to the coordinator through `rx` and `tx`.
    pub fn new(rx: OnoReceiver<R>, tx: OnoSender<W>, config: WorkerConfig) -> Self {
        Self {
            link: Link::new(COORDINATOR, rx, tx),
            config,
        }
    }

    /// Runs this worker's part of the pipeline until the coordinator disconnects.
    ///
    /// # Returns
    /// The partition this worker computed.
    ///
    /// # Errors
    /// Returns `WorkerErr` on I/O failures, protocol violations or an abort
    /// requested by the coordinator. Local failures are reported to the
    /// coordinator before returning.
    pub async fn run(mut self) -> Result<Partition> {
        match self.execute().await {
            Ok(part) => Ok(part),
            Err(e) => {
                if !matches!(e, WorkerErr::Aborted { .. } | WorkerErr::Io(_)) {
                    warn!("aborting run: {e}");
                    if let Err(send_err) = self.link.send(&Msg::Err(e.to_string().into())).await {
                        debug!("failed to notify abort: {send_err}");
                    }
                }

                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<Partition> {
        let spec = self.bootstrap().await?;
        let plan = PartitionPlan::new(spec.rows, spec.workers)?;
        let part = *plan.get(spec.rank).ok_or(StencilErr::UnknownRank {
            rank: spec.rank,
            workers: spec.workers,
        })?;

        let rank = part.rank;
        let cols = spec.cols;
        let pipeline = self.config.pipeline();
        info!(rank = rank, start = part.start_row, rows = part.row_count; "assigned");

        let expected = part.slab_len(cols)?;
        let rows = self
            .link
            .recv_rows(Phase::Distribution, PayloadKind::Slab, expected)
            .await?;
        let slab = Slab::from_rows(part, cols, rows)?;
        debug!(rank = rank; "slab received");

        self.barrier().await?;

        let mut smoothed = pipeline.smooth(&slab)?;
        drop(slab);

        let boundary = smoothed.boundary_rows();
        self.link
            .send(&Msg::Data(Payload::Boundary(&boundary)))
            .await?;

        let halo = self
            .link
            .recv_rows(Phase::HaloRefresh, PayloadKind::Halo, part.halo_len(cols)?)
            .await?;
        smoothed.set_halo_rows(halo)?;

        let out = pipeline.gradient(&smoothed)?;
        drop(smoothed);

        self.barrier().await?;

        self.link
            .send(&Msg::Data(Payload::Interior(out.interior())))
            .await?;

        let host = self.config.host().to_string();
        self.link
            .send(&Msg::Control(Command::Topology { host }))
            .await?;

        self.link.expect(Phase::Shutdown, Command::Disconnect).await?;
        info!(rank = rank; "worker finished");
        Ok(part)
    }

    async fn bootstrap(&mut self) -> Result<GroupSpec> {
        debug!("waiting for assignment");

        match self.link.recv_control(Phase::Bootstrap).await? {
            Command::Assign(spec) if spec.rank != COORDINATOR => Ok(spec),
            other => Err(WorkerErr::UnexpectedMessage {
                rank: COORDINATOR,
                phase: Phase::Bootstrap,
                got: Msg::Control(other).kind(),
            }),
        }
    }

    async fn barrier(&mut self) -> Result<()> {
        self.link.send(&Msg::Control(Command::Barrier)).await?;
        self.link.expect(Phase::Barrier, Command::Release).await
    }
}
