use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg, PayloadKind},
};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{Phase, Result, WorkerErr};

/// A bidirectional channel to one other member of the group.
pub struct Link<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    rank: usize,
    rx: OnoReceiver<R>,
    tx: OnoSender<W>,
    buf: Vec<u32>,
}

impl<R, W> Link<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new `Link`.
    ///
    /// # Arguments
    /// * `rank` - The rank of the worker at the other end.
    /// * `rx` - Receiving end of the channel.
    /// * `tx` - Sending end of the channel.
    pub fn new(rank: usize, rx: OnoReceiver<R>, tx: OnoSender<W>) -> Self {
        Self {
            rank,
            rx,
            tx,
            buf: Vec::new(),
        }
    }

    /// The rank of the worker at the other end.
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub async fn send(&mut self, msg: &Msg<'_>) -> Result<()> {
        self.tx.send(msg).await?;
        Ok(())
    }

    /// Waits for the next message, an error frame from the other end becomes
    /// `WorkerErr::Aborted`.
    pub async fn recv(&mut self) -> Result<Msg<'_>> {
        let rank = self.rank;
        match self.rx.recv_into(&mut self.buf).await? {
            Msg::Err(reason) => Err(WorkerErr::Aborted {
                rank,
                reason: reason.into_owned(),
            }),
            msg => Ok(msg),
        }
    }

    /// Waits for a control message.
    pub async fn recv_control(&mut self, phase: Phase) -> Result<Command> {
        let rank = self.rank;
        match self.recv().await? {
            Msg::Control(cmd) => Ok(cmd),
            other => Err(WorkerErr::UnexpectedMessage {
                rank,
                phase,
                got: other.kind(),
            }),
        }
    }

    /// Waits for `cmd` specifically.
    pub async fn expect(&mut self, phase: Phase, cmd: Command) -> Result<()> {
        let rank = self.rank;
        match self.recv().await? {
            Msg::Control(got) if got == cmd => Ok(()),
            other => Err(WorkerErr::UnexpectedMessage {
                rank,
                phase,
                got: other.kind(),
            }),
        }
    }

    /// Waits for a row payload of `kind` holding exactly `expected` samples.
    ///
    /// The rows borrow the link's receive buffer until the next call.
    pub async fn recv_rows(
        &mut self,
        phase: Phase,
        kind: PayloadKind,
        expected: usize,
    ) -> Result<&[f32]> {
        let rank = self.rank;
        let rows = match self.recv().await? {
            Msg::Data(payload) if payload.kind() == kind => payload.rows(),
            other => {
                return Err(WorkerErr::UnexpectedMessage {
                    rank,
                    phase,
                    got: other.kind(),
                });
            }
        };

        if rows.len() != expected {
            return Err(WorkerErr::LengthMismatch {
                rank,
                phase,
                got: rows.len(),
                expected,
            });
        }

        Ok(rows)
    }
}
