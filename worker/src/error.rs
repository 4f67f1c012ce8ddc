use std::{error::Error, fmt, io};

use stencil::StencilErr;

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Protocol step a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Bootstrap,
    Distribution,
    Barrier,
    HaloRefresh,
    Collection,
    Topology,
    Shutdown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Bootstrap => "bootstrap",
            Phase::Distribution => "distribution",
            Phase::Barrier => "barrier",
            Phase::HaloRefresh => "halo refresh",
            Phase::Collection => "collection",
            Phase::Topology => "topology",
            Phase::Shutdown => "shutdown",
        };

        f.write_str(name)
    }
}

/// The three failure classes of a run, all of them abort the whole group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid partition inputs.
    Configuration,
    /// A slab or intermediate buffer couldn't be allocated.
    Allocation,
    /// A transfer, barrier or peer failed.
    Transport,
}

/// Worker group runtime failures.
#[derive(Debug)]
pub enum WorkerErr {
    Io(io::Error),
    Stencil(StencilErr),
    UnexpectedMessage {
        rank: usize,
        phase: Phase,
        got: &'static str,
    },
    LengthMismatch {
        rank: usize,
        phase: Phase,
        got: usize,
        expected: usize,
    },
    /// The worker at `rank` aborted the run.
    Aborted {
        rank: usize,
        reason: String,
    },
}

impl WorkerErr {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkerErr::Stencil(StencilErr::Configuration { .. }) => ErrorKind::Configuration,
            WorkerErr::Stencil(StencilErr::Allocation { .. } | StencilErr::TooLarge { .. }) => {
                ErrorKind::Allocation
            }
            WorkerErr::Io(e) if e.kind() == io::ErrorKind::OutOfMemory => ErrorKind::Allocation,
            _ => ErrorKind::Transport,
        }
    }
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Io(e) => write!(f, "io error: {e}"),
            WorkerErr::Stencil(e) => write!(f, "{e}"),
            WorkerErr::UnexpectedMessage { rank, phase, got } => {
                write!(f, "unexpected message from worker {rank} during {phase}: got {got}")
            }
            WorkerErr::LengthMismatch {
                rank,
                phase,
                got,
                expected,
            } => write!(
                f,
                "payload length mismatch from worker {rank} during {phase}: got {got}, expected {expected}"
            ),
            WorkerErr::Aborted { rank, reason } => {
                write!(f, "run aborted by worker {rank}: {reason}")
            }
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Io(e) => Some(e),
            WorkerErr::Stencil(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WorkerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StencilErr> for WorkerErr {
    fn from(value: StencilErr) -> Self {
        Self::Stencil(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<WorkerErr> for io::Error {
    fn from(value: WorkerErr) -> Self {
        match value {
            WorkerErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_failure_class() {
        let config = WorkerErr::from(StencilErr::Configuration {
            rows: 1,
            workers: 2,
        });
        assert_eq!(config.kind(), ErrorKind::Configuration);

        let closed = WorkerErr::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert_eq!(closed.kind(), ErrorKind::Transport);

        let aborted = WorkerErr::Aborted {
            rank: 3,
            reason: "gone".into(),
        };
        assert_eq!(aborted.kind(), ErrorKind::Transport);
        assert_eq!(aborted.to_string(), "run aborted by worker 3: gone");
    }

    #[test]
    fn allocation_failures_have_their_own_kind() {
        let source = Vec::<f32>::new().try_reserve_exact(usize::MAX).unwrap_err();
        let stencil = WorkerErr::from(StencilErr::Allocation {
            elements: usize::MAX,
            source,
        });
        assert_eq!(stencil.kind(), ErrorKind::Allocation);
        assert!(stencil.source().is_some());

        let oom = WorkerErr::from(io::Error::from(io::ErrorKind::OutOfMemory));
        assert_eq!(oom.kind(), ErrorKind::Allocation);

        let too_large = WorkerErr::from(StencilErr::TooLarge {
            rows: 3,
            cols: usize::MAX,
        });
        assert_eq!(too_large.kind(), ErrorKind::Allocation);
    }
}
