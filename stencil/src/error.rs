use std::{
    collections::TryReserveError,
    error::Error,
    fmt::{self, Display},
};

/// The stencil module's result type.
pub type Result<T> = std::result::Result<T, StencilErr>;

/// Failures of the local, communication free part of the pipeline.
#[derive(Debug)]
pub enum StencilErr {
    /// The image can't be split: no workers, or fewer rows than workers.
    Configuration { rows: usize, workers: usize },
    /// A buffer of `elements` samples couldn't be allocated.
    Allocation {
        elements: usize,
        source: TryReserveError,
    },
    /// A buffer doesn't have the length its shape requires.
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// Collection finished without rows from worker `rank`.
    MissingRows { rank: usize },
    /// `rank` isn't part of a plan for `workers` workers.
    UnknownRank { rank: usize, workers: usize },
    /// `rows × cols` samples don't fit in `usize`.
    TooLarge { rows: usize, cols: usize },
}

impl Display for StencilErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { rows, workers } => write!(
                f,
                "configuration error: can't split {rows} row(s) among {workers} worker(s)"
            ),
            Self::Allocation { elements, .. } => {
                write!(f, "allocation error: failed to reserve {elements} sample(s)")
            }
            Self::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "{what} length mismatch: got {got}, expected {expected}"),
            Self::MissingRows { rank } => write!(f, "no rows were collected from worker {rank}"),
            Self::UnknownRank { rank, workers } => {
                write!(f, "rank {rank} is out of range for {workers} worker(s)")
            }
            Self::TooLarge { rows, cols } => {
                write!(f, "a {rows}x{cols} buffer overflows the address space")
            }
        }
    }
}

impl Error for StencilErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Allocation { source, .. } => Some(source),
            _ => None,
        }
    }
}
