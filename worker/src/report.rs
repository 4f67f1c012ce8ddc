use std::{
    collections::HashSet,
    fmt,
    time::{Duration, Instant},
};

/// Diagnostic summary of one run, produced by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: usize,
    pub cols: usize,
    /// Distinct host identifiers among the workers.
    pub hosts: usize,
    pub workers: usize,
    /// Wall clock time between the barriers around the compute phase.
    pub elapsed: Duration,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image: {}x{} | Nodes: {} | Processes: {} | Time: {:.6} seconds",
            self.cols,
            self.rows,
            self.hosts,
            self.workers,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Counts the distinct identifiers in `hosts`.
pub fn distinct_hosts<'a, I>(hosts: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    hosts.into_iter().collect::<HashSet<_>>().len()
}

/// Measures the compute window, started and stopped right after a barrier.
#[derive(Debug)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}
