use std::{env, fs};

use stencil::{Execution, LocalPipeline};

const DEFAULT_HOST: &str = "localhost";

/// Immutable per-process settings of a group member.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    host: String,
    execution: Execution,
}

impl WorkerConfig {
    /// Creates a new worker configuration.
    ///
    /// # Args
    /// * `host` - Identifier of the machine this worker runs on.
    /// * `execution` - How the kernel rows are scheduled.
    pub fn new(host: impl Into<String>, execution: Execution) -> Self {
        Self {
            host: host.into(),
            execution,
        }
    }

    /// Configuration for this machine, see `host_identifier`.
    pub fn from_env(execution: Execution) -> Self {
        Self::new(host_identifier(), execution)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn execution(&self) -> Execution {
        self.execution
    }

    pub fn pipeline(&self) -> LocalPipeline {
        LocalPipeline::new(self.execution)
    }
}

/// The `HOSTNAME` variable, else `/etc/hostname`, else `localhost`.
pub fn host_identifier() -> String {
    let non_empty = |s: String| {
        let s = s.trim().to_string();
        (!s.is_empty()).then_some(s)
    };

    env::var("HOSTNAME")
        .ok()
        .and_then(non_empty)
        .or_else(|| fs::read_to_string("/etc/hostname").ok().and_then(non_empty))
        .unwrap_or_else(|| DEFAULT_HOST.to_string())
}
