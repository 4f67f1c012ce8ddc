use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stencil::Execution;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Debug, Parser)]
#[command(name = "node", version, about = "Distributed Sobel edge detection")]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, Subcommand)]
pub enum Mode {
    /// Run the whole group inside this process.
    Local {
        #[command(flatten)]
        run: RunArgs,

        /// Group size, this process' coordinator included.
        #[arg(short, long, default_value_t = 4)]
        workers: usize,
    },

    /// Act as rank 0 and drive already listening peers.
    Coordinate {
        #[command(flatten)]
        run: RunArgs,

        /// Peer addresses, rank 1 first.
        #[arg(short, long, value_delimiter = ',', required = true)]
        peers: Vec<String>,
    },

    /// Wait for a coordinator and run as one of its peers.
    Serve {
        /// Address to listen at, defaults to `$HOST:$PORT`.
        #[arg(short, long)]
        listen: Option<String>,

        #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
        host: String,

        #[arg(long, env = "PORT")]
        port: Option<u16>,

        /// Compute rows on a single thread.
        #[arg(long)]
        serial: bool,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Image side, `4k` stands for 4000.
    #[arg(short, long, value_parser = parse_size)]
    pub size: usize,

    /// Input image, defaults to `sample_<size>.pgm`.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory the result is written to, created if missing.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Compute rows on a single thread.
    #[arg(long)]
    pub serial: bool,
}

impl RunArgs {
    pub fn input_path(&self) -> PathBuf {
        self.input
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("sample_{}.pgm", size_label(self.size))))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("sobel_{}.pgm", size_label(self.size)))
    }

    pub fn execution(&self) -> Execution {
        execution(self.serial)
    }
}

pub fn execution(serial: bool) -> Execution {
    if serial {
        Execution::Serial
    } else {
        Execution::Parallel
    }
}

/// Parses an image side, either plain digits or a whole number of thousands
/// such as `4k`.
pub fn parse_size(s: &str) -> Result<usize, String> {
    let s = s.trim();
    let (digits, factor) = match s.strip_suffix(['k', 'K']) {
        Some(digits) => (digits, 1000),
        None => (s, 1),
    };

    let n: usize = digits
        .parse()
        .map_err(|_| format!("invalid image size `{s}`"))?;

    match n.checked_mul(factor) {
        Some(0) => Err("image size must be positive".to_string()),
        Some(size) => Ok(size),
        None => Err(format!("image size `{s}` is too large")),
    }
}

/// `4000` becomes `4k`, anything not a multiple of a thousand stays as is.
pub fn size_label(size: usize) -> String {
    if size > 0 && size % 1000 == 0 {
        format!("{}k", size / 1000)
    } else {
        size.to_string()
    }
}
