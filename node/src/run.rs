use std::io;

use log::{info, warn};
use stencil::Grid;
use tokio::net::{TcpListener, TcpStream};
use worker::{Coordinator, Outcome, Peer, WorkerConfig, run_local};

use crate::{
    cli::{Cli, Mode, RunArgs, execution},
    pgm,
};

/// Runs the mode selected on the command line.
///
/// # Errors
/// Any failure of the run. No output file is written unless the whole group
/// succeeded.
pub async fn run(cli: Cli) -> io::Result<()> {
    match cli.mode {
        Mode::Local { run, workers } => {
            let image = load(&run)?;
            let config = WorkerConfig::from_env(run.execution());
            let outcome = run_local(image, workers, config).await?;
            finish(&run, outcome)
        }
        Mode::Coordinate { run, peers } => {
            let mut channels = Vec::with_capacity(peers.len());
            for addr in &peers {
                let stream = TcpStream::connect(addr).await?;
                info!("connected to peer at {addr}");
                let (rx, tx) = stream.into_split();
                channels.push(comms::channel(rx, tx));
            }

            let image = load(&run)?;
            let config = WorkerConfig::from_env(run.execution());
            let outcome = Coordinator::new(image, channels, config).run().await?;
            finish(&run, outcome)
        }
        Mode::Serve {
            listen,
            host,
            port,
            serial,
        } => {
            let addr = match (listen, port) {
                (Some(addr), _) => addr,
                (None, Some(port)) => format!("{host}:{port}"),
                (None, None) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "either --listen or PORT must be set",
                    ));
                }
            };

            serve(&addr, WorkerConfig::from_env(execution(serial))).await
        }
    }
}

async fn serve(addr: &str, config: WorkerConfig) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("listening at {addr}");

    let (stream, coordinator) = listener.accept().await?;
    info!("coordinator connected from {coordinator}");

    let (rx, tx) = stream.into_split();
    let (rx, tx) = comms::channel(rx, tx);
    let part = Peer::new(rx, tx, config).run().await?;

    info!(rank = part.rank, rows = part.row_count; "wrapping up");
    Ok(())
}

fn load(run: &RunArgs) -> io::Result<Grid> {
    let path = run.input_path();
    let image = pgm::read(&path)?;

    if image.rows() != run.size || image.cols() != run.size {
        warn!(
            "{} is {}x{}, expected {}x{}",
            path.display(),
            image.cols(),
            image.rows(),
            run.size,
            run.size
        );
    }

    Ok(image)
}

fn finish(run: &RunArgs, outcome: Outcome) -> io::Result<()> {
    let path = run.output_path();
    pgm::save(&path, &outcome.output)?;
    info!("result written to {}", path.display());

    println!("{}", outcome.report);
    Ok(())
}
