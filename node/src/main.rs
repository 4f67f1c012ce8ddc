use std::io;

use clap::Parser;
use node::cli::Cli;

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();
    node::run(Cli::parse()).await
}
