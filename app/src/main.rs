//! deployer: KingToken / WETH9 / PreSale deployment and verification CLI
//!
//! Logs go to stderr; the JSON run record goes to stdout. The exit code is 0
//! only when every requested contract was deployed.

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("deployer=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("error: logging setup failed: {:#}", e);
        std::process::exit(1);
    }

    tracing::info!(network = %cli.global.network, "Starting deployer");

    let code = match commands::dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}
