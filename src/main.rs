//! bondhu CLI entry point

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // Logging setup
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    // Run the CLI
    let cli = bondhu::cli::Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(bondhu::cli::run(cli))
}
