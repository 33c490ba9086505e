//! layerscope - CLI for container registry manifests
//!
//! Resolves image references against Docker Hub or an explicit registry,
//! fetches manifests and lists their unique layers.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = config::Config::from_env();

    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = cli.run(config).await {
        error::print_error(&e);
        std::process::exit(1);
    }
}
