//! CLI commands.

mod blob_url;
mod pull;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use layerscope_registry::{build_client, ManifestClient, TokenAuthenticator};
use tracing::debug;

use crate::config::Config;
use crate::output::OutputFormat;

/// layerscope - Resolve image references and inspect registry manifests.
#[derive(Debug, Parser)]
#[command(name = "layerscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (table or json).
    #[arg(long, global = true, default_value = "table")]
    format: String,

    /// Treat the first path segment as an explicit registry reached over HTTP.
    #[arg(long, global = true, env = "LAYERSCOPE_INSECURE")]
    insecure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch an image manifest and list its unique layers.
    Pull(pull::PullCommand),

    /// Print the download URL of a blob.
    BlobUrl(blob_url::BlobUrlCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self, config: Config) -> Result<()> {
        let ctx = CommandContext {
            config,
            format: OutputFormat::from_flag(&self.format),
            insecure: self.insecure,
        };

        match self.command {
            Commands::Pull(cmd) => cmd.run(ctx).await,
            Commands::BlobUrl(cmd) => cmd.run(ctx),
            Commands::Version => {
                println!("layerscope {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    pub insecure: bool,
}

impl CommandContext {
    /// Build a manifest client from the configured transport and credentials.
    pub fn client(&self) -> Result<ManifestClient> {
        debug!(
            timeout = ?self.config.transport.timeout,
            authenticated = self.config.credentials.is_some(),
            "Building registry client"
        );
        let http = build_client(&self.config.transport).context("Failed to build HTTP client")?;

        let mut auth = TokenAuthenticator::new(http.clone());
        if let Some(credentials) = &self.config.credentials {
            auth = auth.with_credentials(credentials.clone());
        }

        Ok(ManifestClient::new(http, Arc::new(auth)))
    }
}
