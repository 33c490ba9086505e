//! Blob URL command: resolve where a layer can be downloaded from.

use anyhow::Result;
use clap::Args;
use layerscope_registry::ImageReference;
use serde::Serialize;

use crate::output::{print_single, OutputFormat};

use super::CommandContext;

/// Print the download URL of a blob. No request is made.
#[derive(Debug, Args)]
pub struct BlobUrlCommand {
    /// Image reference, e.g. `zendesk/alpine`.
    image: String,

    /// Blob digest, e.g. `sha256:13be4a52...`.
    digest: String,
}

#[derive(Debug, Serialize)]
struct BlobView {
    digest: String,
    url: String,
}

impl BlobUrlCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let image = ImageReference::parse(&self.image, ctx.insecure)?;
        let view = BlobView {
            url: image.blobs_uri(&self.digest),
            digest: self.digest,
        };

        match ctx.format {
            OutputFormat::Json => print_single(&view),
            OutputFormat::Table => println!("{}", view.url),
        }

        Ok(())
    }
}
