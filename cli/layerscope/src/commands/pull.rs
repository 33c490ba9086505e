//! Pull command: fetch a manifest and list its unique layers.

use anyhow::Result;
use clap::Args;
use layerscope_registry::ImageReference;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_output, print_single, OutputFormat};

use super::CommandContext;

/// Fetch an image manifest and list its unique layers.
#[derive(Debug, Args)]
pub struct PullCommand {
    /// Image reference, e.g. `zendesk/alpine:latest`.
    image: String,
}

#[derive(Debug, Serialize)]
struct ImageView {
    registry: String,
    name: String,
    tag: String,
    schema_version: u32,
    layers: Vec<LayerRow>,
}

#[derive(Debug, Serialize, Tabled)]
struct LayerRow {
    #[tabled(rename = "DIGEST")]
    digest: String,
    #[tabled(rename = "BLOB URL")]
    blob_url: String,
}

impl ImageView {
    fn new(image: &ImageReference) -> Self {
        Self {
            registry: image.registry().to_string(),
            name: image.name().to_string(),
            tag: image.tag().to_string(),
            schema_version: image.schema_version(),
            layers: image
                .layers()
                .iter()
                .map(|layer| LayerRow {
                    digest: layer.blob_sum.clone(),
                    blob_url: image.blobs_uri(&layer.blob_sum),
                })
                .collect(),
        }
    }
}

impl PullCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let image = ctx.client()?.pull(&self.image, ctx.insecure).await?;
        let view = ImageView::new(&image);

        match ctx.format {
            OutputFormat::Json => print_single(&view),
            OutputFormat::Table => {
                println!("image: {}", image);
                println!("schema version: {}", view.schema_version);
                print_output(&view.layers, ctx.format);
            }
        }

        Ok(())
    }
}
