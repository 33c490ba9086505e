//! Manifest decoding and layer deduplication.
//!
//! Registries answer with one of two manifest shapes, told apart by the
//! `schemaVersion` field:
//! - schema 1 (legacy, signed): `fsLayers[].blobSum`
//! - schema 2 and later: `layers[].digest`

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Media types sent in the `Accept` header of manifest requests.
pub const MANIFEST_ACCEPT: &str = "application/vnd.docker.distribution.manifest.v2+json, \
application/vnd.oci.image.manifest.v1+json, \
application/vnd.docker.distribution.manifest.v1+prettyjws";

/// A filesystem layer, identified by its digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer {
    /// Content-addressable digest, e.g. `sha256:<hex>`.
    #[serde(rename = "blobSum", alias = "digest")]
    pub blob_sum: String,
}

impl Layer {
    /// Create a layer from a digest.
    pub fn new(blob_sum: impl Into<String>) -> Self {
        Self {
            blob_sum: blob_sum.into(),
        }
    }
}

/// Layer list of a fetched manifest, keyed by schema version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLayers {
    /// Schema 1 `fsLayers`.
    FsLayers(Vec<Layer>),
    /// Schema 2+ `layers`.
    Layers {
        schema_version: u32,
        layers: Vec<Layer>,
    },
}

impl ImageLayers {
    /// Schema version the list was decoded from.
    pub fn schema_version(&self) -> u32 {
        match self {
            ImageLayers::FsLayers(_) => 1,
            ImageLayers::Layers { schema_version, .. } => *schema_version,
        }
    }

    pub fn as_slice(&self) -> &[Layer] {
        match self {
            ImageLayers::FsLayers(layers) | ImageLayers::Layers { layers, .. } => layers,
        }
    }

    /// Deduplicate the list for this schema version in place.
    pub fn dedup(&mut self) {
        match self {
            ImageLayers::FsLayers(layers) | ImageLayers::Layers { layers, .. } => {
                dedup_layers(layers)
            }
        }
    }
}

/// Remove repeated layers, keeping the first occurrence of each digest.
pub fn dedup_layers(layers: &mut Vec<Layer>) {
    let mut seen = HashSet::with_capacity(layers.len());
    layers.retain(|layer| seen.insert(layer.blob_sum.clone()));
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    schema_version: u32,
    fs_layers: Option<Vec<Layer>>,
    layers: Option<Vec<Layer>>,
}

/// Decode a manifest body into the layer list for its schema version.
///
/// The list named by `schemaVersion` must be present (`fsLayers` for 1,
/// `layers` otherwise); an empty list is fine. Layers are returned as
/// listed; deduplication is up to the caller.
pub fn decode_manifest(body: &[u8]) -> Result<ImageLayers, serde_json::Error> {
    let raw: RawManifest = serde_json::from_slice(body)?;

    match raw.schema_version {
        0 => Err(serde::de::Error::custom("schemaVersion must be at least 1")),
        1 => raw
            .fs_layers
            .map(ImageLayers::FsLayers)
            .ok_or_else(|| serde::de::Error::missing_field("fsLayers")),
        schema_version => raw
            .layers
            .map(|layers| ImageLayers::Layers {
                schema_version,
                layers,
            })
            .ok_or_else(|| serde::de::Error::missing_field("layers")),
    }
}
