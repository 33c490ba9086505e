//! Image reference parsing.
//!
//! Turns user-supplied image strings into a registry origin, a repository
//! path and a tag:
//! - `jgsqware/ubuntu-git` -> `https://registry-1.docker.io`, `jgsqware/ubuntu-git`, `latest`
//! - `register.com:5080/zendesk/alpine:3.19` (insecure) -> `http://register.com:5080`,
//!   `zendesk/alpine`, `3.19`
//!
//! A reference naming an explicit registry must be parsed with `insecure`
//! set, and a bare Hub name must be parsed without it. Mixing the two is
//! rejected before any network access.
//!
//! ## Malformed input
//!
//! Empty input, empty path segments (`a//b`, `/a`, `a/`), an explicit
//! registry without a repository path, and empty name or tag parts
//! (`alpine:`, `:latest`) are rejected with
//! [`RegistryError::InvalidReference`]. A single segment naming a host
//! (`register.com:5080`, `docker.io`, `localhost:5000`) is such a registry
//! without a path. Any other single segment takes the Hub path, so
//! `alpine:3.19` is a tag, not a port.

use std::fmt;

use crate::error::{RegistryError, Result};
use crate::manifest::{ImageLayers, Layer};

/// Origin of the public Docker Hub registry API.
pub const HUB_REGISTRY: &str = "https://registry-1.docker.io";

/// Tag used when the reference does not name one.
pub const DEFAULT_TAG: &str = "latest";

/// A parsed image reference, optionally populated with its manifest layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    registry: String,
    name: String,
    tag: String,
    layers: Option<ImageLayers>,
}

impl ImageReference {
    /// Parse a raw image reference.
    ///
    /// `insecure` selects the explicit-registry path: the first segment must
    /// then be a host (`register.com`, `registry:5000`, `localhost`) and the
    /// registry is reached over plain HTTP. Without it, the reference must be
    /// a Hub repository name.
    pub fn parse(raw: &str, insecure: bool) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RegistryError::InvalidReference(
                "empty image reference".to_string(),
            ));
        }

        let segments: Vec<&str> = raw.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(RegistryError::InvalidReference(format!(
                "empty path segment in '{}'",
                raw
            )));
        }

        // A lone host (`register.com:5080`, `localhost`) has no repository
        // path. Only the part before a colon decides, so `alpine:3.19` stays
        // a Hub name with a tag.
        if let [only] = segments.as_slice() {
            let host = only.split_once(':').map_or(*only, |(host, _)| host);
            if host.contains('.') || host == "localhost" {
                return Err(RegistryError::InvalidReference(format!(
                    "missing repository path in '{}'",
                    raw
                )));
            }
        }

        let explicit_host = segments.len() > 1 && is_host_like(segments[0]);
        if explicit_host != insecure {
            return Err(RegistryError::Disallowed {
                reference: raw.to_string(),
                insecure,
            });
        }

        let (registry, first) = if explicit_host {
            (format!("http://{}", segments[0]), 1)
        } else {
            (HUB_REGISTRY.to_string(), 0)
        };

        // Tags only ever live on the last path segment; the host segment
        // was split off above, so a port colon is never seen here.
        let last = segments[segments.len() - 1];
        let parents = &segments[first..segments.len() - 1];
        let (last, tag) = match last.split_once(':') {
            Some((name, tag)) => (name, tag),
            None => (last, DEFAULT_TAG),
        };
        if last.is_empty() || tag.is_empty() {
            return Err(RegistryError::InvalidReference(format!(
                "empty name or tag in '{}'",
                raw
            )));
        }

        let mut name = parents.join("/");
        if !name.is_empty() {
            name.push('/');
        }
        name.push_str(last);

        Ok(Self {
            registry,
            name,
            tag: tag.to_string(),
            layers: None,
        })
    }

    /// Registry origin, `<scheme>://<host>[:<port>]`.
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// Repository path, e.g. `zendesk/alpine`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag, `latest` unless the reference named one.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Manifest schema version, or 0 before the manifest was fetched.
    pub fn schema_version(&self) -> u32 {
        self.layers.as_ref().map_or(0, ImageLayers::schema_version)
    }

    /// Layers of the fetched manifest, if any.
    pub fn image_layers(&self) -> Option<&ImageLayers> {
        self.layers.as_ref()
    }

    /// Layer list for the fetched schema version; empty before fetch.
    pub fn layers(&self) -> &[Layer] {
        match &self.layers {
            Some(layers) => layers.as_slice(),
            None => &[],
        }
    }

    /// Drop repeated layers, keeping the first occurrence of each digest.
    pub fn dedup_layers(&mut self) {
        if let Some(layers) = self.layers.as_mut() {
            layers.dedup();
        }
    }

    /// URL of the manifest for this reference's tag.
    pub fn manifest_uri(&self) -> String {
        format!("{}/v2/{}/manifests/{}", self.registry, self.name, self.tag)
    }

    /// URL of the blob with the given digest. The digest is used verbatim.
    pub fn blobs_uri(&self, digest: &str) -> String {
        format!("{}/v2/{}/blobs/{}", self.registry, self.name, digest)
    }

    /// Attach decoded manifest layers. Only the manifest client writes these.
    pub(crate) fn set_layers(&mut self, layers: ImageLayers) {
        self.layers = Some(layers);
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.registry, self.name, self.tag)
    }
}

/// Whether a path segment names a registry host rather than a repository.
pub fn is_host_like(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':') || segment == "localhost"
}
