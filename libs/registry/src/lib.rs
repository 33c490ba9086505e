//! # layerscope-registry
//!
//! Image reference resolution and manifest retrieval for container
//! registries.
//!
//! ## Flow
//!
//! ```text
//! "register.com:5080/zendesk/alpine:3.19"
//!   └── ImageReference::parse      (registry, name, tag; policy check)
//!         └── ManifestClient::fetch_manifest
//!               ├── GET  /v2/<name>/manifests/<tag>
//!               ├── 401 → Authenticator → GET again (once)
//!               └── decode + dedup layers
//! ```
//!
//! Blob URLs for the resulting layers come from
//! [`ImageReference::blobs_uri`]; downloading and verifying blobs is left to
//! the caller.
//!
//! ## Modules
//!
//! - `reference`: reference parsing and URL building
//! - `manifest`: manifest wire format and layer deduplication
//! - `client`: the manifest exchange with the registry
//! - `auth`: challenge handling (bearer tokens, basic credentials)
//! - `transport`: HTTP client construction

pub mod auth;
pub mod client;
pub mod error;
pub mod manifest;
pub mod reference;
pub mod transport;

pub use auth::{AuthError, Authenticator, Challenge, Credentials, TokenAuthenticator};
pub use client::ManifestClient;
pub use error::{FetchStep, RegistryError, Result};
pub use manifest::{dedup_layers, ImageLayers, Layer};
pub use reference::{ImageReference, DEFAULT_TAG, HUB_REGISTRY};
pub use transport::{build_client, TransportConfig};
