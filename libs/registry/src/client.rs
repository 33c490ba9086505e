//! Manifest retrieval.
//!
//! Implements the pull side of the registry API:
//! - GET /v2/<name>/manifests/<tag> - Get manifest
//!
//! An unauthenticated request that is answered with `401` is handed to the
//! [`Authenticator`] and re-issued exactly once. Any other failure is
//! returned to the caller as is.

use std::sync::Arc;

use reqwest::header::ACCEPT;
use reqwest::{Client, Request, StatusCode};
use tracing::{debug, info, warn};

use crate::auth::{Authenticator, Challenge};
use crate::error::{FetchStep, RegistryError, Result};
use crate::manifest::{decode_manifest, MANIFEST_ACCEPT};
use crate::reference::ImageReference;

/// Registry client that fetches and normalizes image manifests.
#[derive(Clone)]
pub struct ManifestClient {
    /// HTTP client
    http: Client,

    /// Answers 401 challenges
    auth: Arc<dyn Authenticator>,
}

impl ManifestClient {
    /// Create a client over an already configured HTTP client.
    pub fn new(http: Client, auth: Arc<dyn Authenticator>) -> Self {
        Self { http, auth }
    }

    /// Parse `raw` and fetch its manifest.
    pub async fn pull(&self, raw: &str, insecure: bool) -> Result<ImageReference> {
        let image = ImageReference::parse(raw, insecure)?;
        info!(image = %image, insecure, "Pulling image");

        self.fetch_manifest(&image).await
    }

    /// Fetch the manifest of `image` and return a copy populated with its
    /// deduplicated layers.
    ///
    /// `image` itself is never modified, so a failed fetch leaves the caller
    /// with the reference it started from.
    pub async fn fetch_manifest(&self, image: &ImageReference) -> Result<ImageReference> {
        let url = image.manifest_uri();
        debug!(url = %url, "Fetching manifest");

        let request = self.manifest_request(&url)?;
        let retry = request.try_clone();

        let mut response = self
            .http
            .execute(request)
            .await
            .map_err(RegistryError::transport(FetchStep::InitialRequest))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(url = %url, "Manifest request unauthorized, authenticating");

            let challenge = Challenge::from_response(&response);
            let retry = match retry {
                Some(retry) => retry,
                None => self.manifest_request(&url)?,
            };
            let retry = self.auth.authenticate(&challenge, retry).await?;

            response = self
                .http
                .execute(retry)
                .await
                .map_err(RegistryError::transport(FetchStep::RetriedRequest))?;
        }

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(RegistryError::transport(FetchStep::ReadBody))?;

        match status {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(RegistryError::Unauthorized),
            StatusCode::NOT_FOUND => return Err(RegistryError::NotFound(image.to_string())),
            status => {
                return Err(RegistryError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                })
            }
        }

        let layers = decode_manifest(&body).map_err(RegistryError::MalformedManifest)?;

        let mut populated = image.clone();
        populated.set_layers(layers);
        populated.dedup_layers();

        info!(
            image = %populated,
            schema_version = populated.schema_version(),
            layers = populated.layers().len(),
            "Manifest fetched"
        );

        Ok(populated)
    }

    fn manifest_request(&self, url: &str) -> Result<Request> {
        self.http
            .get(url)
            .header(ACCEPT, MANIFEST_ACCEPT)
            .build()
            .map_err(RegistryError::transport(FetchStep::BuildRequest))
    }
}
