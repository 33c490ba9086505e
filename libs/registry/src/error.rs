//! Error types for reference parsing and manifest retrieval.

use std::fmt;

use thiserror::Error;

use crate::auth::AuthError;

/// The step of a manifest fetch that hit a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStep {
    /// Building the GET request.
    BuildRequest,
    /// The first, unauthenticated GET.
    InitialRequest,
    /// The GET re-issued after authentication.
    RetriedRequest,
    /// Reading the response body.
    ReadBody,
}

impl fmt::Display for FetchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            FetchStep::BuildRequest => "building manifest request",
            FetchStep::InitialRequest => "retrieving manifest",
            FetchStep::RetriedRequest => "retrieving manifest after authentication",
            FetchStep::ReadBody => "reading manifest body",
        };
        f.write_str(step)
    }
}

/// Errors that can occur when resolving or fetching an image.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The reference violates the registry/insecure policy.
    #[error("reference '{reference}' is not allowed with insecure={insecure}")]
    Disallowed { reference: String, insecure: bool },

    /// The reference is not a well-formed image name.
    #[error("invalid image reference: {0}")]
    InvalidReference(String),

    /// The authenticator could not satisfy the registry challenge.
    #[error("authenticating: {0}")]
    AuthenticationFailed(#[from] AuthError),

    /// The registry still answered 401 after authenticating.
    #[error("unauthorized")]
    Unauthorized,

    /// The registry has no manifest for this reference.
    #[error("manifest not found: {0}")]
    NotFound(String),

    /// The manifest body is not valid JSON for any known schema.
    #[error("parsing manifest: {0}")]
    MalformedManifest(#[source] serde_json::Error),

    /// Any other non-200 answer.
    #[error("{status} - {body}")]
    Status { status: u16, body: String },

    /// Transport failure, tagged with the step that failed.
    #[error("{step}: {source}")]
    Transport {
        step: FetchStep,
        #[source]
        source: reqwest::Error,
    },
}

impl RegistryError {
    pub(crate) fn transport(step: FetchStep) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| RegistryError::Transport { step, source }
    }

    /// Returns true if the reference was rejected by the registry policy.
    pub fn is_disallowed(&self) -> bool {
        matches!(self, RegistryError::Disallowed { .. })
    }

    /// Returns true if the registry reported no such manifest.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound(_))
    }

    /// HTTP status carried by the error, if the registry answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RegistryError::Unauthorized => Some(401),
            RegistryError::NotFound(_) => Some(404),
            RegistryError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience alias for registry results.
pub type Result<T> = std::result::Result<T, RegistryError>;
