//! Registry authentication.
//!
//! When a registry answers `401`, its `WWW-Authenticate` header says how to
//! get in:
//! 1. `Bearer realm="...",service="...",scope="..."`: fetch a token from the
//!    realm and send it as `Authorization: Bearer <token>`
//! 2. `Basic realm="..."`: send the configured credentials directly
//!
//! The [`Authenticator`] trait is the seam the manifest client calls through;
//! [`TokenAuthenticator`] is the implementation used by default.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Request, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors from the authentication step.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no WWW-Authenticate header in challenge")]
    MissingChallenge,

    #[error("challenge has status {0}, expected 401")]
    UnexpectedStatus(u16),

    #[error("unsupported authentication scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing realm in WWW-Authenticate")]
    MissingRealm,

    #[error("registry requires credentials but none are configured")]
    MissingCredentials,

    #[error("token request failed: {status} {body}")]
    TokenRequest { status: u16, body: String },

    #[error("no token in response")]
    MissingToken,

    #[error("invalid authorization header value")]
    InvalidHeader,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// The parts of a `401` response an authenticator needs.
#[derive(Debug, Clone)]
pub struct Challenge {
    /// URL that was rejected.
    pub url: Url,
    /// Status of the rejection. [`TokenAuthenticator`] only answers 401.
    pub status: StatusCode,
    /// Response headers, including `WWW-Authenticate`.
    pub headers: HeaderMap,
}

impl Challenge {
    /// Capture the challenge from a registry response.
    pub fn from_response(response: &reqwest::Response) -> Self {
        Self {
            url: response.url().clone(),
            status: response.status(),
            headers: response.headers().clone(),
        }
    }

    /// Raw `WWW-Authenticate` header, if present and valid UTF-8.
    pub fn www_authenticate(&self) -> Option<&str> {
        self.headers
            .get(WWW_AUTHENTICATE)
            .and_then(|h| h.to_str().ok())
    }
}

/// Answers a registry challenge by amending the request to retry.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Return `request` with credentials added, or fail.
    async fn authenticate(
        &self,
        challenge: &Challenge,
        request: Request,
    ) -> Result<Request, AuthError>;
}

/// Registry username and password.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn basic_token(&self) -> String {
        base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer-token and basic authenticator.
///
/// Without credentials it requests anonymous tokens, which is enough for
/// public repositories on most registries.
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    client: reqwest::Client,
    credentials: Option<Credentials>,
}

impl TokenAuthenticator {
    /// Create an anonymous authenticator using `client` for token requests.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            credentials: None,
        }
    }

    /// Use `credentials` for token requests and basic challenges.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Request a token from the realm named in a bearer challenge.
    async fn request_token(&self, params: &HashMap<String, String>) -> Result<String, AuthError> {
        let realm = params.get("realm").ok_or(AuthError::MissingRealm)?;

        let mut request = self.client.get(realm.as_str());
        for key in ["service", "scope"] {
            if let Some(value) = params.get(key).filter(|v| !v.is_empty()) {
                request = request.query(&[(key, value)]);
            }
        }
        if let Some(cred) = &self.credentials {
            request = request.basic_auth(&cred.username, Some(&cred.password));
        }

        debug!(realm = %realm, "Requesting registry token");
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(AuthError::TokenRequest {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            token: Option<String>,
            access_token: Option<String>,
        }

        let token_resp: TokenResponse = response.json().await?;

        token_resp
            .token
            .or(token_resp.access_token)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(
        &self,
        challenge: &Challenge,
        mut request: Request,
    ) -> Result<Request, AuthError> {
        if challenge.status != StatusCode::UNAUTHORIZED {
            return Err(AuthError::UnexpectedStatus(challenge.status.as_u16()));
        }
        let header = challenge
            .www_authenticate()
            .ok_or(AuthError::MissingChallenge)?;
        let (scheme, params) = parse_www_authenticate(header);

        let authorization = match scheme.to_ascii_lowercase().as_str() {
            "bearer" => {
                let token = self.request_token(&params).await?;
                format!("Bearer {}", token)
            }
            "basic" => {
                let cred = self
                    .credentials
                    .as_ref()
                    .ok_or(AuthError::MissingCredentials)?;
                format!("Basic {}", cred.basic_token())
            }
            _ => return Err(AuthError::UnsupportedScheme(scheme)),
        };

        let mut value =
            HeaderValue::from_str(&authorization).map_err(|_| AuthError::InvalidHeader)?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);

        Ok(request)
    }
}

/// Split a `WWW-Authenticate` header into its scheme and parameters.
///
/// Quoted values may contain commas, as in
/// `scope="repository:a/b:pull,push"`.
pub fn parse_www_authenticate(header: &str) -> (String, HashMap<String, String>) {
    let header = header.trim();
    let (scheme, rest) = header.split_once(' ').unwrap_or((header, ""));

    let mut params = HashMap::new();
    let mut chars = rest.chars().peekable();

    loop {
        while chars.next_if(|c| *c == ',' || c.is_whitespace()).is_some() {}

        let key: String = std::iter::from_fn(|| chars.next_if(|c| *c != '=')).collect();
        if chars.next().is_none() {
            break;
        }

        let value: String = if chars.next_if_eq(&'"').is_some() {
            let value: String = std::iter::from_fn(|| chars.next_if(|c| *c != '"')).collect();
            chars.next();
            value
        } else {
            std::iter::from_fn(|| chars.next_if(|c| *c != ',')).collect()
        };

        params.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    (scheme.to_string(), params)
}
